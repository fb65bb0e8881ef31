//! Tracing setup for the `community-graphgen` binary.
//!
//! Events go to stderr; stdout carries edge lists and summaries only.
//! `RUST_LOG` picks the level (default `info`) and `GRAPHGEN_LOG_FORMAT`
//! picks [`LogFormat`].

use std::str::FromStr;
use std::{env, sync::OnceLock};

use thiserror::Error;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FORMAT_ENV: &str = "GRAPHGEN_LOG_FORMAT";

static INSTALLED: OnceLock<LogFormat> = OnceLock::new();

/// Errors raised while setting up logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("`{name}` is not valid UTF-8: {source}")]
    InvalidUnicode {
        name: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("unknown log format `{provided}`; use `human` or `json`")]
    UnsupportedFormat { provided: String },
    #[error("could not install the tracing subscriber: {source}")]
    InstallFailed {
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
}

/// Output style of log events.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    /// Plain single-line events.
    #[default]
    Human,
    /// One JSON object per event, including the current span.
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::UnsupportedFormat {
                provided: other.to_owned(),
            }),
        }
    }
}

impl LogFormat {
    /// Read `GRAPHGEN_LOG_FORMAT`; unset means [`LogFormat::Human`].
    ///
    /// # Errors
    /// Returns [`LoggingError`] when the variable is not Unicode or names an
    /// unknown format.
    pub fn from_env() -> Result<Self, LoggingError> {
        match env::var(LOG_FORMAT_ENV) {
            Ok(raw) => raw.parse(),
            Err(env::VarError::NotPresent) => Ok(Self::Human),
            Err(source) => Err(LoggingError::InvalidUnicode {
                name: LOG_FORMAT_ENV,
                source,
            }),
        }
    }
}

/// Install logging once per process.
///
/// When another global subscriber already exists it is kept, and a note is
/// printed on stderr.
///
/// # Errors
/// Returns [`LoggingError`] when `GRAPHGEN_LOG_FORMAT` is unusable.
pub fn init_logging() -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }
    let format = LogFormat::from_env()?;
    if let Err(LoggingError::InstallFailed { source }) = install(format) {
        eprintln!("keeping the tracing subscriber installed elsewhere: {source}");
    }
    let _ = INSTALLED.set(format);
    Ok(())
}

fn install(format: LogFormat) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let layer = match format {
        LogFormat::Human => layer.boxed(),
        LogFormat::Json => layer.json().with_current_span(true).boxed(),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|source| LoggingError::InstallFailed { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("human", LogFormat::Human)]
    #[case("", LogFormat::Human)]
    #[case(" JSON ", LogFormat::Json)]
    fn known_formats_parse(#[case] raw: &str, #[case] expected: LogFormat) {
        assert_eq!(raw.parse::<LogFormat>().expect("known format"), expected);
    }

    #[test]
    fn unknown_formats_are_named_in_the_error() {
        match "xml".parse::<LogFormat>() {
            Err(LoggingError::UnsupportedFormat { provided }) => assert_eq!(provided, "xml"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn repeated_initialisation_is_harmless() {
        init_logging().expect("first call installs");
        init_logging().expect("second call is a no-op");
        assert!(INSTALLED.get().is_some());
    }
}
