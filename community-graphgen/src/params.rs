//! Parsing of `key=value` distribution parameters.

use std::collections::BTreeMap;

use crate::error::{GeneratorError, Result};

/// Distribution parameters keyed by name.
pub type ParamMap = BTreeMap<String, f64>;

/// Parse parameter tokens such as `alpha=2.5` into a [`ParamMap`].
///
/// Each token may itself hold several comma-separated pairs, so
/// `["mu=1,sigma=0.3"]` and `["mu=1", "sigma=0.3"]` are equivalent. Later
/// occurrences of a key override earlier ones. Empty pieces between commas
/// are skipped.
///
/// # Errors
/// Returns [`GeneratorError::MalformedParameterString`] when a piece has no
/// `=`, an empty key, or a value that is not a number.
pub fn parse_params<S: AsRef<str>>(tokens: &[S]) -> Result<ParamMap> {
    let mut params = ParamMap::new();
    for token in tokens {
        for piece in token.as_ref().split(',') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            let (key, value) = parse_pair(piece)?;
            params.insert(key, value);
        }
    }
    Ok(params)
}

fn parse_pair(piece: &str) -> Result<(String, f64)> {
    let Some((key, raw)) = piece.split_once('=') else {
        return Err(malformed(piece, "missing `=`"));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(malformed(piece, "empty parameter name"));
    }
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| malformed(piece, "value is not a number"))?;
    Ok((key.to_ascii_lowercase(), value))
}

fn malformed(piece: &str, reason: &'static str) -> GeneratorError {
    GeneratorError::MalformedParameterString {
        token: piece.to_owned(),
        reason,
    }
}
