//! Command-line interface for generating, inspecting and partitioning community graphs.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tracing::info;

use crate::config::{
    CommunityRange, DEFAULT_COMMUNITIES, DEFAULT_NODES, DEFAULT_P_IN, DEFAULT_P_OUT,
    DEFAULT_POP_INFLUENCE, DEFAULT_SEED, GeneratorConfig,
};
use crate::detect::{DEFAULT_PROPAGATION_STEPS, label_propagation, rank_neighbourhood};
use crate::ensemble::{EnsembleSummary, run_ensemble};
use crate::error::GeneratorError;
use crate::generator::CommunityGraphGenerator;
use crate::io::csr::{CsrGraph, load_csr, save_csr};
use crate::io::json::save_json;
use crate::io::text::save_edge_list;
use crate::io::{GraphIoError, create_output};
use crate::params::parse_params;
use crate::popularity::{Distribution, PopularityModel};

const DEFAULT_OUT: &str = "data/sparse_graph_with_communities.txt";

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "community-graphgen",
    about = "Generate sparse undirected graphs with community structure."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate one graph and write it to disk.
    Generate(GenerateCommand),
    /// Generate many graphs and report edge-count statistics.
    Ensemble(EnsembleCommand),
    /// Dump the header and arrays of a binary CSR file.
    Inspect(InspectCommand),
    /// Find communities in a binary CSR file by label propagation.
    Detect(DetectCommand),
}

/// Model parameters shared by `generate` and `ensemble`.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Number of nodes.
    #[arg(short = 'n', long = "nodes", default_value_t = DEFAULT_NODES)]
    pub nodes: u32,

    /// Number of communities, clamped into the community range.
    #[arg(short = 'k', long = "communities", default_value_t = DEFAULT_COMMUNITIES)]
    pub communities: u32,

    /// Smallest community count the request is clamped to.
    #[arg(long = "min-communities", default_value_t = 1)]
    pub min_communities: u32,

    /// Largest community count the request is clamped to (default: nodes).
    #[arg(long = "max-communities")]
    pub max_communities: Option<u32>,

    /// Edge probability inside communities.
    #[arg(long = "p-in", default_value_t = DEFAULT_P_IN)]
    pub p_in: f64,

    /// Edge probability between communities.
    #[arg(long = "p-out", default_value_t = DEFAULT_P_OUT)]
    pub p_out: f64,

    /// Popularity distribution: exp, pareto, normal or uniform.
    #[arg(long = "pop-dist", default_value = "exp")]
    pub pop_dist: String,

    /// Distribution parameter as `key=value`; repeat or comma-separate.
    #[arg(long = "pop-param", value_name = "KEY=VALUE")]
    pub pop_params: Vec<String>,

    /// Blend between baseline and popularity-weighted probability, in [0, 1].
    #[arg(long = "pop-influence", default_value_t = DEFAULT_POP_INFLUENCE)]
    pub pop_influence: f64,

    /// Apply popularity weighting to inter-community edges too.
    #[arg(long = "inter-pop")]
    pub inter_pop: bool,
}

impl ModelArgs {
    /// Build the generator configuration these flags describe.
    ///
    /// # Errors
    /// Returns [`GeneratorError`] for unknown distributions, malformed or
    /// out-of-domain parameters, or an invalid community range.
    pub fn to_config(&self, seed: Option<u64>) -> Result<GeneratorConfig, GeneratorError> {
        let distribution: Distribution = self.pop_dist.parse()?;
        let params = parse_params(&self.pop_params)?;
        let popularity = PopularityModel::from_params(distribution, &params)?;
        let range = CommunityRange::new(
            self.min_communities,
            self.max_communities.unwrap_or(u32::MAX),
        )?;
        Ok(GeneratorConfig::new(self.nodes, self.communities)
            .with_probabilities(self.p_in, self.p_out)
            .with_seed(seed)
            .with_popularity(popularity, self.pop_influence, self.inter_pop)
            .with_community_range(range))
    }
}

/// Options accepted by the `generate` command.
#[derive(Debug, Args, Clone)]
pub struct GenerateCommand {
    /// Model parameters.
    #[command(flatten)]
    pub model: ModelArgs,

    /// Random seed.
    #[arg(short = 's', long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Ignore `--seed` and draw a fresh one from the OS.
    #[arg(long)]
    pub entropy: bool,

    /// Edge-list output path.
    #[arg(short = 'o', long, default_value = DEFAULT_OUT)]
    pub out: PathBuf,

    /// Also write a JSON document here.
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Also write a binary CSR file here.
    #[arg(long)]
    pub csr: Option<PathBuf>,

    /// Also write a Graphviz DOT file here.
    #[arg(long)]
    pub dot: Option<PathBuf>,
}

/// Options accepted by the `ensemble` command.
#[derive(Debug, Args, Clone)]
pub struct EnsembleCommand {
    /// Model parameters.
    #[command(flatten)]
    pub model: ModelArgs,

    /// Number of graphs to generate.
    #[arg(long, default_value_t = 100)]
    pub runs: u64,

    /// Seed of the first run; later runs use consecutive seeds.
    #[arg(long = "first-seed", default_value_t = 0)]
    pub first_seed: u64,
}

/// Options accepted by the `inspect` command.
#[derive(Debug, Args, Clone)]
pub struct InspectCommand {
    /// Binary CSR file to read.
    pub path: PathBuf,
}

/// Options accepted by the `detect` command.
#[derive(Debug, Args, Clone)]
pub struct DetectCommand {
    /// Binary CSR file to read.
    pub path: PathBuf,

    /// Maximum number of propagation sweeps.
    #[arg(long, default_value_t = DEFAULT_PROPAGATION_STEPS)]
    pub steps: u32,

    /// Seed for tie-breaking.
    #[arg(short = 's', long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// The model parameters were rejected.
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    /// Writing or reading a graph file failed.
    #[error(transparent)]
    Io(#[from] GraphIoError),
}

/// Result of a CLI command, rendered by [`render_summary`].
#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    /// A graph was generated and written.
    Generated {
        edges: usize,
        nodes: u32,
        /// Number of communities after clamping.
        communities: usize,
        out: PathBuf,
    },
    /// Ensemble statistics.
    Ensemble(EnsembleSummary),
    /// Contents of a CSR file.
    Inspected(CsrGraph),
    /// Communities found in a CSR file.
    Detected {
        /// Member slots of each community, ordered by smallest member.
        communities: Vec<Vec<usize>>,
        ranking: Vec<usize>,
    },
}

/// Execute the parsed command.
///
/// # Errors
/// Returns [`CliError`] when the parameters are invalid or a file operation
/// fails.
pub fn run_cli(cli: Cli) -> Result<Summary, CliError> {
    match cli.command {
        Command::Generate(command) => run_generate(&command),
        Command::Ensemble(command) => run_ensemble_command(&command),
        Command::Inspect(command) => Ok(Summary::Inspected(load_csr(&command.path)?)),
        Command::Detect(command) => run_detect(&command),
    }
}

fn run_detect(command: &DetectCommand) -> Result<Summary, CliError> {
    let csr = load_csr(&command.path)?;
    let mut rng = StdRng::seed_from_u64(command.seed);
    let detected = label_propagation(&csr, command.steps, &mut rng);
    let communities = detected.member_lists();
    info!(communities = communities.len(), "label propagation finished");
    Ok(Summary::Detected {
        communities,
        ranking: rank_neighbourhood(&csr),
    })
}

fn run_generate(command: &GenerateCommand) -> Result<Summary, CliError> {
    let seed = (!command.entropy).then_some(command.seed);
    let generator = CommunityGraphGenerator::new(command.model.to_config(seed)?)?;
    let graph = generator.generate();

    save_edge_list(&graph.edges, &command.out)?;
    if let Some(path) = &command.json {
        save_json(&graph, path)?;
    }
    if let Some(path) = &command.csr {
        save_csr(&graph, path)?;
    }
    if let Some(path) = &command.dot {
        graph
            .write_dot(create_output(path)?)
            .map_err(GraphIoError::from)?;
    }

    let degrees = graph.degree_summary();
    info!(
        components = graph.component_count(),
        isolated = degrees.isolated,
        max_degree = degrees.max,
        mean_degree = degrees.mean,
        "graph written"
    );

    Ok(Summary::Generated {
        edges: graph.edge_count(),
        nodes: graph.node_count(),
        communities: graph.partition.len(),
        out: command.out.clone(),
    })
}

fn run_ensemble_command(command: &EnsembleCommand) -> Result<Summary, CliError> {
    let config = command.model.to_config(None)?;
    let last = command.first_seed.saturating_add(command.runs);
    Ok(Summary::Ensemble(run_ensemble(
        &config,
        command.first_seed..last,
    )?))
}

/// Print `summary` for humans.
///
/// # Errors
/// Propagates failures of `writer`.
pub fn render_summary<W: Write>(summary: &Summary, writer: &mut W) -> io::Result<()> {
    match summary {
        Summary::Generated {
            edges,
            nodes,
            communities,
            out,
        } => writeln!(
            writer,
            "Saved {edges} edges for {nodes} nodes with {communities} communities to: {}",
            out.display()
        ),
        Summary::Ensemble(stats) => {
            writeln!(writer, "runs: {}", stats.runs)?;
            writeln!(writer, "mean intra-community edges: {:.3}", stats.mean_intra_edges)?;
            writeln!(writer, "mean inter-community edges: {:.3}", stats.mean_inter_edges)?;
            writeln!(writer, "mean edges: {:.3}", stats.mean_edges)?;
            writeln!(writer, "edges range: {}..={}", stats.min_edges, stats.max_edges)
        }
        Summary::Inspected(csr) => {
            let kind = if csr.is_directed() { "directed" } else { "undirected" };
            writeln!(writer, "type: {} ({kind})", csr.graph_type)?;
            writeln!(writer, "version: {}", csr.version)?;
            writeln!(writer, "nodes: {}", csr.node_count())?;
            writeln!(writer, "edges: {}", csr.edge_count())?;
            writeln!(writer, "offsets: {:?}", csr.offsets)?;
            writeln!(writer, "targets: {:?}", csr.targets)
        }
        Summary::Detected {
            communities,
            ranking,
        } => {
            writeln!(writer, "communities: {}", communities.len())?;
            let rank = |slot: usize| ranking.get(slot).copied().unwrap_or(0);
            for (index, members) in communities.iter().enumerate() {
                // Highest rank wins; the smaller slot wins ties.
                let hub = members
                    .iter()
                    .copied()
                    .max_by(|&a, &b| rank(a).cmp(&rank(b)).then(b.cmp(&a)))
                    .unwrap_or(0);
                writeln!(
                    writer,
                    "{index}: {members:?} hub {hub}, degree {}",
                    rank(hub)
                )?;
            }
            Ok(())
        }
    }
}
