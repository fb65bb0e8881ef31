//! Binary compressed-sparse-row layout.
//!
//! ```text
//! offset  size  field
//! 0       1     graph type (0 = undirected)
//! 1       1     format version
//! 2       8     node slot count  (u64, little-endian)
//! 10      8     target count     (u64, little-endian)
//! 18      4*(node_count+1)       offsets (i32, little-endian)
//! ...     4*edge_count           targets (i32, little-endian)
//! ```
//!
//! Node ids index slots directly, so slot 0 is always empty and a graph of
//! `n` nodes has `n + 1` slots. Each undirected edge appears once in the
//! targets of both endpoints.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use tracing::debug;

use super::{GraphIoError, create_output};
use crate::generator::GeneratedGraph;

/// Graph type tag for undirected graphs.
pub const GRAPH_TYPE_UNDIRECTED: u8 = 0;
/// Graph type tag for directed graphs.
pub const GRAPH_TYPE_DIRECTED: u8 = 1;
/// Format version written and understood by this module.
pub const CSR_VERSION: u8 = 1;
/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 18;

/// In-memory CSR graph.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CsrGraph {
    pub graph_type: u8,
    pub version: u8,
    /// `node_count + 1` offsets into `targets`.
    pub offsets: Vec<i32>,
    /// Concatenated neighbour lists.
    pub targets: Vec<i32>,
}

impl CsrGraph {
    /// Encode `graph` with neighbours sorted per slot.
    ///
    /// # Errors
    /// Returns [`GraphIoError::CsrOverflow`] when a node id or the total
    /// number of targets exceeds `i32::MAX`.
    pub fn from_graph(graph: &GeneratedGraph) -> Result<Self, GraphIoError> {
        let slots = u64::from(graph.node_count()) + 1;
        to_i32("node slot count", slots)?;
        let targets_len = graph.edge_count() as u64 * 2;
        to_i32("target count", targets_len)?;

        let mut offsets = Vec::with_capacity(slots as usize + 1);
        let mut targets = Vec::with_capacity(targets_len as usize);
        // Slot 0 has no node.
        offsets.push(0);
        offsets.push(0);
        for list in graph.neighbours() {
            for neighbour in list {
                targets.push(to_i32("node id", u64::from(neighbour))?);
            }
            offsets.push(to_i32("offset", targets.len() as u64)?);
        }

        Ok(Self {
            graph_type: GRAPH_TYPE_UNDIRECTED,
            version: CSR_VERSION,
            offsets,
            targets,
        })
    }

    /// Number of node slots, including the empty slot 0.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Number of stored targets.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    /// Neighbours of slot `node`, or `None` when out of range.
    #[must_use]
    pub fn neighbours(&self, node: usize) -> Option<&[i32]> {
        let start = usize::try_from(*self.offsets.get(node)?).ok()?;
        let end = usize::try_from(*self.offsets.get(node + 1)?).ok()?;
        self.targets.get(start..end)
    }

    /// Serialise header and arrays.
    ///
    /// # Errors
    /// Returns [`GraphIoError::Io`] when the writer fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), GraphIoError> {
        writer.write_all(&[self.graph_type, self.version])?;
        writer.write_all(&(self.node_count() as u64).to_le_bytes())?;
        writer.write_all(&(self.edge_count() as u64).to_le_bytes())?;
        for value in self.offsets.iter().chain(&self.targets) {
            writer.write_all(&value.to_le_bytes())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Parse and validate a CSR stream.
    ///
    /// # Errors
    /// Returns [`GraphIoError::UnsupportedCsrVersion`] for unknown versions,
    /// [`GraphIoError::CsrCorrupt`] when offsets or targets are inconsistent
    /// and [`GraphIoError::Io`] when the stream ends early.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self, GraphIoError> {
        let mut header = [0_u8; HEADER_LEN];
        reader.read_exact(&mut header)?;
        let [graph_type, version, rest @ ..] = header;
        if version != CSR_VERSION {
            return Err(GraphIoError::UnsupportedCsrVersion {
                found: version,
                expected: CSR_VERSION,
            });
        }
        let (node_bytes, edge_bytes) = rest.split_at(8);
        let node_count = u64::from_le_bytes(to_array(node_bytes)?);
        let edge_count = u64::from_le_bytes(to_array(edge_bytes)?);
        let node_count = usize::try_from(to_i32("node slot count", node_count)?)
            .map_err(|_| corrupt("negative node slot count"))?;
        let edge_count = usize::try_from(to_i32("target count", edge_count)?)
            .map_err(|_| corrupt("negative target count"))?;
        debug!(graph_type, version, node_count, edge_count, "read CSR header");

        let offsets = read_i32s(&mut reader, node_count + 1)?;
        let targets = read_i32s(&mut reader, edge_count)?;
        let graph = Self {
            graph_type,
            version,
            offsets,
            targets,
        };
        graph.validate()?;
        Ok(graph)
    }

    /// Whether the type byte marks a directed graph.
    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.graph_type == GRAPH_TYPE_DIRECTED
    }

    fn validate(&self) -> Result<(), GraphIoError> {
        if !matches!(self.graph_type, GRAPH_TYPE_UNDIRECTED | GRAPH_TYPE_DIRECTED) {
            return Err(corrupt(&format!("unknown graph type {}", self.graph_type)));
        }
        if self.offsets.first() != Some(&0) {
            return Err(corrupt("first offset must be 0"));
        }
        if self.offsets.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(corrupt("offsets must be non-decreasing"));
        }
        let last = self.offsets.last().copied().unwrap_or(0);
        if usize::try_from(last).ok() != Some(self.targets.len()) {
            return Err(corrupt("last offset must equal the target count"));
        }
        let slots = self.node_count();
        if let Some(target) = self
            .targets
            .iter()
            .find(|&&target| usize::try_from(target).map_or(true, |t| t >= slots))
        {
            return Err(corrupt(&format!("target {target} is not a node slot")));
        }
        Ok(())
    }
}

/// Write `graph` in CSR form to `path`, creating parent directories as
/// needed.
///
/// # Errors
/// Returns [`GraphIoError`] when encoding or writing fails.
pub fn save_csr(graph: &GeneratedGraph, path: &Path) -> Result<(), GraphIoError> {
    CsrGraph::from_graph(graph)?.write_to(create_output(path)?)
}

/// Read and validate the CSR file at `path`.
///
/// # Errors
/// Returns [`GraphIoError`] when the file cannot be opened or is invalid.
pub fn load_csr(path: &Path) -> Result<CsrGraph, GraphIoError> {
    CsrGraph::read_from(BufReader::new(File::open(path)?))
}

fn to_i32(what: &'static str, value: u64) -> Result<i32, GraphIoError> {
    i32::try_from(value).map_err(|_| GraphIoError::CsrOverflow { what, value })
}

fn to_array(bytes: &[u8]) -> Result<[u8; 8], GraphIoError> {
    bytes
        .try_into()
        .map_err(|_| corrupt("truncated header field"))
}

fn corrupt(reason: &str) -> GraphIoError {
    GraphIoError::CsrCorrupt {
        reason: reason.to_owned(),
    }
}

fn read_i32s<R: Read>(reader: &mut R, count: usize) -> Result<Vec<i32>, GraphIoError> {
    // Cap the up-front reservation; a lying header must not allocate gigabytes.
    let mut values = Vec::with_capacity(count.min(1 << 16));
    let mut buffer = [0_u8; 4];
    for _ in 0..count {
        reader.read_exact(&mut buffer)?;
        values.push(i32::from_le_bytes(buffer));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::config::GeneratorConfig;
    use crate::generator::generate;
    use crate::popularity::PopularityModel;

    fn path_graph_bytes() -> Vec<u8> {
        // Nodes 1..=3, edges (1,2) and (2,3).
        let mut bytes = vec![GRAPH_TYPE_UNDIRECTED, CSR_VERSION];
        bytes.extend_from_slice(&4_u64.to_le_bytes());
        bytes.extend_from_slice(&4_u64.to_le_bytes());
        for value in [0_i32, 0, 1, 3, 4, 2, 1, 3, 2] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn encodes_both_directions_with_empty_slot_zero() {
        let config = GeneratorConfig::new(4, 2)
            .with_probabilities(1.0, 0.0)
            .with_popularity(PopularityModel::default(), 0.0, false);
        let csr = CsrGraph::from_graph(&generate(config).expect("valid config"))
            .expect("fits in i32");
        assert_eq!(csr.graph_type, GRAPH_TYPE_UNDIRECTED);
        assert_eq!(csr.node_count(), 5);
        assert_eq!(csr.offsets, vec![0, 0, 1, 2, 3, 4]);
        assert_eq!(csr.targets, vec![2, 1, 4, 3]);
        assert_eq!(csr.neighbours(0), Some(&[][..]));
        assert_eq!(csr.neighbours(3), Some(&[4][..]));
        assert_eq!(csr.neighbours(9), None);
    }

    #[test]
    fn writes_little_endian_header_and_arrays() {
        let csr = CsrGraph::read_from(path_graph_bytes().as_slice()).expect("valid bytes");
        let mut buffer = Vec::new();
        csr.write_to(&mut buffer).expect("in-memory write");
        assert_eq!(buffer.len(), HEADER_LEN + 4 * (5 + 4));
        assert_eq!(buffer, path_graph_bytes());
    }

    #[test]
    fn reads_header_and_adjacency() {
        let csr = CsrGraph::read_from(path_graph_bytes().as_slice()).expect("valid bytes");
        assert_eq!(csr.node_count(), 4);
        assert_eq!(csr.edge_count(), 4);
        assert_eq!(csr.neighbours(2), Some(&[1, 3][..]));
    }

    #[test]
    fn rejects_unknown_versions() {
        let mut bytes = path_graph_bytes();
        bytes[1] = 9;
        let err = CsrGraph::read_from(bytes.as_slice()).expect_err("bad version");
        assert!(matches!(
            err,
            GraphIoError::UnsupportedCsrVersion { found: 9, expected: CSR_VERSION }
        ));
    }

    #[rstest]
    #[case(GRAPH_TYPE_UNDIRECTED, false)]
    #[case(GRAPH_TYPE_DIRECTED, true)]
    fn reads_both_graph_types(#[case] graph_type: u8, #[case] directed: bool) {
        let mut bytes = path_graph_bytes();
        bytes[0] = graph_type;
        let csr = CsrGraph::read_from(bytes.as_slice()).expect("known type");
        assert_eq!(csr.is_directed(), directed);
    }

    #[test]
    fn rejects_unknown_graph_types() {
        let mut bytes = path_graph_bytes();
        bytes[0] = 7;
        let err = CsrGraph::read_from(bytes.as_slice()).expect_err("bad type");
        assert!(matches!(err, GraphIoError::CsrCorrupt { .. }), "got {err:?}");
    }

    #[test]
    fn rejects_truncated_payloads() {
        let bytes = path_graph_bytes();
        let err = CsrGraph::read_from(&bytes[..bytes.len() - 2]).expect_err("truncated");
        assert!(matches!(err, GraphIoError::Io(_)));
    }

    #[rstest]
    #[case(2, 5)] // decreasing offsets
    #[case(4, 3)] // last offset below target count
    #[case(8, 7)] // target past the last slot
    fn rejects_inconsistent_arrays(#[case] index: usize, #[case] value: i32) {
        let mut bytes = path_graph_bytes();
        let at = HEADER_LEN + 4 * index;
        bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
        let err = CsrGraph::read_from(bytes.as_slice()).expect_err("inconsistent");
        assert!(matches!(err, GraphIoError::CsrCorrupt { .. }), "got {err:?}");
    }

    #[test]
    fn saved_files_load_back() {
        let config = GeneratorConfig::new(30, 3).with_seed(Some(4));
        let graph = generate(config).expect("valid config");
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("graph.bin");
        save_csr(&graph, &path).expect("save");
        let csr = load_csr(&path).expect("load");
        assert_eq!(csr, CsrGraph::from_graph(&graph).expect("fits"));
        assert_eq!(csr.edge_count(), 2 * graph.edge_count());
    }
}
