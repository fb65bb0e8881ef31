//! JSON documents with nodes, edges and communities.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{GraphIoError, create_output};
use crate::generator::GeneratedGraph;
use crate::partition::NodeId;

/// A node entry of a [`GraphDocument`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub popularity: f64,
    /// Sorted ids of adjacent nodes.
    pub neighbours: Vec<NodeId>,
}

/// Serialisable snapshot of a generated graph.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeRecord>,
    /// Edges as sorted `[u, v]` pairs.
    pub edges: Vec<[NodeId; 2]>,
    /// Member ids of each community, sorted.
    pub communities: Vec<Vec<NodeId>>,
}

impl GraphDocument {
    /// Build the document for `graph`.
    #[must_use]
    pub fn from_graph(graph: &GeneratedGraph) -> Self {
        let nodes = graph
            .popularity
            .iter()
            .zip(graph.neighbours())
            .map(|((id, popularity), neighbours)| NodeRecord {
                id,
                popularity,
                neighbours,
            })
            .collect();
        let edges = graph
            .edges
            .iter()
            .map(|edge| [edge.u(), edge.v()])
            .collect();
        Self {
            nodes,
            edges,
            communities: graph.partition.member_lists(),
        }
    }
}

/// Write `graph` as pretty-printed JSON.
///
/// # Errors
/// Returns [`GraphIoError`] when serialisation or the writer fails.
pub fn write_json<W: Write>(graph: &GeneratedGraph, mut writer: W) -> Result<(), GraphIoError> {
    serde_json::to_writer_pretty(&mut writer, &GraphDocument::from_graph(graph))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write `graph` as JSON to `path`, creating parent directories as needed.
///
/// # Errors
/// Returns [`GraphIoError`] when the file cannot be created or written.
pub fn save_json(graph: &GeneratedGraph, path: &Path) -> Result<(), GraphIoError> {
    write_json(graph, create_output(path)?)
}

/// Parse a JSON document.
///
/// # Errors
/// Returns [`GraphIoError::Json`] when the input is not a valid document.
pub fn read_json<R: Read>(reader: R) -> Result<GraphDocument, GraphIoError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Read the JSON document stored at `path`.
///
/// # Errors
/// Returns [`GraphIoError`] when the file cannot be opened or parsed.
pub fn load_json(path: &Path) -> Result<GraphDocument, GraphIoError> {
    read_json(BufReader::new(File::open(path)?))
}
