//! Plain-text edge lists: one `u v` pair per line, sorted by `(u, v)`.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

use super::{GraphIoError, create_output};
use crate::edges::{Edge, EdgeSet};
use crate::partition::NodeId;

/// Write `edges` in ascending order, one space-separated pair per line.
///
/// # Errors
/// Returns [`GraphIoError`] when the writer fails.
pub fn write_edge_list<W: Write>(edges: &EdgeSet, writer: W) -> Result<(), GraphIoError> {
    let mut csv = WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .from_writer(writer);
    for edge in edges {
        csv.serialize(edge.endpoints())?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `edges` to `path`, creating parent directories as needed.
///
/// # Errors
/// Returns [`GraphIoError`] when the file cannot be created or written.
pub fn save_edge_list(edges: &EdgeSet, path: &Path) -> Result<(), GraphIoError> {
    write_edge_list(edges, create_output(path)?)
}

/// Parse an edge list back into an [`EdgeSet`].
///
/// Runs of spaces between the two ids are tolerated and blank lines are
/// skipped. Pairs may appear in either orientation; duplicates collapse.
///
/// # Errors
/// Returns [`GraphIoError::InvalidEdgeRecord`] for records that are not two
/// positive integers and [`GraphIoError::SelfLoop`] for `v v` records.
pub fn read_edge_list<R: Read>(reader: R) -> Result<EdgeSet, GraphIoError> {
    let mut csv = ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut edges = EdgeSet::new();
    let mut record = StringRecord::new();
    let mut number = 0_u64;
    while csv.read_record(&mut record)? {
        number += 1;
        let (a, b) = parse_record(&record, number)?;
        if let Some(edge) = Edge::new(a, b) {
            edges.insert(edge);
        } else {
            return Err(GraphIoError::SelfLoop {
                record: number,
                node: a,
            });
        }
    }
    Ok(edges)
}

/// Read the edge list stored at `path`.
///
/// # Errors
/// Returns [`GraphIoError`] when the file cannot be opened or parsed.
pub fn load_edge_list(path: &Path) -> Result<EdgeSet, GraphIoError> {
    read_edge_list(BufReader::new(File::open(path)?))
}

fn parse_record(record: &StringRecord, number: u64) -> Result<(NodeId, NodeId), GraphIoError> {
    let fields: Vec<&str> = record.iter().filter(|field| !field.is_empty()).collect();
    let [a, b] = fields.as_slice() else {
        return Err(GraphIoError::InvalidEdgeRecord {
            record: number,
            reason: format!("expected 2 node ids, found {}", fields.len()),
        });
    };
    Ok((parse_node(a, number)?, parse_node(b, number)?))
}

fn parse_node(raw: &str, number: u64) -> Result<NodeId, GraphIoError> {
    match raw.parse::<NodeId>() {
        Ok(0) => Err(GraphIoError::InvalidEdgeRecord {
            record: number,
            reason: "node ids start at 1".to_owned(),
        }),
        Ok(node) => Ok(node),
        Err(err) => Err(GraphIoError::InvalidEdgeRecord {
            record: number,
            reason: format!("`{raw}` is not a node id: {err}"),
        }),
    }
}
