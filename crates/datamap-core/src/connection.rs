use serde::{Deserialize, Serialize};

use crate::data::{Edge, EdgeIndex, PointIndex};

/// One outgoing connection of a point: the edge's target and the edge itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub connected_point: PointIndex,
    pub edge_index: EdgeIndex,
}

/// Per-point adjacency list, following edge direction (source -> target only).
///
/// Every point in `[0, N)` has an entry, possibly empty. Built once per
/// point/edge load and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionIndex {
    adjacency: Vec<Vec<Connection>>,
    edge_count: usize,
}

impl ConnectionIndex {
    /// Build the index in O(M). Edges with an endpoint outside `[0, point_count)`
    /// are skipped with a warning; their edge index is not reused.
    pub fn build(edges: &[Edge], point_count: usize) -> Self {
        let mut adjacency = vec![Vec::new(); point_count];
        let mut skipped = 0usize;

        for (edge_index, edge) in edges.iter().enumerate() {
            if edge.source >= point_count || edge.target >= point_count {
                log::warn!(
                    "Edge {} has out-of-range endpoints {} -> {} ({} points), skipping",
                    edge_index,
                    edge.source,
                    edge.target,
                    point_count
                );
                skipped += 1;
                continue;
            }
            adjacency[edge.source].push(Connection {
                connected_point: edge.target,
                edge_index,
            });
        }

        log::debug!(
            "Connection index built: {} points, {} edges ({} skipped)",
            point_count,
            edges.len(),
            skipped
        );

        Self {
            adjacency,
            edge_count: edges.len(),
        }
    }

    /// Outgoing connections of `point`; empty for unknown points.
    pub fn connections(&self, point: PointIndex) -> &[Connection] {
        self.adjacency.get(point).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn point_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.iter().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<Edge> {
        vec![Edge::new(0, 1, 1.0), Edge::new(1, 2, 1.0), Edge::new(0, 3, 1.0)]
    }

    #[test]
    fn test_build_directional() {
        let index = ConnectionIndex::build(&chain(), 4);
        assert_eq!(index.point_count(), 4);
        assert_eq!(
            index.connections(0),
            &[
                Connection {
                    connected_point: 1,
                    edge_index: 0
                },
                Connection {
                    connected_point: 3,
                    edge_index: 2
                },
            ]
        );
        // Target-only points get an empty entry, not a missing one.
        assert!(index.connections(3).is_empty());
        assert!(index.connections(2).is_empty());
    }

    #[test]
    fn test_malformed_edges_skipped() {
        let _ = env_logger::builder().is_test(true).try_init();
        let edges = vec![Edge::new(0, 9, 1.0), Edge::new(7, 0, 1.0), Edge::new(1, 0, 1.0)];
        let index = ConnectionIndex::build(&edges, 2);
        assert!(index.connections(0).is_empty());
        assert_eq!(index.connections(1)[0].edge_index, 2);
        assert_eq!(index.edge_count(), 3);
    }

    #[test]
    fn test_unknown_point_is_empty() {
        let index = ConnectionIndex::build(&chain(), 4);
        assert!(index.connections(42).is_empty());
        assert!(ConnectionIndex::default().is_empty());
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = ConnectionIndex::build(&chain(), 4);
        let b = ConnectionIndex::build(&chain(), 4);
        assert_eq!(a, b);
    }
}
