//! Per-point and per-edge highlight state derived from a [`MergedSelection`].

use serde::{Deserialize, Serialize};

use crate::connection::ConnectionIndex;
use crate::data::{EdgeIndex, PointIndex};
use crate::selection::{MergeMode, MergedSelection};

/// Display tier of a point after a highlight pass.
///
/// The GPU filter keeps values in `[-0.5, 1.5]` with full opacity only around 1,
/// so only `Active` is drawn at full strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighlightTier {
    Dim,
    Hidden,
    Active,
}

impl HighlightTier {
    /// Numeric value handed to the renderer's filter attribute.
    pub fn filter_value(self) -> f32 {
        match self {
            HighlightTier::Dim => -1.0,
            HighlightTier::Hidden => 0.0,
            HighlightTier::Active => 1.0,
        }
    }

    pub fn is_active(self) -> bool {
        self == HighlightTier::Active
    }
}

/// Result of one highlight pass. Recreated on every pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightArrays {
    pub points: Vec<HighlightTier>,
    pub edges: Vec<bool>,
}

impl HighlightArrays {
    /// Everything active, every edge selected.
    pub fn all_active(point_count: usize, edge_count: usize) -> Self {
        Self {
            points: vec![HighlightTier::Active; point_count],
            edges: vec![true; edge_count],
        }
    }

    /// Derive the arrays for `merged`.
    ///
    /// Primary points and their direct targets become active and the edges
    /// between them selected. The background tier depends on the merge mode.
    pub fn compute(
        merged: &MergedSelection,
        connections: &ConnectionIndex,
        point_count: usize,
        edge_count: usize,
    ) -> Self {
        let background = match merged.mode() {
            MergeMode::Unconstrained => return Self::all_active(point_count, edge_count),
            MergeMode::Plain | MergeMode::LassoTiered => HighlightTier::Dim,
            MergeMode::LassoOnly => HighlightTier::Hidden,
        };

        let mut arrays = Self {
            points: vec![background; point_count],
            edges: vec![false; edge_count],
        };

        if merged.mode() == MergeMode::LassoTiered {
            for &i in &merged.semi_selected {
                arrays.set_point(i, HighlightTier::Hidden);
            }
        }

        for &i in &merged.selected {
            arrays.set_point(i, HighlightTier::Active);
            for connection in connections.connections(i) {
                arrays.set_point(connection.connected_point, HighlightTier::Active);
                if let Some(edge) = arrays.edges.get_mut(connection.edge_index) {
                    *edge = true;
                }
            }
        }

        arrays
    }

    fn set_point(&mut self, index: PointIndex, tier: HighlightTier) {
        if let Some(slot) = self.points.get_mut(index) {
            *slot = tier;
        }
    }

    pub fn tier(&self, index: PointIndex) -> Option<HighlightTier> {
        self.points.get(index).copied()
    }

    pub fn is_edge_selected(&self, index: EdgeIndex) -> bool {
        self.edges.get(index).copied().unwrap_or(false)
    }

    pub fn filter_values(&self) -> Vec<f32> {
        self.points.iter().map(|t| t.filter_value()).collect()
    }

    pub fn active_count(&self) -> usize {
        self.points.iter().filter(|t| t.is_active()).count()
    }
}
