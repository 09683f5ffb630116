use datamap_core::data::Edge;
use datamap_core::geometry::Point;

use crate::render_data::ChevronMarker;

pub const CHEVRON_SYMBOL: char = '>';

/// Upper bound on the parts a single edge is split into.
pub const MAX_CHEVRON_PARTS: usize = 1024;

/// Place direction markers periodically along every edge.
///
/// An edge of length `d` is split into `max(floor(d / spacing), 1)` parts and
/// a marker sits on each interior split point, so short edges get none.
/// Long edges are capped at [`MAX_CHEVRON_PARTS`] parts.
pub fn generate_chevrons(edges: &[Edge], positions: &[Point], spacing: f64) -> Vec<ChevronMarker> {
    if !(spacing.is_finite() && spacing > 0.0) {
        log::warn!("Chevron spacing {} is not positive, no chevrons generated", spacing);
        return Vec::new();
    }

    let mut markers = Vec::new();
    for (edge_index, edge) in edges.iter().enumerate() {
        let (Some(source), Some(target)) = (positions.get(edge.source), positions.get(edge.target))
        else {
            continue;
        };

        let distance = source.distance_to(target);
        if !distance.is_finite() {
            continue;
        }
        let angle = source.angle_to(target);
        let parts = (distance / spacing).floor();
        let count = if parts >= MAX_CHEVRON_PARTS as f64 {
            log::warn!(
                "Edge {} needs {} chevrons at spacing {}, capped at {}",
                edge_index,
                parts,
                spacing,
                MAX_CHEVRON_PARTS
            );
            MAX_CHEVRON_PARTS
        } else {
            (parts as usize).max(1)
        };

        markers.extend((1..count).map(|j| ChevronMarker {
            position: source.lerp(target, j as f64 / count as f64),
            angle,
            symbol: CHEVRON_SYMBOL,
            edge_index,
        }));
    }
    markers
}
