//! Highlight projection: turns highlight arrays into per-layer attribute arrays.

use datamap_core::data::Label;
use datamap_core::{HighlightArrays, HighlightTier, MergedSelection};

use crate::render_data::ChevronMarker;

/// Collision priority that reserves label space for primary selections.
pub const PRIMARY_COLLISION_PRIORITY: f32 = 500.0;
/// Size multiplier for labels of primary-selected points.
pub const PRIMARY_LABEL_SCALE: f32 = 4.0;
/// Font weight for labels of primary-selected points.
pub const PRIMARY_FONT_WEIGHT: u16 = 900;

/// Label attributes for one pass, in label insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelProjection {
    pub visible: Vec<bool>,
    pub texts: Vec<String>,
    pub sizes: Vec<f32>,
    pub collision_priorities: Vec<f32>,
    pub font_weights: Vec<u16>,
}

/// Everything the layer sync needs for one highlight pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub filter_values: Vec<f32>,
    pub radius_min_pixels: f32,
    pub edge_visible: Vec<bool>,
    pub chevron_visible: Vec<bool>,
    pub labels: LabelProjection,
}

/// Damping of the radius emphasis: shrinks as the selection grows relative
/// to the point count. Zero when there is nothing to damp against.
pub fn size_adjust(selected_count: usize, point_count: usize) -> f32 {
    if selected_count == 0 || point_count <= 1 {
        return 0.0;
    }
    let ratio = (selected_count as f64).sqrt() / (point_count as f64).log2();
    (1.0 / (1.0 + ratio)) as f32
}

/// Minimum point radius for the current selection.
pub fn emphasized_radius(
    base_radius_min_pixels: f32,
    selected_count: usize,
    point_count: usize,
) -> f32 {
    if selected_count == 0 {
        return base_radius_min_pixels;
    }
    2.0 * (base_radius_min_pixels + size_adjust(selected_count, point_count))
}

/// Stateless projector parameterised by the configured base styles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightProjector {
    pub base_radius_min_pixels: f32,
    pub base_font_weight: u16,
}

impl HighlightProjector {
    pub fn new(base_radius_min_pixels: f32, base_font_weight: u16) -> Self {
        Self {
            base_radius_min_pixels,
            base_font_weight,
        }
    }

    pub fn project(
        &self,
        merged: &MergedSelection,
        arrays: &HighlightArrays,
        labels: &[Label],
        chevrons: &[ChevronMarker],
    ) -> Projection {
        Projection {
            filter_values: arrays.filter_values(),
            radius_min_pixels: emphasized_radius(
                self.base_radius_min_pixels,
                merged.selected.len(),
                arrays.points.len(),
            ),
            edge_visible: arrays.edges.clone(),
            chevron_visible: chevrons
                .iter()
                .map(|m| arrays.is_edge_selected(m.edge_index))
                .collect(),
            labels: self.project_labels(merged, arrays, labels),
        }
    }

    fn project_labels(
        &self,
        merged: &MergedSelection,
        arrays: &HighlightArrays,
        labels: &[Label],
    ) -> LabelProjection {
        // Labels past the loaded points follow the unconstrained state.
        let fallback = if merged.has_primary() {
            HighlightTier::Dim
        } else {
            HighlightTier::Active
        };

        let mut out = LabelProjection::default();
        for (i, label) in labels.iter().enumerate() {
            let visible = arrays.tier(i).unwrap_or(fallback).is_active();
            let primary = merged.is_primary(i);

            let (text, size, priority) = match (visible, primary) {
                (false, _) => (String::new(), 0.0, 0.0),
                (true, true) => (
                    label.text.clone(),
                    label.size * PRIMARY_LABEL_SCALE,
                    PRIMARY_COLLISION_PRIORITY,
                ),
                (true, false) => (label.text.clone(), label.size, label.size),
            };

            out.visible.push(visible);
            out.texts.push(text);
            out.sizes.push(size);
            out.collision_priorities.push(priority);
            out.font_weights.push(if primary {
                PRIMARY_FONT_WEIGHT
            } else {
                self.base_font_weight
            });
        }
        out
    }
}
