use datamap_core::LayerKind;

use crate::projector::Projection;
use crate::render_data::{LayerDescriptor, LayerProps};

/// Ordered set of layer descriptors, back to front.
///
/// New kinds are inserted at their priority slot; replacing a layer keeps its
/// position. A highlight pass bumps the version once and stamps it on every
/// layer it rewrites.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<LayerDescriptor>,
    version: u64,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer, replacing any existing layer of the same kind in place.
    pub fn insert(&mut self, layer: LayerDescriptor) {
        let layer = layer.with_version(self.version);
        if let Some(slot) = self.layers.iter_mut().find(|l| l.kind() == layer.kind()) {
            *slot = layer;
            return;
        }
        let at = self
            .layers
            .iter()
            .position(|l| l.kind().priority() > layer.kind().priority())
            .unwrap_or(self.layers.len());
        self.layers.insert(at, layer);
    }

    pub fn get(&self, kind: LayerKind) -> Option<&LayerDescriptor> {
        self.layers.iter().find(|l| l.kind() == kind)
    }

    pub fn contains(&self, kind: LayerKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn layers(&self) -> &[LayerDescriptor] {
        &self.layers
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Merge one pass of projected attributes into the highlighted layers.
    ///
    /// Layers that do not exist yet are skipped. Returns the new version.
    pub fn apply(&mut self, projection: &Projection) -> u64 {
        self.version += 1;
        let version = self.version;

        for slot in self.layers.iter_mut() {
            if !slot.kind().is_highlighted() {
                continue;
            }
            let mut next = slot.clone().with_version(version);
            match &mut next.props {
                LayerProps::Points(props) => {
                    props.filter.values = projection.filter_values.clone();
                    props.radius_min_pixels = projection.radius_min_pixels;
                }
                LayerProps::Edges(props) => {
                    let base = props.style.color;
                    props.colors = (0..props.widths.len())
                        .map(|j| {
                            let selected = projection.edge_visible.get(j).copied().unwrap_or(false);
                            base.with_alpha(if selected { base.a } else { 0 }).to_array()
                        })
                        .collect();
                }
                LayerProps::Chevrons(props) => {
                    props.texts = props
                        .markers
                        .iter()
                        .enumerate()
                        .map(|(k, m)| {
                            if projection.chevron_visible.get(k).copied().unwrap_or(false) {
                                m.symbol.to_string()
                            } else {
                                String::new()
                            }
                        })
                        .collect();
                }
                LayerProps::Labels(props) => {
                    let labels = &projection.labels;
                    if labels.texts.len() != props.labels.len() {
                        log::warn!(
                            "Label projection covers {} labels, layer has {}; skipping",
                            labels.texts.len(),
                            props.labels.len()
                        );
                        continue;
                    }
                    props.texts = labels.texts.clone();
                    props.sizes = labels.sizes.clone();
                    props.collision_priorities = labels.collision_priorities.clone();
                    props.font_weights = labels.font_weights.clone();
                }
                LayerProps::Boundaries(_) => continue,
            }
            *slot = next;
        }

        log::debug!("Layer sync pass {} over {} layers", version, self.layers.len());
        version
    }
}
