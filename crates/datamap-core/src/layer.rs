use serde::{Deserialize, Serialize};

/// The visual layers of a data map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LayerKind {
    Edges,
    Chevrons,
    Points,
    Boundaries,
    Labels,
}

/// Back-to-front render order. Layers are sorted by this only when inserted.
pub const LAYER_ORDER: [LayerKind; 5] = [
    LayerKind::Edges,
    LayerKind::Chevrons,
    LayerKind::Points,
    LayerKind::Boundaries,
    LayerKind::Labels,
];

impl LayerKind {
    /// Layer id as known by the renderer.
    pub fn id(self) -> &'static str {
        match self {
            LayerKind::Edges => "EdgeLayer",
            LayerKind::Chevrons => "ChevronLayer",
            LayerKind::Points => "dataPointLayer",
            LayerKind::Boundaries => "boundaryLayer",
            LayerKind::Labels => "LabelLayer",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        LAYER_ORDER.into_iter().find(|k| k.id() == id)
    }

    /// Position in [`LAYER_ORDER`]; lower draws first.
    pub fn priority(self) -> usize {
        LAYER_ORDER
            .iter()
            .position(|&k| k == self)
            .unwrap_or(LAYER_ORDER.len())
    }

    /// Whether a highlight pass rewrites this layer.
    pub fn is_highlighted(self) -> bool {
        !matches!(self, LayerKind::Boundaries)
    }
}
