use serde::{Deserialize, Serialize};

use datamap_core::data::{Boundary, DataPoint, Edge, EdgeIndex, Label};
use datamap_core::geometry::{Point, Rgba};
use datamap_core::LayerKind;

use crate::viewport::ViewState;

/// Filter attribute range: values ≈ 1 pass, -1 and 0 are filtered out.
pub const FILTER_RANGE: [f32; 2] = [-0.5, 1.5];
/// Soft edge of the filter range.
pub const FILTER_SOFT_RANGE: [f32; 2] = [0.75, 1.25];

// ── Styles (configured once, preserved across highlight passes) ──────

/// Static styling of the point layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointStyle {
    /// Uniform radius; a negative value switches to per-point sizes.
    pub point_size: f32,
    pub outline_color: Rgba,
    pub line_width: f32,
    pub hover_color: Rgba,
    pub line_width_min_pixels: f32,
    pub line_width_max_pixels: f32,
    pub radius_min_pixels: f32,
    pub radius_max_pixels: f32,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            point_size: 1.0,
            outline_color: Rgba::new(250, 250, 250, 128),
            line_width: 0.001,
            hover_color: Rgba::new(170, 0, 0, 187),
            line_width_min_pixels: 0.001,
            line_width_max_pixels: 3.0,
            radius_min_pixels: 0.2,
            radius_max_pixels: 16.0,
        }
    }
}

impl PointStyle {
    pub fn variable_size(&self) -> bool {
        self.point_size < 0.0
    }
}

/// Static styling of the edge and chevron layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeStyle {
    pub color: Rgba,
    pub width_units: String,
    pub width_min_pixels: f32,
    pub width_max_pixels: f32,
    pub pickable: bool,
    /// Distance between chevrons along an edge, in data units.
    pub chevron_spacing: f64,
    pub chevron_color: Rgba,
    pub chevron_size_pixels: f32,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            color: Rgba::new(128, 128, 128, 128),
            width_units: "pixels".to_string(),
            width_min_pixels: 1.0,
            width_max_pixels: 10.0,
            pickable: false,
            chevron_spacing: 0.05,
            chevron_color: Rgba::new(100, 100, 100, 255),
            chevron_size_pixels: 8.0,
        }
    }
}

/// Static styling of the label layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    pub text_min_pixel_size: f32,
    pub text_max_pixel_size: f32,
    pub outline_width: f32,
    pub outline_color: Rgba,
    pub background_color: Rgba,
    pub font_family: String,
    pub font_weight: u16,
    pub line_spacing: f32,
    pub collision_size_scale: f32,
    /// Maximum time to wait for the font, in milliseconds.
    pub font_wait_ms: u64,
    /// Polling interval while waiting for the font, in milliseconds.
    pub font_poll_ms: u64,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            text_min_pixel_size: 18.0,
            text_max_pixel_size: 36.0,
            outline_width: 8.0,
            outline_color: Rgba::new(238, 238, 238, 221),
            background_color: Rgba::new(255, 255, 255, 64),
            font_family: "Roboto".to_string(),
            font_weight: 500,
            line_spacing: 0.95,
            collision_size_scale: 3.0,
            font_wait_ms: 500,
            font_poll_ms: 50,
        }
    }
}

/// Static styling of the cluster boundary layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryStyle {
    pub cluster_boundary_line_width: f32,
    pub line_width_max_pixels: f32,
}

impl Default for BoundaryStyle {
    fn default() -> Self {
        Self {
            cluster_boundary_line_width: 0.5,
            line_width_max_pixels: 4.0,
        }
    }
}

// ── Per-layer render data ─────────────────────────────────────────────

/// GPU data-filter settings of the point layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterProps {
    pub values: Vec<f32>,
    pub range: [f32; 2],
    pub soft_range: [f32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLayerProps {
    pub positions: Vec<[f64; 2]>,
    pub colors: Vec<[u8; 4]>,
    /// Per-point radii in variable-size mode.
    pub radii: Option<Vec<f32>>,
    /// Effective minimum radius after selection emphasis.
    pub radius_min_pixels: f32,
    pub filter: FilterProps,
    pub style: PointStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeLayerProps {
    pub source_positions: Vec<[f64; 2]>,
    pub target_positions: Vec<[f64; 2]>,
    pub widths: Vec<f32>,
    /// Per-edge color; alpha is zeroed for deselected edges.
    pub colors: Vec<[u8; 4]>,
    pub style: EdgeStyle,
}

/// A direction glyph placed along an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChevronMarker {
    pub position: Point,
    /// Rotation in degrees.
    pub angle: f64,
    pub symbol: char,
    pub edge_index: EdgeIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChevronLayerProps {
    pub markers: Vec<ChevronMarker>,
    /// Glyph per marker; empty when the parent edge is hidden.
    pub texts: Vec<String>,
    pub color: Rgba,
    pub size_pixels: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelLayerProps {
    pub labels: Vec<Label>,
    pub texts: Vec<String>,
    pub sizes: Vec<f32>,
    pub collision_priorities: Vec<f32>,
    pub font_weights: Vec<u16>,
    /// False when the font did not load in time and a fallback is in use.
    pub font_ready: bool,
    pub style: LabelStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryLayerProps {
    pub boundaries: Vec<Boundary>,
    pub line_widths: Vec<f32>,
    pub line_width_scale: f32,
    pub style: BoundaryStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerProps {
    Points(PointLayerProps),
    Edges(EdgeLayerProps),
    Chevrons(ChevronLayerProps),
    Labels(LabelLayerProps),
    Boundaries(BoundaryLayerProps),
}

impl LayerProps {
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerProps::Points(_) => LayerKind::Points,
            LayerProps::Edges(_) => LayerKind::Edges,
            LayerProps::Chevrons(_) => LayerKind::Chevrons,
            LayerProps::Labels(_) => LayerKind::Labels,
            LayerProps::Boundaries(_) => LayerKind::Boundaries,
        }
    }
}

/// Immutable layer configuration handed to the renderer.
///
/// `version` changes exactly when the highlight-dependent attributes do, so the
/// renderer's own change detection fires once per pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub id: String,
    pub version: u64,
    pub props: LayerProps,
}

impl LayerDescriptor {
    pub fn new(props: LayerProps) -> Self {
        Self {
            id: props.kind().id().to_string(),
            version: 0,
            props,
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.props.kind()
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn points(points: &[DataPoint], style: PointStyle) -> Self {
        let radii = style
            .variable_size()
            .then(|| points.iter().map(|p| p.size.unwrap_or(0.0)).collect());
        Self::new(LayerProps::Points(PointLayerProps {
            positions: points.iter().map(|p| [p.position.x, p.position.y]).collect(),
            colors: points.iter().map(|p| p.color.to_array()).collect(),
            radii,
            radius_min_pixels: style.radius_min_pixels,
            filter: FilterProps {
                values: vec![1.0; points.len()],
                range: FILTER_RANGE,
                soft_range: FILTER_SOFT_RANGE,
            },
            style,
        }))
    }

    /// Edge layer. Endpoints outside `positions` are drawn at the origin.
    pub fn edges(edges: &[Edge], positions: &[Point], style: EdgeStyle) -> Self {
        let at = |i: usize| {
            positions
                .get(i)
                .map(|p| [p.x, p.y])
                .unwrap_or([0.0, 0.0])
        };
        Self::new(LayerProps::Edges(EdgeLayerProps {
            source_positions: edges.iter().map(|e| at(e.source)).collect(),
            target_positions: edges.iter().map(|e| at(e.target)).collect(),
            widths: edges
                .iter()
                .map(|e| if e.width > 0.0 { e.width } else { style.width_min_pixels })
                .collect(),
            colors: vec![style.color.to_array(); edges.len()],
            style,
        }))
    }

    pub fn chevrons(markers: Vec<ChevronMarker>, style: &EdgeStyle) -> Self {
        let texts = markers.iter().map(|m| m.symbol.to_string()).collect();
        Self::new(LayerProps::Chevrons(ChevronLayerProps {
            markers,
            texts,
            color: style.chevron_color,
            size_pixels: style.chevron_size_pixels,
        }))
    }

    pub fn labels(labels: &[Label], style: LabelStyle, font_ready: bool) -> Self {
        Self::new(LayerProps::Labels(LabelLayerProps {
            texts: labels.iter().map(|l| l.text.clone()).collect(),
            sizes: labels.iter().map(|l| l.size).collect(),
            collision_priorities: labels.iter().map(|l| l.size).collect(),
            font_weights: vec![style.font_weight; labels.len()],
            labels: labels.to_vec(),
            font_ready,
            style,
        }))
    }

    pub fn boundaries(boundaries: &[Boundary], style: BoundaryStyle) -> Self {
        Self::new(LayerProps::Boundaries(BoundaryLayerProps {
            line_widths: boundaries.iter().map(|b| b.size * b.size).collect(),
            line_width_scale: style.cluster_boundary_line_width * 5e-5,
            boundaries: boundaries.to_vec(),
            style,
        }))
    }

    /// Number of drawn instances in this layer.
    pub fn instance_count(&self) -> usize {
        match &self.props {
            LayerProps::Points(p) => p.positions.len(),
            LayerProps::Edges(e) => e.widths.len(),
            LayerProps::Chevrons(c) => c.markers.len(),
            LayerProps::Labels(l) => l.labels.len(),
            LayerProps::Boundaries(b) => b.boundaries.len(),
        }
    }
}

/// Complete frame data sent to the frontend canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderFrame {
    pub layers: Vec<LayerDescriptor>,
    pub view_state: ViewState,
}

impl RenderFrame {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
