use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rgba};

/// Index of a point in `[0, N)`.
pub type PointIndex = usize;

/// Index of an edge in `[0, M)`.
pub type EdgeIndex = usize;

/// A single map point. Immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub position: Point,
    pub color: Rgba,
    /// Per-point radius, used only when the point layer runs in variable-size mode.
    pub size: Option<f32>,
}

impl DataPoint {
    pub fn new(x: f64, y: f64, color: Rgba) -> Self {
        Self {
            position: Point::new(x, y),
            color,
            size: None,
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }
}

/// A directed edge `source -> target` between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: PointIndex,
    pub target: PointIndex,
    pub width: f32,
}

impl Edge {
    pub fn new(source: PointIndex, target: PointIndex, width: f32) -> Self {
        Self {
            source,
            target,
            width,
        }
    }
}

/// Text label anchored at a point. Label `i` belongs to point `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub position: Point,
    pub text: String,
    pub size: f32,
    pub color: Rgba,
}

impl Label {
    pub fn new(x: f64, y: f64, text: &str, size: f32) -> Self {
        Self {
            position: Point::new(x, y),
            text: text.to_string(),
            size,
            color: Rgba::new(0, 0, 0, 255),
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }
}

/// A cluster outline drawn as a closed polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub polygon: Vec<Point>,
    pub color: Rgba,
    pub size: f32,
}

/// Per-point metadata columns (hover text, searchable fields, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaData {
    columns: BTreeMap<String, Vec<String>>,
}

impl MetaData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: &str, values: Vec<String>) -> Self {
        self.insert_column(name, values);
        self
    }

    pub fn insert_column(&mut self, name: &str, values: Vec<String>) {
        self.columns.insert(name.to_string(), values);
    }

    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Value of `name` at row `index`, if both exist.
    pub fn value(&self, name: &str, index: PointIndex) -> Option<&str> {
        self.columns
            .get(name)
            .and_then(|c| c.get(index))
            .map(String::as_str)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}
