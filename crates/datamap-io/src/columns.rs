//! Columnar payloads as produced by the data-preparation side.
//!
//! Points and edges arrive as one array per attribute; labels and boundaries
//! as arrays of records. Metadata is a map of named columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use datamap_core::data::{Boundary, DataPoint, Edge, Label, MetaData};
use datamap_core::geometry::{Point, Rgba};

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Column '{column}' has {found} entries, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        found: usize,
    },
}

fn check_len(column: &'static str, expected: usize, found: usize) -> Result<(), LoadError> {
    if expected != found {
        return Err(LoadError::LengthMismatch {
            column,
            expected,
            found,
        });
    }
    Ok(())
}

// ── Points ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointColumns {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub r: Vec<u8>,
    pub g: Vec<u8>,
    pub b: Vec<u8>,
    pub a: Vec<u8>,
    #[serde(default)]
    pub size: Option<Vec<f32>>,
}

impl PointColumns {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn into_points(self) -> Result<Vec<DataPoint>, LoadError> {
        let n = self.x.len();
        check_len("y", n, self.y.len())?;
        check_len("r", n, self.r.len())?;
        check_len("g", n, self.g.len())?;
        check_len("b", n, self.b.len())?;
        check_len("a", n, self.a.len())?;
        if let Some(size) = &self.size {
            check_len("size", n, size.len())?;
        }

        let points = (0..n)
            .map(|i| DataPoint {
                position: Point::new(self.x[i], self.y[i]),
                color: Rgba::new(self.r[i], self.g[i], self.b[i], self.a[i]),
                size: self.size.as_ref().map(|s| s[i]),
            })
            .collect();
        Ok(points)
    }
}

// ── Edges ─────────────────────────────────────────────────────────────

/// Edge columns. Index entries may be `null`, negative, fractional or not a
/// number at all; such edges are skipped with a diagnostic rather than
/// failing the load. Whole floats such as `1.0` are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeColumns {
    pub source_index: Vec<serde_json::Value>,
    pub target_index: Vec<serde_json::Value>,
    #[serde(default)]
    pub width: Vec<Option<f32>>,
}

impl EdgeColumns {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert to edges. Missing widths become 0, which the edge layer
    /// replaces with its minimum pixel width.
    pub fn into_edges(self) -> Result<Vec<Edge>, LoadError> {
        let n = self.source_index.len();
        check_len("target_index", n, self.target_index.len())?;

        let mut edges = Vec::with_capacity(n);
        for i in 0..n {
            let source = point_index(&self.source_index[i]);
            let target = point_index(&self.target_index[i]);
            let (Some(source), Some(target)) = (source, target) else {
                log::error!(
                    "Edge at index {} has invalid indices: source_index={}, target_index={}",
                    i,
                    self.source_index[i],
                    self.target_index[i]
                );
                continue;
            };
            let width = self.width.get(i).copied().flatten().unwrap_or(0.0);
            edges.push(Edge::new(source, target, width));
        }

        if edges.len() < n {
            log::warn!("Loaded {} of {} edges", edges.len(), n);
        }
        Ok(edges)
    }
}

/// A non-negative whole number, whether encoded as an integer or a float.
fn point_index(value: &serde_json::Value) -> Option<usize> {
    if let Some(i) = value.as_u64() {
        return usize::try_from(i).ok();
    }
    let f = value.as_f64()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64 {
        Some(f as usize)
    } else {
        None
    }
}

// ── Labels ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelRecord {
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub size: f32,
    #[serde(default)]
    pub r: u8,
    #[serde(default)]
    pub g: u8,
    #[serde(default)]
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl From<LabelRecord> for Label {
    fn from(rec: LabelRecord) -> Self {
        Label {
            position: Point::new(rec.x, rec.y),
            text: rec.label,
            size: rec.size,
            color: Rgba::new(rec.r, rec.g, rec.b, rec.a),
        }
    }
}

pub fn labels_from_json(json: &str) -> Result<Vec<Label>, LoadError> {
    let records: Vec<LabelRecord> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(Label::from).collect())
}

// ── Boundaries ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryRecord {
    pub polygon: Vec<[f64; 2]>,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
    pub size: f32,
}

impl From<BoundaryRecord> for Boundary {
    fn from(rec: BoundaryRecord) -> Self {
        Boundary {
            polygon: rec.polygon.iter().map(|p| Point::new(p[0], p[1])).collect(),
            color: Rgba::new(rec.r, rec.g, rec.b, rec.a),
            size: rec.size,
        }
    }
}

pub fn boundaries_from_json(json: &str) -> Result<Vec<Boundary>, LoadError> {
    let records: Vec<BoundaryRecord> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(Boundary::from).collect())
}

// ── Metadata ──────────────────────────────────────────────────────────

/// Metadata columns of arbitrary JSON scalars; values are stringified.
pub fn metadata_from_json(json: &str) -> Result<MetaData, LoadError> {
    let columns: BTreeMap<String, Vec<serde_json::Value>> = serde_json::from_str(json)?;
    let mut meta = MetaData::new();
    for (name, values) in columns {
        let values = values
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect();
        meta.insert_column(&name, values);
    }
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_from_json() {
        let json = r#"{"x":[0.0,1.5],"y":[2.0,3.0],"r":[1,2],"g":[3,4],"b":[5,6],"a":[255,128]}"#;
        let points = PointColumns::from_json(json).unwrap().into_points().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].position, Point::new(1.5, 3.0));
        assert_eq!(points[1].color, Rgba::new(2, 4, 6, 128));
        assert!(points[0].size.is_none());
    }

    #[test]
    fn test_points_length_mismatch() {
        let json = r#"{"x":[0.0,1.5],"y":[2.0],"r":[1,2],"g":[3,4],"b":[5,6],"a":[255,128]}"#;
        let err = PointColumns::from_json(json)
            .unwrap()
            .into_points()
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::LengthMismatch {
                column: "y",
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_edges_skip_undefined() {
        let _ = env_logger::builder().is_test(true).try_init();
        let json =
            r#"{"source_index":[0,null,2,-1],"target_index":[1,2,null,0],"width":[2.0,null]}"#;
        let edges = EdgeColumns::from_json(json).unwrap().into_edges().unwrap();
        assert_eq!(edges, vec![Edge::new(0, 1, 2.0)]);
    }

    #[test]
    fn test_edges_accept_whole_floats() {
        let _ = env_logger::builder().is_test(true).try_init();
        let json = r#"{"source_index":[0.0,1.5,"2",3],"target_index":[1.0,0,1,2.0],"width":[1.0]}"#;
        let edges = EdgeColumns::from_json(json).unwrap().into_edges().unwrap();
        assert_eq!(edges, vec![Edge::new(0, 1, 1.0), Edge::new(3, 2, 0.0)]);
    }

    #[test]
    fn test_labels_and_boundaries() {
        let labels = labels_from_json(r#"[{"x":1.0,"y":2.0,"label":"Cats","size":12.0,"r":10}]"#)
            .unwrap();
        assert_eq!(labels[0].text, "Cats");
        assert_eq!(labels[0].color, Rgba::new(10, 0, 0, 255));

        let boundaries = boundaries_from_json(
            r#"[{"polygon":[[0,0],[1,0],[1,1]],"r":1,"g":2,"b":3,"a":4,"size":2.0}]"#,
        )
        .unwrap();
        assert_eq!(boundaries[0].polygon.len(), 3);
    }

    #[test]
    fn test_metadata_stringified() {
        let meta = metadata_from_json(r#"{"hover_text":["a","b"],"year":[1999,null]}"#).unwrap();
        assert_eq!(meta.value("hover_text", 0), Some("a"));
        assert_eq!(meta.value("year", 0), Some("1999"));
        assert_eq!(meta.value("year", 1), Some(""));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            PointColumns::from_json("{not json"),
            Err(LoadError::Json(_))
        ));
    }
}
