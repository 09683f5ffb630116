//! # DataMap I/O
//!
//! Readers for the JSON payloads that feed a data map: columnar point and
//! edge arrays, label and cluster-boundary records, and metadata columns.

pub mod columns;

pub use columns::{
    boundaries_from_json, labels_from_json, metadata_from_json, BoundaryRecord, EdgeColumns,
    LabelRecord, LoadError, PointColumns,
};
