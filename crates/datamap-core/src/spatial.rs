use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::data::PointIndex;
use crate::geometry::{point_in_polygon, BBox, Point};
use crate::selection::IndexSet;

/// An entry in the R-tree, referencing a map point by its index.
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    pub point_index: PointIndex,
    pub position: Point,
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.position.x, self.position.y])
    }
}

impl PointDistance for SpatialEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        (self.position.x - point[0]).powi(2) + (self.position.y - point[1]).powi(2)
    }
}

/// Spatial index over point positions, used to resolve lasso regions.
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-load from point positions; non-finite positions are left out.
    pub fn build(positions: impl IntoIterator<Item = Point>) -> Self {
        let entries: Vec<SpatialEntry> = positions
            .into_iter()
            .enumerate()
            .filter(|(_, p)| p.is_finite())
            .map(|(point_index, position)| SpatialEntry {
                point_index,
                position,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Points whose position lies inside `bbox` (inclusive).
    pub fn query_bbox(&self, bbox: &BBox) -> Vec<&SpatialEntry> {
        let envelope = AABB::from_corners([bbox.min.x, bbox.min.y], [bbox.max.x, bbox.max.y]);
        self.tree.locate_in_envelope(&envelope).collect()
    }

    /// Indices of all points inside `polygon`, outline included.
    pub fn indices_in_polygon(&self, polygon: &[Point]) -> IndexSet {
        if polygon.len() < 3 {
            return IndexSet::new();
        }
        let Some(bbox) = BBox::from_points(polygon) else {
            return IndexSet::new();
        };
        self.query_bbox(&bbox)
            .into_iter()
            .filter(|e| point_in_polygon(&e.position, polygon))
            .map(|e| e.point_index)
            .collect()
    }

    /// Closest point to `position`, if any.
    pub fn nearest(&self, position: &Point) -> Option<PointIndex> {
        self.tree
            .nearest_neighbor(&[position.x, position.y])
            .map(|e| e.point_index)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> SpatialIndex {
        SpatialIndex::build(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(10.0, 10.0),
            Point::new(2.0, 8.0),
            Point::new(f64::NAN, 1.0),
        ])
    }

    #[test]
    fn test_polygon_query() {
        let index = grid();
        assert_eq!(index.len(), 4);

        let triangle = vec![
            Point::new(-1.0, -1.0),
            Point::new(11.0, -1.0),
            Point::new(11.0, 11.0),
        ];
        let hits = index.indices_in_polygon(&triangle);
        assert_eq!(hits.into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_degenerate_polygon() {
        let index = grid();
        assert!(index
            .indices_in_polygon(&[Point::new(0.0, 0.0), Point::new(10.0, 10.0)])
            .is_empty());
    }

    #[test]
    fn test_nearest() {
        let index = grid();
        assert_eq!(index.nearest(&Point::new(2.5, 7.0)), Some(3));
        assert_eq!(SpatialIndex::new().nearest(&Point::new(0.0, 0.0)), None);
    }
}
