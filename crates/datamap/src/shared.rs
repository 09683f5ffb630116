use std::sync::Mutex;

use datamap_core::{IndexSet, Point, PointIndex};
use datamap_render::Renderer;

use crate::error::DataMapError;
use crate::map::DataMap;

/// A [`DataMap`] shared between widgets on different threads.
///
/// Each call holds the lock for one whole highlight pass, so passes never
/// interleave and every pass sees the latest selection of every source.
pub struct SharedDataMap<R: Renderer + Send> {
    inner: Mutex<DataMap<R>>,
}

impl<R: Renderer + Send> SharedDataMap<R> {
    pub fn new(map: DataMap<R>) -> Self {
        Self {
            inner: Mutex::new(map),
        }
    }

    /// Run `f` with exclusive access to the map.
    pub fn with<T>(&self, f: impl FnOnce(&mut DataMap<R>) -> T) -> Result<T, DataMapError> {
        let mut map = self.inner.lock().map_err(|_| DataMapError::LockPoisoned)?;
        Ok(f(&mut map))
    }

    pub fn add_selection(
        &self,
        indices: Vec<PointIndex>,
        source_id: &str,
    ) -> Result<(), DataMapError> {
        self.with(|map| map.add_selection(indices, source_id))
    }

    pub fn remove_selection(&self, source_id: &str) -> Result<(), DataMapError> {
        self.with(|map| map.remove_selection(source_id))
    }

    pub fn search(&self, term: &str) -> Result<(), DataMapError> {
        self.with(|map| map.search(term))
    }

    pub fn lasso_select(&self, polygon: &[Point]) -> Result<(), DataMapError> {
        self.with(|map| map.lasso_select(polygon))
    }

    pub fn selected_indices(&self) -> Result<IndexSet, DataMapError> {
        self.with(|map| map.selected_indices())
    }

    pub fn into_inner(self) -> Result<DataMap<R>, DataMapError> {
        self.inner.into_inner().map_err(|_| DataMapError::LockPoisoned)
    }
}
