use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::data::PointIndex;

/// A deduplicated, ordered set of point indices.
pub type IndexSet = BTreeSet<PointIndex>;

/// Which slot a source identifier addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSource<'a> {
    /// The single exclusive lasso slot.
    Lasso,
    /// Any other named source (search, programmatic, widgets).
    Named(&'a str),
}

/// Holds one index set per selection source plus the exclusive lasso slot.
///
/// A source that is absent has no opinion; a source holding an empty set
/// selected nothing. The two are not interchangeable when merging.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    lasso_source_id: String,
    lasso: Option<IndexSet>,
    named: BTreeMap<String, IndexSet>,
    point_count: usize,
}

impl SelectionStore {
    pub fn new(lasso_source_id: &str, point_count: usize) -> Self {
        Self {
            lasso_source_id: lasso_source_id.to_string(),
            lasso: None,
            named: BTreeMap::new(),
            point_count,
        }
    }

    pub fn classify<'a>(&self, source_id: &'a str) -> SelectionSource<'a> {
        if source_id == self.lasso_source_id {
            SelectionSource::Lasso
        } else {
            SelectionSource::Named(source_id)
        }
    }

    /// Update the number of loaded points; stored indices beyond it are dropped.
    pub fn set_point_count(&mut self, point_count: usize) {
        self.point_count = point_count;
        let in_range = |set: &mut IndexSet| set.retain(|&i| i < point_count);
        if let Some(lasso) = self.lasso.as_mut() {
            in_range(lasso);
        }
        self.named.values_mut().for_each(in_range);
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Replace the set held by `source_id`. Out-of-range indices are ignored.
    pub fn set_selection<I>(&mut self, source_id: &str, indices: I)
    where
        I: IntoIterator<Item = PointIndex>,
    {
        let point_count = self.point_count;
        let set: IndexSet = indices.into_iter().filter(|&i| i < point_count).collect();
        match self.classify(source_id) {
            SelectionSource::Lasso => self.lasso = Some(set),
            SelectionSource::Named(id) => {
                self.named.insert(id.to_string(), set);
            }
        }
    }

    /// Remove `source_id` entirely. Returns whether it was present.
    pub fn clear_selection(&mut self, source_id: &str) -> bool {
        match self.classify(source_id) {
            SelectionSource::Lasso => self.lasso.take().is_some(),
            SelectionSource::Named(id) => self.named.remove(id).is_some(),
        }
    }

    pub fn get(&self, source_id: &str) -> Option<&IndexSet> {
        match self.classify(source_id) {
            SelectionSource::Lasso => self.lasso.as_ref(),
            SelectionSource::Named(id) => self.named.get(id),
        }
    }

    pub fn has_lasso(&self) -> bool {
        self.lasso.is_some()
    }

    pub fn source_count(&self) -> usize {
        self.named.len() + usize::from(self.lasso.is_some())
    }

    /// Union of every non-lasso set.
    pub fn basic_union(&self) -> IndexSet {
        self.named.values().flatten().copied().collect()
    }

    /// Primary selection: the non-lasso union, narrowed to the lasso when
    /// both are present, or the lasso alone when nothing else is.
    pub fn merged_indices(&self) -> IndexSet {
        self.merged().selected
    }

    /// Recompute the merged state from every active source.
    pub fn merged(&self) -> MergedSelection {
        let basic = self.basic_union();
        match &self.lasso {
            None => MergedSelection {
                selected: basic,
                semi_selected: IndexSet::new(),
                has_lasso: false,
            },
            Some(lasso) => {
                let selected = if self.named.is_empty() {
                    lasso.clone()
                } else {
                    lasso.intersection(&basic).copied().collect()
                };
                MergedSelection {
                    selected,
                    semi_selected: basic,
                    has_lasso: true,
                }
            }
        }
    }
}

/// How the highlight pass should treat the merged state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Nothing constrains the view: every point is active.
    Unconstrained,
    /// Plain selection, no lasso: unselected points are dim.
    Plain,
    /// Lasso with a secondary tier: background dim, secondary hidden.
    LassoTiered,
    /// Lasso alone: background hidden.
    LassoOnly,
}

/// Merged view of every selection source. Derived, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedSelection {
    pub selected: IndexSet,
    pub semi_selected: IndexSet,
    pub has_lasso: bool,
}

impl MergedSelection {
    pub fn mode(&self) -> MergeMode {
        match (self.selected.is_empty(), self.has_lasso) {
            (true, _) => MergeMode::Unconstrained,
            (false, false) => MergeMode::Plain,
            (false, true) if self.semi_selected.is_empty() => MergeMode::LassoOnly,
            (false, true) => MergeMode::LassoTiered,
        }
    }

    pub fn is_primary(&self, index: PointIndex) -> bool {
        self.selected.contains(&index)
    }

    pub fn has_primary(&self) -> bool {
        !self.selected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LASSO: &str = "lasso-selection";

    fn set(items: &[usize]) -> IndexSet {
        items.iter().copied().collect()
    }

    #[test]
    fn test_empty_store_is_unconstrained() {
        let store = SelectionStore::new(LASSO, 5);
        let merged = store.merged();
        assert!(merged.selected.is_empty());
        assert_eq!(merged.mode(), MergeMode::Unconstrained);
    }

    #[test]
    fn test_named_sets_union() {
        let mut store = SelectionStore::new(LASSO, 10);
        store.set_selection("text-search", vec![1, 2, 2]);
        store.set_selection("widget", vec![2, 5]);
        let merged = store.merged();
        assert_eq!(merged.selected, set(&[1, 2, 5]));
        assert!(!merged.has_lasso);
        assert_eq!(merged.mode(), MergeMode::Plain);
    }

    #[test]
    fn test_set_selection_replaces() {
        let mut store = SelectionStore::new(LASSO, 10);
        store.set_selection("a", vec![1]);
        store.set_selection("a", vec![3]);
        assert_eq!(store.merged_indices(), set(&[3]));
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut store = SelectionStore::new(LASSO, 3);
        store.set_selection("a", vec![0, 3, 100]);
        assert_eq!(store.get("a"), Some(&set(&[0])));
    }

    #[test]
    fn test_lasso_alone() {
        let mut store = SelectionStore::new(LASSO, 4);
        store.set_selection(LASSO, vec![0, 1]);
        let merged = store.merged();
        assert_eq!(merged.selected, set(&[0, 1]));
        assert!(merged.semi_selected.is_empty());
        assert_eq!(merged.mode(), MergeMode::LassoOnly);
    }

    #[test]
    fn test_lasso_supersedes_prior_lasso() {
        let mut store = SelectionStore::new(LASSO, 4);
        store.set_selection(LASSO, vec![0, 1]);
        store.set_selection(LASSO, vec![3]);
        assert_eq!(store.merged_indices(), set(&[3]));
        assert_eq!(store.source_count(), 1);
    }

    #[test]
    fn test_lasso_with_named_sets() {
        let mut store = SelectionStore::new(LASSO, 10);
        store.set_selection(LASSO, vec![0, 1, 2]);
        store.set_selection("text-search", vec![2, 7]);
        let merged = store.merged();
        assert_eq!(merged.selected, set(&[2]));
        assert_eq!(merged.semi_selected, set(&[2, 7]));
        assert_eq!(merged.mode(), MergeMode::LassoTiered);
    }

    #[test]
    fn test_lasso_with_empty_named_set() {
        let mut store = SelectionStore::new(LASSO, 10);
        store.set_selection(LASSO, vec![0, 1]);
        store.set_selection("text-search", Vec::new());
        assert_eq!(store.merged().mode(), MergeMode::Unconstrained);
    }

    #[test]
    fn test_clear_is_distinct_from_empty() {
        let mut store = SelectionStore::new(LASSO, 10);
        store.set_selection("a", Vec::new());
        assert!(store.get("a").is_some());
        assert!(store.clear_selection("a"));
        assert!(store.get("a").is_none());
        assert!(!store.clear_selection("a"));
    }

    #[test]
    fn test_point_count_shrink_drops_indices() {
        let mut store = SelectionStore::new(LASSO, 10);
        store.set_selection("a", vec![1, 8]);
        store.set_selection(LASSO, vec![9]);
        store.set_point_count(5);
        assert_eq!(store.get("a"), Some(&set(&[1])));
        assert_eq!(store.get(LASSO), Some(&IndexSet::new()));
    }
}
