//! Per-row view lookup cache.
//!
//! Every row view created by an [`InstantAdapterCore`](crate::InstantAdapterCore)
//! carries a [`ViewRecycleCache`] as a tag keyed by the row's layout id. The
//! cache maps a view resource id to the [`Holder`] resolved the first time
//! that id was looked up under the row, so rebinding a recycled row never
//! searches its subtree again.

use std::collections::HashMap;

use instant_adapter_core::{ViewId, ViewTree};

use crate::config::MissPolicy;
use crate::error::{AdapterError, AdapterResult};

/// A resolved child view and an optional auxiliary value cached with it.
///
/// Holders never change once stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holder {
    view: Option<ViewId>,
    aux: Option<usize>,
}

impl Holder {
    /// Create a holder.
    pub fn new(view: Option<ViewId>, aux: Option<usize>) -> Self {
        Self { view, aux }
    }

    /// The resolved view, or `None` if the id is not present under the row.
    pub fn view(&self) -> Option<ViewId> {
        self.view
    }

    /// The auxiliary value, such as a cursor column index.
    pub fn aux(&self) -> Option<usize> {
        self.aux
    }
}

/// Lookup cache attached to one row view.
#[derive(Debug, Clone, Default)]
pub struct ViewRecycleCache {
    holders: HashMap<i32, Holder>,
    policy: MissPolicy,
}

impl ViewRecycleCache {
    /// Create an empty cache.
    pub fn new(policy: MissPolicy) -> Self {
        Self {
            holders: HashMap::new(),
            policy,
        }
    }

    /// Get the holder stored for a view id.
    pub fn get(&self, view_id: i32) -> Option<&Holder> {
        self.holders.get(&view_id)
    }

    /// Check whether a view id has been resolved.
    pub fn contains(&self, view_id: i32) -> bool {
        self.holders.contains_key(&view_id)
    }

    /// Number of stored holders.
    pub fn len(&self) -> usize {
        self.holders.len()
    }

    /// Returns `true` if nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }

    /// The miss policy this cache was created with.
    pub fn policy(&self) -> MissPolicy {
        self.policy
    }

    /// Resolve `view_id` under `row`, using the cache stored on `row` under `key`.
    ///
    /// Returns the cached holder if there is one. Otherwise searches the row's
    /// subtree, stores the result (subject to the cache's [`MissPolicy`]) and
    /// returns it. A missing view is not an error: the holder's view is `None`.
    pub fn resolve(tree: &mut ViewTree, row: ViewId, key: i32, view_id: i32) -> AdapterResult<Holder> {
        Self::resolve_with(tree, row, key, view_id, || None)
    }

    /// Like [`resolve`](Self::resolve), computing the auxiliary value with `aux`
    /// when a new holder is created.
    pub fn resolve_with(
        tree: &mut ViewTree,
        row: ViewId,
        key: i32,
        view_id: i32,
        aux: impl FnOnce() -> Option<usize>,
    ) -> AdapterResult<Holder> {
        let cache = tree
            .tag::<ViewRecycleCache>(row, key)?
            .ok_or(AdapterError::MissingCache { row, layout_id: key })?;
        if let Some(holder) = cache.get(view_id) {
            tracing::trace!(target: "instant_adapter::cache", ?row, view_id, "cache hit");
            return Ok(*holder);
        }
        let policy = cache.policy;

        let found = tree.find_view_by_id(row, view_id)?;
        let holder = Holder::new(found, aux());
        tracing::trace!(target: "instant_adapter::cache", ?row, view_id, found = found.is_some(), "cache miss");

        if found.is_some() || policy == MissPolicy::Remember {
            tree.tag_mut::<ViewRecycleCache>(row, key)?
                .ok_or(AdapterError::MissingCache { row, layout_id: key })?
                .holders
                .insert(view_id, holder);
        }
        Ok(holder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instant_adapter_core::NO_ID;

    const LAYOUT: i32 = 0x7f03_0001;
    const TITLE: i32 = 0x7f05_0001;
    const MISSING: i32 = 0x7f05_00ff;

    fn row_with_cache(tree: &mut ViewTree, policy: MissPolicy) -> (ViewId, ViewId) {
        let row = tree.create_view("LinearLayout", NO_ID);
        let title = tree.create_view("TextView", TITLE);
        tree.add_child(row, title).unwrap();
        tree.set_tag(row, LAYOUT, ViewRecycleCache::new(policy)).unwrap();
        (row, title)
    }

    #[test]
    fn test_resolve_caches_hit() {
        let mut tree = ViewTree::new();
        let (row, title) = row_with_cache(&mut tree, MissPolicy::Remember);

        let first = ViewRecycleCache::resolve(&mut tree, row, LAYOUT, TITLE).unwrap();
        assert_eq!(first.view(), Some(title));
        assert_eq!(tree.lookup_count(), 1);

        let second = ViewRecycleCache::resolve(&mut tree, row, LAYOUT, TITLE).unwrap();
        assert_eq!(second, first);
        assert_eq!(tree.lookup_count(), 1);

        let cache = tree.tag::<ViewRecycleCache>(row, LAYOUT).unwrap().unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(TITLE));
    }

    #[test]
    fn test_resolve_remembers_miss() {
        let mut tree = ViewTree::new();
        let (row, _title) = row_with_cache(&mut tree, MissPolicy::Remember);

        let holder = ViewRecycleCache::resolve(&mut tree, row, LAYOUT, MISSING).unwrap();
        assert_eq!(holder.view(), None);
        ViewRecycleCache::resolve(&mut tree, row, LAYOUT, MISSING).unwrap();
        assert_eq!(tree.lookup_count(), 1);
    }

    #[test]
    fn test_resolve_retries_miss() {
        let mut tree = ViewTree::new();
        let (row, _title) = row_with_cache(&mut tree, MissPolicy::Retry);

        assert_eq!(ViewRecycleCache::resolve(&mut tree, row, LAYOUT, MISSING).unwrap().view(), None);
        assert_eq!(ViewRecycleCache::resolve(&mut tree, row, LAYOUT, MISSING).unwrap().view(), None);
        assert_eq!(tree.lookup_count(), 2);

        // A view that shows up later is picked up and then cached.
        let late = tree.create_view("TextView", MISSING);
        tree.add_child(row, late).unwrap();
        assert_eq!(ViewRecycleCache::resolve(&mut tree, row, LAYOUT, MISSING).unwrap().view(), Some(late));
        ViewRecycleCache::resolve(&mut tree, row, LAYOUT, MISSING).unwrap();
        assert_eq!(tree.lookup_count(), 3);
    }

    #[test]
    fn test_resolve_with_aux_is_computed_once() {
        let mut tree = ViewTree::new();
        let (row, _title) = row_with_cache(&mut tree, MissPolicy::Remember);

        let holder = ViewRecycleCache::resolve_with(&mut tree, row, LAYOUT, TITLE, || Some(3)).unwrap();
        assert_eq!(holder.aux(), Some(3));

        let again = ViewRecycleCache::resolve_with(&mut tree, row, LAYOUT, TITLE, || {
            panic!("aux must not be recomputed for a cached holder")
        })
        .unwrap();
        assert_eq!(again.aux(), Some(3));
    }

    #[test]
    fn test_resolve_without_cache() {
        let mut tree = ViewTree::new();
        let row = tree.create_view("LinearLayout", NO_ID);
        let err = ViewRecycleCache::resolve(&mut tree, row, LAYOUT, TITLE).unwrap_err();
        assert!(matches!(err, AdapterError::MissingCache { layout_id: LAYOUT, .. }));
    }
}
