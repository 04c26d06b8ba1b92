//! Custom view handlers.
//!
//! A [`HandlerSpec`] maps view resource ids to ordered lists of
//! [`ViewHandler`]s that run after every field binding of a row has been
//! applied. Registering a handler under the adapter's own layout id targets
//! the row view itself.
//!
//! Removing a handler leaves an empty slot behind so the keys of the other
//! handlers stay valid; empty slots are skipped during dispatch.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use instant_adapter_core::{ViewId, ViewTree};

use crate::adapter::ListAdapter;
use crate::error::BindResult;

/// Everything known about the row being bound.
#[derive(Debug)]
pub struct BindContext<'a, T> {
    /// The container the row is displayed in.
    pub parent: ViewId,
    /// The row view.
    pub row: ViewId,
    /// The data instance bound to the row.
    pub item: &'a T,
    /// The row's position in the adapter.
    pub position: usize,
}

impl<T> Clone for BindContext<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BindContext<'_, T> {}

/// Custom logic run against one view of a row during binding.
pub trait ViewHandler<T>: Send + Sync {
    /// Handle `view` for the row described by `ctx`.
    fn handle_view(
        &self,
        adapter: &dyn ListAdapter,
        tree: &mut ViewTree,
        view: ViewId,
        ctx: &BindContext<'_, T>,
    ) -> BindResult;
}

impl<T, F> ViewHandler<T> for F
where
    F: Fn(&dyn ListAdapter, &mut ViewTree, ViewId, &BindContext<'_, T>) -> BindResult + Send + Sync,
{
    fn handle_view(
        &self,
        adapter: &dyn ListAdapter,
        tree: &mut ViewTree,
        view: ViewId,
        ctx: &BindContext<'_, T>,
    ) -> BindResult {
        self(adapter, tree, view, ctx)
    }
}

/// Shared, type-erased view handler.
pub type SharedViewHandler<T> = Arc<dyn ViewHandler<T>>;

/// Identifies one registered handler so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerKey {
    view_id: i32,
    slot: usize,
}

impl HandlerKey {
    /// The view id the handler is registered under.
    pub fn view_id(&self) -> i32 {
        self.view_id
    }
}

/// View resource id → handler slots in registration order.
///
/// Ids are visited in ascending order.
pub struct HandlerSpec<T> {
    handlers: BTreeMap<i32, Vec<Option<SharedViewHandler<T>>>>,
}

impl<T: 'static> HandlerSpec<T> {
    /// Create an empty spec.
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Register a closure for `view_id`, builder style.
    pub fn on<F>(mut self, view_id: i32, handler: F) -> Self
    where
        F: Fn(&dyn ListAdapter, &mut ViewTree, ViewId, &BindContext<'_, T>) -> BindResult
            + Send
            + Sync
            + 'static,
    {
        self.add(view_id, handler);
        self
    }

    /// Register a closure for `view_id`.
    pub fn add<F>(&mut self, view_id: i32, handler: F) -> HandlerKey
    where
        F: Fn(&dyn ListAdapter, &mut ViewTree, ViewId, &BindContext<'_, T>) -> BindResult
            + Send
            + Sync
            + 'static,
    {
        self.add_handler(view_id, Arc::new(handler))
    }

    /// Register a shared handler for `view_id`.
    pub fn add_handler(&mut self, view_id: i32, handler: SharedViewHandler<T>) -> HandlerKey {
        let slots = self.handlers.entry(view_id).or_default();
        slots.push(Some(handler));
        HandlerKey {
            view_id,
            slot: slots.len() - 1,
        }
    }
}

impl<T> HandlerSpec<T> {
    /// Remove a handler, leaving its slot empty.
    ///
    /// Returns `false` if the key was unknown or already removed.
    pub fn remove(&mut self, key: HandlerKey) -> bool {
        self.handlers
            .get_mut(&key.view_id)
            .and_then(|slots| slots.get_mut(key.slot))
            .and_then(Option::take)
            .is_some()
    }

    /// Number of live handlers.
    pub fn len(&self) -> usize {
        self.handlers.values().flatten().filter(|slot| slot.is_some()).count()
    }

    /// Returns `true` if there are no live handlers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots, empty ones included.
    pub fn slot_count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    /// View ids with at least one slot, ascending.
    pub fn view_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.handlers.keys().copied()
    }

    /// Iterate over `(view_id, slots)`, ascending by id.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &[Option<SharedViewHandler<T>>])> + '_ {
        self.handlers.iter().map(|(&id, slots)| (id, slots.as_slice()))
    }
}

impl<T: 'static> Default for HandlerSpec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for HandlerSpec<T> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<T> fmt::Debug for HandlerSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSpec")
            .field("view_ids", &self.handlers.keys().collect::<Vec<_>>())
            .field("live", &self.len())
            .field("slots", &self.slot_count())
            .finish()
    }
}
