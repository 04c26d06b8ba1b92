//! Row creation and bind dispatch.
//!
//! [`InstantAdapterCore`] does the work behind every adapter shim: it inflates
//! row views, attaches a [`ViewRecycleCache`] to each of them, and binds data
//! instances to recycled rows by running the field bindings and then the view
//! handlers.
//!
//! The shims own a core and delegate to it instead of sharing a base type, so
//! the same core serves array-backed and cursor-backed adapters alike.
//!
//! # Bind order
//!
//! For one `bind_row` call:
//! 1. every field binding runs once, in ascending view id order;
//! 2. every live handler runs once, in ascending view id order and in
//!    registration order within one id.
//!
//! A view id that does not resolve under the row is skipped. The first failure
//! returned by a binding or handler aborts the bind and is returned as is.

use std::fmt;
use std::sync::Arc;

use instant_adapter_core::{LayoutInflater, NO_ID, ThreadAffinity, ViewId, ViewTree};

use crate::adapter::ListAdapter;
use crate::binding::BindingSpec;
use crate::cache::{Holder, ViewRecycleCache};
use crate::config::AdapterConfig;
use crate::error::{AdapterError, AdapterResult};
use crate::handler::{BindContext, HandlerSpec};

/// Creates row views for one layout and binds data instances of type `T` to them.
pub struct InstantAdapterCore<T> {
    layout_id: i32,
    inflater: Arc<dyn LayoutInflater>,
    bindings: BindingSpec<T>,
    handlers: HandlerSpec<T>,
    config: AdapterConfig,
    affinity: ThreadAffinity,
}

impl<T: 'static> InstantAdapterCore<T> {
    /// Create a core with the default [`AdapterConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if `layout_id` is `0`, [`NO_ID`],
    /// or unknown to `inflater`.
    pub fn new(
        inflater: Arc<dyn LayoutInflater>,
        layout_id: i32,
        bindings: BindingSpec<T>,
        handlers: HandlerSpec<T>,
    ) -> AdapterResult<Self> {
        Self::with_config(inflater, layout_id, bindings, handlers, AdapterConfig::default())
    }

    /// Create a core with an explicit configuration.
    pub fn with_config(
        inflater: Arc<dyn LayoutInflater>,
        layout_id: i32,
        bindings: BindingSpec<T>,
        handlers: HandlerSpec<T>,
        config: AdapterConfig,
    ) -> AdapterResult<Self> {
        if layout_id == NO_ID || layout_id == 0 {
            return Err(AdapterError::configuration(format!(
                "invalid layout resource id {layout_id}, please check again"
            )));
        }
        if !inflater.has_layout(layout_id) {
            return Err(AdapterError::configuration(format!(
                "no layout resource registered for id {layout_id:#x}"
            )));
        }

        tracing::debug!(
            target: "instant_adapter::dispatch",
            layout_id,
            bindings = bindings.len(),
            handlers = handlers.len(),
            "created adapter core"
        );
        Ok(Self {
            layout_id,
            inflater,
            bindings,
            handlers,
            config,
            affinity: ThreadAffinity::current(),
        })
    }
}

impl<T> InstantAdapterCore<T> {
    /// The layout every row is inflated from. Also the tag key of each row's cache.
    pub fn layout_id(&self) -> i32 {
        self.layout_id
    }

    /// The field bindings.
    pub fn bindings(&self) -> &BindingSpec<T> {
        &self.bindings
    }

    /// The view handlers.
    pub fn handlers(&self) -> &HandlerSpec<T> {
        &self.handlers
    }

    /// Mutable access to the view handlers, e.g. to remove one.
    pub fn handlers_mut(&mut self) -> &mut HandlerSpec<T> {
        &mut self.handlers
    }

    /// The configuration.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Inflate a new row view under `parent` (without attaching it) and
    /// attach an empty recycle cache to it.
    pub fn create_row(&self, tree: &mut ViewTree, parent: ViewId) -> AdapterResult<ViewId> {
        self.check_thread("create_row");
        let row = self.inflater.inflate(tree, self.layout_id, Some(parent), false)?;
        tree.set_tag(row, self.layout_id, ViewRecycleCache::new(self.config.miss_policy))?;
        tracing::debug!(target: "instant_adapter::dispatch", layout_id = self.layout_id, ?row, "created row view");
        Ok(row)
    }

    /// Check whether `row` was created by this core.
    pub fn owns_row(&self, tree: &ViewTree, row: ViewId) -> bool {
        matches!(tree.tag::<ViewRecycleCache>(row, self.layout_id), Ok(Some(_)))
    }

    /// The recycle cache attached to `row`.
    pub fn cache<'a>(&self, tree: &'a ViewTree, row: ViewId) -> AdapterResult<&'a ViewRecycleCache> {
        tree.tag::<ViewRecycleCache>(row, self.layout_id)?
            .ok_or(AdapterError::MissingCache {
                row,
                layout_id: self.layout_id,
            })
    }

    /// Resolve `view_id` under `row` through the row's recycle cache.
    ///
    /// Returns `Ok(None)` if no such view exists under the row.
    pub fn resolve(&self, tree: &mut ViewTree, row: ViewId, view_id: i32) -> AdapterResult<Option<ViewId>> {
        ViewRecycleCache::resolve(tree, row, self.layout_id, view_id).map(|holder| holder.view())
    }

    /// Bind `item` at `position` to a row view created by [`create_row`](Self::create_row).
    ///
    /// Runs the field update pass, then the handler pass.
    #[tracing::instrument(
        skip_all,
        target = "instant_adapter::dispatch",
        level = "trace",
        fields(layout_id = self.layout_id, row = ?row, position = position)
    )]
    pub fn bind_row(
        &self,
        adapter: &dyn ListAdapter,
        tree: &mut ViewTree,
        parent: ViewId,
        row: ViewId,
        item: &T,
        position: usize,
    ) -> AdapterResult<()> {
        self.check_thread("bind_row");
        self.cache(tree, row)?;

        self.update_fields(tree, row, item)?;

        let ctx = BindContext {
            parent,
            row,
            item,
            position,
        };
        self.execute_view_handlers(adapter, tree, &ctx)
    }

    /// Bind a row that was just created for this call, destroying it again if
    /// the bind fails so no detached subtree is left in the tree.
    pub(crate) fn bind_new_row(
        &self,
        adapter: &dyn ListAdapter,
        tree: &mut ViewTree,
        parent: ViewId,
        row: ViewId,
        item: &T,
        position: usize,
    ) -> AdapterResult<ViewId> {
        let Err(err) = self.bind_row(adapter, tree, parent, row, item, position) else {
            return Ok(row);
        };
        if tree.contains(row) {
            if let Err(destroy_err) = tree.destroy(row) {
                tracing::warn!(target: "instant_adapter::dispatch", ?row, %destroy_err, "failed to discard row");
            }
        }
        tracing::debug!(target: "instant_adapter::dispatch", ?row, %err, "discarded row after failed bind");
        Err(err)
    }

    fn update_fields(&self, tree: &mut ViewTree, row: ViewId, item: &T) -> AdapterResult<()> {
        for (view_id, binding) in self.bindings.iter() {
            let holder: Holder =
                ViewRecycleCache::resolve_with(tree, row, self.layout_id, view_id, || binding.auxiliary(item))?;
            let Some(view) = holder.view() else {
                tracing::trace!(target: "instant_adapter::dispatch", view_id, "no view for binding, skipped");
                continue;
            };
            binding
                .update(tree, view, &holder, item)
                .map_err(|source| AdapterError::Binding { view_id, source })?;
        }
        Ok(())
    }

    fn execute_view_handlers(
        &self,
        adapter: &dyn ListAdapter,
        tree: &mut ViewTree,
        ctx: &BindContext<'_, T>,
    ) -> AdapterResult<()> {
        for (view_id, slots) in self.handlers.iter() {
            if slots.iter().all(Option::is_none) {
                continue;
            }

            // The layout id addresses the row itself, which is not a cache entry.
            let target = if view_id == self.layout_id {
                Some(ctx.row)
            } else {
                self.resolve(tree, ctx.row, view_id)?
            };
            let Some(view) = target else {
                tracing::trace!(target: "instant_adapter::dispatch", view_id, "no view for handlers, skipped");
                continue;
            };

            for handler in slots.iter().flatten() {
                handler
                    .handle_view(adapter, tree, view, ctx)
                    .map_err(|source| AdapterError::Handler { view_id, source })?;
            }
        }
        Ok(())
    }

    fn check_thread(&self, operation: &str) {
        if self.config.thread_checks {
            self.affinity
                .assert_same_thread_with_msg(&format!("{operation} must run on the thread that created the adapter"));
        }
    }
}

impl<T> fmt::Debug for InstantAdapterCore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstantAdapterCore")
            .field("layout_id", &format_args!("{:#x}", self.layout_id))
            .field("bindings", &self.bindings)
            .field("handlers", &self.handlers)
            .field("config", &self.config)
            .finish()
    }
}
