//! List adapters.
//!
//! [`ListAdapter`] is the read-only view of an adapter that list containers
//! and view handlers work against. [`InstantAdapter`] is the array-backed
//! implementation: it owns its items and an [`InstantAdapterCore`] that
//! creates and binds the row views.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use instant_adapter::{BindingSpec, HandlerSpec, InstantAdapter, ListAdapter};
//! use instant_adapter_core::{LayoutNode, LayoutRegistry, NO_ID, ViewTree};
//!
//! const ROW: i32 = 0x7f030001;
//! const NAME: i32 = 0x7f050001;
//!
//! let mut layouts = LayoutRegistry::new();
//! layouts.register(ROW, LayoutNode::new("LinearLayout", NO_ID).with_child(LayoutNode::new("TextView", NAME)));
//!
//! let adapter = InstantAdapter::new(
//!     Arc::new(layouts),
//!     ROW,
//!     BindingSpec::<String>::new().text(NAME, |name| name.as_str().into()),
//!     HandlerSpec::new(),
//!     vec!["Ada".to_string(), "Grace".to_string()],
//! )
//! .unwrap();
//!
//! let mut tree = ViewTree::new();
//! let list = tree.create_view("ListView", NO_ID);
//! let row = adapter.get_view(&mut tree, 1, None, list).unwrap();
//! let name = tree.find_view_by_id(row, NAME).unwrap().unwrap();
//! assert_eq!(tree.text(name).unwrap(), Some("Grace"));
//! assert_eq!(adapter.count(), 2);
//! ```

use std::sync::Arc;

use instant_adapter_core::{LayoutInflater, ViewId, ViewTree};
use parking_lot::RwLock;

use crate::adapter_core::InstantAdapterCore;
use crate::binding::BindingSpec;
use crate::config::AdapterConfig;
use crate::error::{AdapterError, AdapterResult};
use crate::handler::HandlerSpec;

/// Read-only adapter interface seen by list containers and view handlers.
pub trait ListAdapter: Send + Sync {
    /// Number of items.
    fn count(&self) -> usize;

    /// Stable identifier of the item at `position`. Defaults to the position.
    fn item_id(&self, position: usize) -> u64 {
        position as u64
    }

    /// Whether [`item_id`](Self::item_id) survives changes to the data set.
    fn has_stable_ids(&self) -> bool {
        false
    }

    /// Number of distinct row layouts.
    fn view_type_count(&self) -> usize {
        1
    }

    /// Returns `true` if there are no items.
    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Array-backed adapter binding items of type `T` to rows of one layout.
pub struct InstantAdapter<T> {
    core: InstantAdapterCore<T>,
    items: RwLock<Vec<T>>,
}

impl<T: Send + Sync + 'static> InstantAdapter<T> {
    /// Create an adapter with the default configuration.
    pub fn new(
        inflater: Arc<dyn LayoutInflater>,
        layout_id: i32,
        bindings: BindingSpec<T>,
        handlers: HandlerSpec<T>,
        items: Vec<T>,
    ) -> AdapterResult<Self> {
        Self::with_config(inflater, layout_id, bindings, handlers, items, AdapterConfig::default())
    }

    /// Create an adapter with an explicit configuration.
    pub fn with_config(
        inflater: Arc<dyn LayoutInflater>,
        layout_id: i32,
        bindings: BindingSpec<T>,
        handlers: HandlerSpec<T>,
        items: Vec<T>,
        config: AdapterConfig,
    ) -> AdapterResult<Self> {
        let core = InstantAdapterCore::with_config(inflater, layout_id, bindings, handlers, config)?;
        Ok(Self {
            core,
            items: RwLock::new(items),
        })
    }

    /// The core that creates and binds rows.
    pub fn core(&self) -> &InstantAdapterCore<T> {
        &self.core
    }

    /// Mutable access to the core, e.g. to remove a view handler.
    pub fn core_mut(&mut self) -> &mut InstantAdapterCore<T> {
        &mut self.core
    }

    /// Appends an item.
    pub fn add(&self, item: T) {
        self.items.write().push(item);
    }

    /// Inserts an item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > count()`.
    pub fn insert(&self, index: usize, item: T) {
        self.items.write().insert(index, item);
    }

    /// Removes and returns the item at `index`, if there is one.
    pub fn remove(&self, index: usize) -> Option<T> {
        let mut items = self.items.write();
        (index < items.len()).then(|| items.remove(index))
    }

    /// Removes all items.
    pub fn clear(&self) {
        self.items.write().clear();
    }

    /// Replaces all items.
    pub fn set_items(&self, items: Vec<T>) {
        *self.items.write() = items;
    }

    /// Returns a reference to the items (read-only access).
    pub fn items(&self) -> impl std::ops::Deref<Target = Vec<T>> + '_ {
        self.items.read()
    }

    /// Runs `f` against the item at `position`.
    pub fn with_item<R>(&self, position: usize, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.items.read().get(position).map(f)
    }

    /// Produce the row view for `position`.
    ///
    /// `convert_view` is reused when it is a row of this adapter; otherwise a
    /// new row is created under `parent`. The row is then bound to the item at
    /// `position` and returned.
    ///
    /// A row created by this call is destroyed again if binding fails.
    pub fn get_view(
        &self,
        tree: &mut ViewTree,
        position: usize,
        convert_view: Option<ViewId>,
        parent: ViewId,
    ) -> AdapterResult<ViewId> {
        let items = self.items.read();
        let item = items.get(position).ok_or(AdapterError::PositionOutOfRange {
            position,
            count: items.len(),
        })?;

        match convert_view {
            Some(row) if self.core.owns_row(tree, row) => {
                self.core.bind_row(self, tree, parent, row, item, position)?;
                Ok(row)
            }
            _ => {
                let row = self.core.create_row(tree, parent)?;
                self.core.bind_new_row(self, tree, parent, row, item, position)
            }
        }
    }
}

impl<T: Send + Sync> ListAdapter for InstantAdapter<T> {
    fn count(&self) -> usize {
        // Handlers may call back in while `get_view` holds the read lock.
        self.items.read_recursive().len()
    }
}

impl<T> std::fmt::Debug for InstantAdapter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstantAdapter")
            .field("core", &self.core)
            .field("count", &self.items.read().len())
            .finish()
    }
}
