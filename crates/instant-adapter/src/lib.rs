//! Declarative list adapters with per-row view caching.
//!
//! Instead of hand-writing a view holder for every list row, an adapter is
//! described once:
//!
//! - a [`BindingSpec`] saying which field of a data instance goes into which
//!   view of the row layout;
//! - a [`HandlerSpec`] with custom logic run against views after the fields
//!   have been bound.
//!
//! [`InstantAdapterCore`] turns these into rows. Each row view it creates
//! carries a [`ViewRecycleCache`], so the children of a recycled row are looked
//! up once and never searched for again.
//!
//! The [`InstantAdapter`] and [`InstantCursorAdapter`] shims wrap a core for
//! array-backed and cursor-backed data.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use instant_adapter::{BindingSpec, HandlerSpec, InstantAdapterCore, ListAdapter, TextFormat};
//! use instant_adapter_core::{LayoutNode, LayoutRegistry, NO_ID, ViewTree};
//!
//! struct Contact {
//!     name: String,
//!     age: u32,
//! }
//!
//! struct Contacts(Vec<Contact>);
//!
//! impl ListAdapter for Contacts {
//!     fn count(&self) -> usize {
//!         self.0.len()
//!     }
//! }
//!
//! const ROW: i32 = 0x7f030001;
//! const NAME: i32 = 0x7f050001;
//! const AGE: i32 = 0x7f050002;
//!
//! let mut layouts = LayoutRegistry::new();
//! layouts.register(
//!     ROW,
//!     LayoutNode::new("LinearLayout", NO_ID)
//!         .with_child(LayoutNode::new("TextView", NAME))
//!         .with_child(LayoutNode::new("TextView", AGE)),
//! );
//!
//! let core = InstantAdapterCore::new(
//!     Arc::new(layouts),
//!     ROW,
//!     BindingSpec::new()
//!         .text(NAME, |c: &Contact| c.name.as_str().into())
//!         .text_formatted(AGE, TextFormat::pattern("{} years"), |c: &Contact| c.age.into()),
//!     HandlerSpec::new(),
//! )
//! .unwrap();
//!
//! let contacts = Contacts(vec![Contact { name: "Ada".into(), age: 36 }]);
//! let mut tree = ViewTree::new();
//! let list = tree.create_view("ListView", NO_ID);
//! let row = core.create_row(&mut tree, list).unwrap();
//! core.bind_row(&contacts, &mut tree, list, row, &contacts.0[0], 0).unwrap();
//!
//! let age = core.resolve(&mut tree, row, AGE).unwrap().unwrap();
//! assert_eq!(tree.text(age).unwrap(), Some("36 years"));
//! ```

mod adapter;
mod adapter_core;
pub mod binding;
pub mod cache;
pub mod config;
pub mod cursor;
mod error;
pub mod handler;
pub mod value;

pub use adapter::{InstantAdapter, ListAdapter};
pub use adapter_core::InstantAdapterCore;
pub use binding::{BindingSpec, CheckedBinding, FieldBinding, FnBinding, SharedFieldBinding, TextBinding};
pub use cache::{Holder, ViewRecycleCache};
pub use config::{AdapterConfig, MissPolicy};
pub use cursor::{ColumnTextBinding, Cursor, CursorError, CursorRow, InstantCursorAdapter};
pub use error::{AdapterError, AdapterResult, BindError, BindResult, ConfigError};
pub use handler::{BindContext, HandlerKey, HandlerSpec, SharedViewHandler, ViewHandler};
pub use value::{FieldValue, FormatError, TextFormat};
