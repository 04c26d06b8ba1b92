//! Core systems for Instant Adapter.
//!
//! This crate provides the view-side foundation the binding layer builds on:
//!
//! - **View Tree**: arena of views with resource ids, keyed tags and lookup by id
//! - **Inflation**: layout resources declared in code or TOML, inflated into the tree
//! - **Logging**: view subtree visualization for `tracing` output
//! - **Thread Checks**: UI-thread affinity assertions
//!
//! # Example
//!
//! ```
//! use instant_adapter_core::{LayoutInflater, LayoutNode, LayoutRegistry, ViewTree, NO_ID};
//!
//! let mut layouts = LayoutRegistry::new();
//! layouts.register(
//!     0x7f030001,
//!     LayoutNode::new("LinearLayout", NO_ID).with_child(LayoutNode::new("TextView", 0x7f050001)),
//! );
//!
//! let mut tree = ViewTree::new();
//! let row = layouts.inflate(&mut tree, 0x7f030001, None, false).unwrap();
//! let label = tree.find_view_by_id(row, 0x7f050001).unwrap().unwrap();
//! tree.set_text(label, "Hello").unwrap();
//! ```

mod error;
pub mod inflate;
pub mod logging;
pub mod thread_check;
pub mod view;

pub use error::{InflateError, ViewError, ViewResult};
pub use inflate::{LayoutInflater, LayoutNode, LayoutRegistry};
pub use logging::{TreeFormatOptions, TreeStyle, ViewTreeDebug};
pub use thread_check::ThreadAffinity;
pub use view::{ClickListener, NO_ID, ViewId, ViewTree};
