//! Layout resources and inflation.
//!
//! A layout is a declarative template of views identified by an integer
//! resource id. Inflating a layout instantiates its template as a fresh
//! subtree of a [`ViewTree`].
//!
//! Layouts can be registered from code or declared in TOML:
//!
//! ```
//! use instant_adapter_core::inflate::{LayoutInflater, LayoutRegistry};
//! use instant_adapter_core::view::ViewTree;
//!
//! let registry = LayoutRegistry::from_toml_str(r#"
//! [[layouts]]
//! id = 0x7f030001
//!
//! [layouts.root]
//! class = "LinearLayout"
//!
//! [[layouts.root.children]]
//! id = 0x7f050001
//! class = "TextView"
//! "#).unwrap();
//!
//! let mut tree = ViewTree::new();
//! let row = registry.inflate(&mut tree, 0x7f030001, None, false).unwrap();
//! assert!(tree.find_view_by_id(row, 0x7f050001).unwrap().is_some());
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::InflateError;
use crate::view::{NO_ID, ViewId, ViewTree};

fn no_id() -> i32 {
    NO_ID
}

/// Template for one view of a layout and its children.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LayoutNode {
    /// Resource id of the view; [`NO_ID`] if omitted.
    #[serde(default = "no_id")]
    pub id: i32,
    /// Widget class name.
    pub class: String,
    /// Initial text.
    #[serde(default)]
    pub text: Option<String>,
    /// Child views, in order.
    #[serde(default)]
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    /// Create a node with the given class and resource id.
    pub fn new(class: impl Into<String>, id: i32) -> Self {
        Self {
            id,
            class: class.into(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Set the initial text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child node.
    pub fn with_child(mut self, child: LayoutNode) -> Self {
        self.children.push(child);
        self
    }

    fn instantiate(&self, tree: &mut ViewTree) -> Result<ViewId, InflateError> {
        let view = tree.create_view(self.class.clone(), self.id);
        if let Some(text) = &self.text {
            tree.set_text(view, text.clone())?;
        }
        for child in &self.children {
            let child_view = child.instantiate(tree)?;
            tree.add_child(view, child_view)?;
        }
        Ok(view)
    }
}

/// Inflates layouts into a [`ViewTree`].
pub trait LayoutInflater: Send + Sync {
    /// Instantiate the layout `layout_id` and return its root view.
    ///
    /// When `attach_to_root` is `true` and a parent is given, the new root is
    /// appended to `parent`; otherwise it is left detached.
    fn inflate(
        &self,
        tree: &mut ViewTree,
        layout_id: i32,
        parent: Option<ViewId>,
        attach_to_root: bool,
    ) -> Result<ViewId, InflateError>;

    /// Check whether `layout_id` can be inflated.
    fn has_layout(&self, layout_id: i32) -> bool;
}

#[derive(Deserialize)]
struct LayoutFile {
    #[serde(default)]
    layouts: Vec<LayoutDecl>,
}

#[derive(Deserialize)]
struct LayoutDecl {
    id: i32,
    root: LayoutNode,
}

/// In-memory table of layout resources.
#[derive(Debug, Clone, Default)]
pub struct LayoutRegistry {
    layouts: HashMap<i32, LayoutNode>,
}

impl LayoutRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse layout declarations from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, InflateError> {
        let file: LayoutFile = toml::from_str(source)?;
        let mut registry = Self::new();
        for decl in file.layouts {
            if registry.layouts.contains_key(&decl.id) {
                return Err(InflateError::DuplicateLayout(decl.id));
            }
            registry.register(decl.id, decl.root);
        }
        tracing::debug!(target: "instant_adapter_core::inflate", count = registry.len(), "loaded layout resources");
        Ok(registry)
    }

    /// Read layout declarations from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InflateError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| InflateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Register (or replace) a layout.
    pub fn register(&mut self, layout_id: i32, root: LayoutNode) -> &mut Self {
        self.layouts.insert(layout_id, root);
        self
    }

    /// Get the template of a layout.
    pub fn layout(&self, layout_id: i32) -> Option<&LayoutNode> {
        self.layouts.get(&layout_id)
    }

    /// Number of registered layouts.
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    /// Returns `true` if no layouts are registered.
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

impl LayoutInflater for LayoutRegistry {
    fn inflate(
        &self,
        tree: &mut ViewTree,
        layout_id: i32,
        parent: Option<ViewId>,
        attach_to_root: bool,
    ) -> Result<ViewId, InflateError> {
        let template = self
            .layouts
            .get(&layout_id)
            .ok_or(InflateError::UnknownLayout(layout_id))?;
        let root = template.instantiate(tree)?;
        if let (Some(parent), true) = (parent, attach_to_root) {
            tree.add_child(parent, root)?;
        }
        tracing::trace!(target: "instant_adapter_core::inflate", layout_id, ?root, "inflated layout");
        Ok(root)
    }

    fn has_layout(&self, layout_id: i32) -> bool {
        self.layouts.contains_key(&layout_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: i32 = 0x7f03_0001;
    const NAME: i32 = 0x7f05_0001;
    const AGE: i32 = 0x7f05_0002;

    fn row_layout() -> LayoutNode {
        LayoutNode::new("LinearLayout", ROW)
            .with_child(LayoutNode::new("TextView", NAME).with_text("placeholder"))
            .with_child(LayoutNode::new("FrameLayout", NO_ID).with_child(LayoutNode::new("TextView", AGE)))
    }

    #[test]
    fn test_inflate_detached() {
        let mut registry = LayoutRegistry::new();
        registry.register(ROW, row_layout());

        let mut tree = ViewTree::new();
        let list = tree.create_view("ListView", NO_ID);
        let row = registry.inflate(&mut tree, ROW, Some(list), false).unwrap();

        assert_eq!(tree.parent(row).unwrap(), None);
        assert!(tree.children(list).unwrap().is_empty());
        assert_eq!(tree.view_count(), 5);

        let name = tree.find_view_by_id(row, NAME).unwrap().unwrap();
        assert_eq!(tree.text(name).unwrap(), Some("placeholder"));
        assert!(tree.find_view_by_id(row, AGE).unwrap().is_some());
    }

    #[test]
    fn test_inflate_attached() {
        let mut registry = LayoutRegistry::new();
        registry.register(ROW, row_layout());

        let mut tree = ViewTree::new();
        let list = tree.create_view("ListView", NO_ID);
        let row = registry.inflate(&mut tree, ROW, Some(list), true).unwrap();
        assert_eq!(tree.parent(row).unwrap(), Some(list));
    }

    #[test]
    fn test_inflate_unknown_layout() {
        let registry = LayoutRegistry::new();
        let mut tree = ViewTree::new();
        let err = registry.inflate(&mut tree, ROW, None, false).unwrap_err();
        assert!(matches!(err, InflateError::UnknownLayout(ROW)));
        assert_eq!(err.layout_id(), Some(ROW));
        assert!(!registry.has_layout(ROW));
    }

    #[test]
    fn test_from_toml() {
        let registry = LayoutRegistry::from_toml_str(
            r#"
            [[layouts]]
            id = 0x7f030001

            [layouts.root]
            class = "LinearLayout"
            id = 0x7f030001

            [[layouts.root.children]]
            id = 0x7f050001
            class = "TextView"
            text = "name"

            [[layouts.root.children]]
            class = "View"
            "#,
        )
        .unwrap();

        assert_eq!(registry.len(), 1);
        let root = registry.layout(ROW).unwrap();
        assert_eq!(root.id, ROW);
        assert_eq!(root.children[0].text.as_deref(), Some("name"));
        assert_eq!(root.children[1].id, NO_ID);
    }

    #[test]
    fn test_from_toml_duplicate() {
        let err = LayoutRegistry::from_toml_str(
            r#"
            [[layouts]]
            id = 1
            root = { class = "View" }

            [[layouts]]
            id = 1
            root = { class = "View" }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, InflateError::DuplicateLayout(1)));
    }

    #[test]
    fn test_from_toml_parse_error() {
        let err = LayoutRegistry::from_toml_str("[[layouts]]\nid = \"oops\"").unwrap_err();
        assert!(matches!(err, InflateError::Parse(_)));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layouts.toml");
        std::fs::write(&path, "[[layouts]]\nid = 7\nroot = { class = \"FrameLayout\" }\n").unwrap();

        let registry = LayoutRegistry::from_path(&path).unwrap();
        assert!(registry.has_layout(7));

        let err = LayoutRegistry::from_path(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, InflateError::Io { .. }));
        assert!(err.to_string().contains("missing.toml"));
    }
}
