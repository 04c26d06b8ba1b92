//! View tree for Instant Adapter.
//!
//! Provides the arena that backs every inflated row:
//! - Stable view handles via arena-based storage
//! - Parent-child ownership with cascade destroy
//! - Integer resource ids and lookup by id (`find_view_by_id`)
//! - Keyed tags for attaching owned, type-erased data to a view
//! - Named dynamic properties, text/checked state and click listeners
//!
//! # Key Types
//!
//! - [`ViewTree`] - Central arena holding all views and their relationships
//! - [`ViewId`] - Stable handle for one view in the arena
//! - [`ClickListener`] - Callback invoked by [`ViewTree::perform_click`]
//!
//! # Resource ids vs. handles
//!
//! A [`ViewId`] identifies one physical view instance. A resource id (`i32`)
//! is the identifier declared in a layout and is shared by the corresponding
//! view of every row inflated from that layout. [`NO_ID`] marks a view without
//! a resource id.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::{SlotMap, new_key_type};

use crate::error::{ViewError, ViewResult};

/// Resource id of a view that was declared without one.
pub const NO_ID: i32 = -1;

new_key_type! {
    /// A unique handle for a view in a [`ViewTree`].
    ///
    /// `ViewId`s remain valid while the tree structure changes and become
    /// invalid once the view is destroyed.
    pub struct ViewId;
}

/// Callback attached to a view and invoked when the view is clicked.
pub type ClickListener = Arc<dyn Fn(ViewId) + Send + Sync>;

/// Internal data stored in the tree for each view.
struct ViewData {
    /// Resource id declared in the layout, or [`NO_ID`].
    resource_id: i32,
    /// Widget class name ("TextView", "LinearLayout", ...).
    class_name: String,
    parent: Option<ViewId>,
    children: Vec<ViewId>,
    /// Displayed text for text-bearing views.
    text: Option<String>,
    /// Checked state for compound buttons.
    checked: Option<bool>,
    /// Keyed tags (type-erased).
    tags: HashMap<i32, Box<dyn Any + Send + Sync>>,
    /// Dynamic properties (type-erased).
    properties: HashMap<String, Box<dyn Any + Send + Sync>>,
    on_click: Option<ClickListener>,
}

impl ViewData {
    fn new(class_name: String, resource_id: i32) -> Self {
        Self {
            resource_id,
            class_name,
            parent: None,
            children: Vec::new(),
            text: None,
            checked: None,
            tags: HashMap::new(),
            properties: HashMap::new(),
            on_click: None,
        }
    }
}

/// The arena that owns every view and its relationships.
///
/// Uses arena-based storage via SlotMap for stable view handles. All access
/// happens on the UI thread; the tree is passed by reference to whoever
/// needs to read or mutate it.
pub struct ViewTree {
    views: SlotMap<ViewId, ViewData>,
    /// Number of subtree traversals performed by `find_view_by_id`.
    lookups: AtomicU64,
}

static_assertions::assert_impl_all!(ViewTree: Send, Sync);

impl ViewTree {
    /// Create a new empty view tree.
    pub fn new() -> Self {
        Self {
            views: SlotMap::with_key(),
            lookups: AtomicU64::new(0),
        }
    }

    /// Create a detached view and return its handle.
    pub fn create_view(&mut self, class_name: impl Into<String>, resource_id: i32) -> ViewId {
        let class_name = class_name.into();
        let id = self.views.insert(ViewData::new(class_name, resource_id));
        tracing::trace!(target: "instant_adapter_core::view", ?id, resource_id, "created view");
        id
    }

    /// Remove a view and all its descendants from the tree.
    #[tracing::instrument(skip(self), target = "instant_adapter_core::view", level = "trace")]
    pub fn destroy(&mut self, id: ViewId) -> ViewResult<()> {
        let descendants = self.depth_first_postorder(id)?;

        if let Some(parent_id) = self.views.get(id).and_then(|d| d.parent) {
            if let Some(parent_data) = self.views.get_mut(parent_id) {
                parent_data.children.retain(|&child| child != id);
            }
        }

        // Postorder already ends with `id` itself.
        for view in descendants {
            self.views.remove(view);
        }
        Ok(())
    }

    /// Check if a view exists in the tree.
    pub fn contains(&self, id: ViewId) -> bool {
        self.views.contains_key(id)
    }

    /// Get the number of live views.
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Set the parent of a view.
    ///
    /// Removes the view from its old parent. Passing `None` detaches it.
    pub fn set_parent(&mut self, id: ViewId, new_parent: Option<ViewId>) -> ViewResult<()> {
        if !self.views.contains_key(id) {
            return Err(ViewError::InvalidViewId);
        }

        if let Some(parent_id) = new_parent {
            if !self.views.contains_key(parent_id) {
                return Err(ViewError::InvalidViewId);
            }
            if self.is_ancestor_of(id, parent_id) {
                return Err(ViewError::CircularParentage);
            }
        }

        let old_parent = self.views.get(id).and_then(|d| d.parent);
        if let Some(old_parent_id) = old_parent {
            if let Some(parent_data) = self.views.get_mut(old_parent_id) {
                parent_data.children.retain(|&child| child != id);
            }
        }

        if let Some(data) = self.views.get_mut(id) {
            data.parent = new_parent;
        }

        if let Some(parent_id) = new_parent {
            if let Some(parent_data) = self.views.get_mut(parent_id) {
                parent_data.children.push(id);
            }
        }

        Ok(())
    }

    /// Append `child` to `parent`'s children.
    pub fn add_child(&mut self, parent: ViewId, child: ViewId) -> ViewResult<()> {
        self.set_parent(child, Some(parent))
    }

    fn is_ancestor_of(&self, potential_ancestor: ViewId, id: ViewId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == potential_ancestor {
                return true;
            }
            current = self.views.get(current_id).and_then(|d| d.parent);
        }
        false
    }

    /// Get the parent of a view.
    pub fn parent(&self, id: ViewId) -> ViewResult<Option<ViewId>> {
        self.data(id).map(|d| d.parent)
    }

    /// Get the children of a view.
    pub fn children(&self, id: ViewId) -> ViewResult<&[ViewId]> {
        self.data(id).map(|d| d.children.as_slice())
    }

    /// Get the resource id a view was declared with.
    pub fn resource_id(&self, id: ViewId) -> ViewResult<i32> {
        self.data(id).map(|d| d.resource_id)
    }

    /// Get the class name of a view.
    pub fn class_name(&self, id: ViewId) -> ViewResult<&str> {
        self.data(id).map(|d| d.class_name.as_str())
    }

    /// Find the first view with the given resource id in the subtree rooted
    /// at `root`, `root` included, in depth-first pre-order.
    ///
    /// Returns `None` for [`NO_ID`] or when no view matches.
    pub fn find_view_by_id(&self, root: ViewId, resource_id: i32) -> ViewResult<Option<ViewId>> {
        self.data(root)?;
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if resource_id == NO_ID {
            return Ok(None);
        }

        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let Some(data) = self.views.get(current) else {
                continue;
            };
            if data.resource_id == resource_id {
                return Ok(Some(current));
            }
            stack.extend(data.children.iter().rev().copied());
        }
        Ok(None)
    }

    /// Number of subtree lookups performed through [`find_view_by_id`](Self::find_view_by_id).
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    // =========================================================================
    // Text / checked state
    // =========================================================================

    /// Get the text of a view, if it has any.
    pub fn text(&self, id: ViewId) -> ViewResult<Option<&str>> {
        self.data(id).map(|d| d.text.as_deref())
    }

    /// Set the text of a view.
    pub fn set_text(&mut self, id: ViewId, text: impl Into<String>) -> ViewResult<()> {
        self.data_mut(id)?.text = Some(text.into());
        Ok(())
    }

    /// Get the checked state of a view, if it was ever set.
    pub fn is_checked(&self, id: ViewId) -> ViewResult<Option<bool>> {
        self.data(id).map(|d| d.checked)
    }

    /// Set the checked state of a view.
    pub fn set_checked(&mut self, id: ViewId, checked: bool) -> ViewResult<()> {
        self.data_mut(id)?.checked = Some(checked);
        Ok(())
    }

    // =========================================================================
    // Click listeners
    // =========================================================================

    /// Attach (or with `None`, clear) the click listener of a view.
    pub fn set_on_click(&mut self, id: ViewId, listener: Option<ClickListener>) -> ViewResult<()> {
        self.data_mut(id)?.on_click = listener;
        Ok(())
    }

    /// Check whether a view has a click listener.
    pub fn has_click_listener(&self, id: ViewId) -> ViewResult<bool> {
        self.data(id).map(|d| d.on_click.is_some())
    }

    /// Invoke the view's click listener.
    ///
    /// Returns `true` if a listener was attached and called.
    pub fn perform_click(&self, id: ViewId) -> ViewResult<bool> {
        match self.data(id)?.on_click.clone() {
            Some(listener) => {
                listener(id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // =========================================================================
    // Keyed tags
    // =========================================================================

    /// Attach a value to a view under an integer key, replacing any previous
    /// value stored under the same key.
    pub fn set_tag<T: Any + Send + Sync>(&mut self, id: ViewId, key: i32, value: T) -> ViewResult<()> {
        self.data_mut(id)?.tags.insert(key, Box::new(value));
        Ok(())
    }

    /// Get the value stored under `key`.
    ///
    /// Returns an error if a value exists under `key` with a different type.
    pub fn tag<T: Any>(&self, id: ViewId, key: i32) -> ViewResult<Option<&T>> {
        match self.data(id)?.tags.get(&key) {
            Some(value) => value
                .downcast_ref::<T>()
                .map(Some)
                .ok_or(ViewError::TagTypeMismatch {
                    key,
                    expected: type_name::<T>(),
                }),
            None => Ok(None),
        }
    }

    /// Get mutable access to the value stored under `key`.
    pub fn tag_mut<T: Any>(&mut self, id: ViewId, key: i32) -> ViewResult<Option<&mut T>> {
        match self.data_mut(id)?.tags.get_mut(&key) {
            Some(value) => value
                .downcast_mut::<T>()
                .map(Some)
                .ok_or(ViewError::TagTypeMismatch {
                    key,
                    expected: type_name::<T>(),
                }),
            None => Ok(None),
        }
    }

    /// Remove and return the value stored under `key`.
    ///
    /// A value of a different type is left in place and reported as an error.
    pub fn take_tag<T: Any + Send + Sync>(&mut self, id: ViewId, key: i32) -> ViewResult<Option<T>> {
        let data = self.data_mut(id)?;
        if !data.tags.get(&key).is_none_or(|value| value.is::<T>()) {
            return Err(ViewError::TagTypeMismatch {
                key,
                expected: type_name::<T>(),
            });
        }
        Ok(data
            .tags
            .remove(&key)
            .and_then(|value| value.downcast::<T>().ok())
            .map(|boxed| *boxed))
    }

    /// Check whether any value is stored under `key`.
    pub fn has_tag(&self, id: ViewId, key: i32) -> ViewResult<bool> {
        self.data(id).map(|d| d.tags.contains_key(&key))
    }

    /// Get all tag keys attached to a view, sorted.
    pub fn tag_keys(&self, id: ViewId) -> ViewResult<Vec<i32>> {
        let mut keys: Vec<i32> = self.data(id)?.tags.keys().copied().collect();
        keys.sort_unstable();
        Ok(keys)
    }

    // =========================================================================
    // Dynamic properties
    // =========================================================================

    /// Set a dynamic property on a view.
    pub fn set_property<T: Any + Send + Sync>(
        &mut self,
        id: ViewId,
        name: impl Into<String>,
        value: T,
    ) -> ViewResult<()> {
        self.data_mut(id)?.properties.insert(name.into(), Box::new(value));
        Ok(())
    }

    /// Get a dynamic property from a view.
    pub fn property<T: Any>(&self, id: ViewId, name: &str) -> ViewResult<Option<&T>> {
        Ok(self
            .data(id)?
            .properties
            .get(name)
            .and_then(|v| v.downcast_ref::<T>()))
    }

    /// Get all dynamic property names of a view.
    pub fn property_names(&self, id: ViewId) -> ViewResult<Vec<&str>> {
        Ok(self.data(id)?.properties.keys().map(|s| s.as_str()).collect())
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Collect the subtree rooted at `id` in depth-first pre-order (parents first).
    pub fn depth_first_preorder(&self, id: ViewId) -> ViewResult<Vec<ViewId>> {
        let mut result = Vec::new();
        self.preorder_recursive(id, &mut result)?;
        Ok(result)
    }

    fn preorder_recursive(&self, id: ViewId, result: &mut Vec<ViewId>) -> ViewResult<()> {
        result.push(id);
        for &child in &self.data(id)?.children {
            self.preorder_recursive(child, result)?;
        }
        Ok(())
    }

    /// Collect the subtree rooted at `id` in depth-first post-order (children first).
    pub fn depth_first_postorder(&self, id: ViewId) -> ViewResult<Vec<ViewId>> {
        let mut result = Vec::new();
        self.postorder_recursive(id, &mut result)?;
        Ok(result)
    }

    fn postorder_recursive(&self, id: ViewId, result: &mut Vec<ViewId>) -> ViewResult<()> {
        for &child in &self.data(id)?.children {
            self.postorder_recursive(child, result)?;
        }
        result.push(id);
        Ok(())
    }

    fn data(&self, id: ViewId) -> ViewResult<&ViewData> {
        self.views.get(id).ok_or(ViewError::InvalidViewId)
    }

    fn data_mut(&mut self, id: ViewId) -> ViewResult<&mut ViewData> {
        self.views.get_mut(id).ok_or(ViewError::InvalidViewId)
    }
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ViewTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewTree")
            .field("views", &self.views.len())
            .field("lookups", &self.lookup_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn sample_row(tree: &mut ViewTree) -> (ViewId, ViewId, ViewId, ViewId) {
        let root = tree.create_view("LinearLayout", 100);
        let title = tree.create_view("TextView", 1);
        let inner = tree.create_view("FrameLayout", NO_ID);
        let check = tree.create_view("CheckBox", 2);
        tree.add_child(root, title).unwrap();
        tree.add_child(root, inner).unwrap();
        tree.add_child(inner, check).unwrap();
        (root, title, inner, check)
    }

    #[test]
    fn test_view_creation() {
        let mut tree = ViewTree::new();
        let view = tree.create_view("TextView", 7);
        assert!(tree.contains(view));
        assert_eq!(tree.resource_id(view).unwrap(), 7);
        assert_eq!(tree.class_name(view).unwrap(), "TextView");
        assert_eq!(tree.view_count(), 1);
    }

    #[test]
    fn test_find_view_by_id_includes_root_and_descendants() {
        let mut tree = ViewTree::new();
        let (root, title, _inner, check) = sample_row(&mut tree);

        assert_eq!(tree.find_view_by_id(root, 100).unwrap(), Some(root));
        assert_eq!(tree.find_view_by_id(root, 1).unwrap(), Some(title));
        assert_eq!(tree.find_view_by_id(root, 2).unwrap(), Some(check));
        assert_eq!(tree.find_view_by_id(root, 99).unwrap(), None);
        assert_eq!(tree.find_view_by_id(root, NO_ID).unwrap(), None);
        assert_eq!(tree.lookup_count(), 5);
    }

    #[test]
    fn test_find_view_by_id_prefers_preorder() {
        let mut tree = ViewTree::new();
        let root = tree.create_view("LinearLayout", 100);
        let group = tree.create_view("FrameLayout", NO_ID);
        let nested = tree.create_view("TextView", 5);
        let sibling = tree.create_view("TextView", 5);
        tree.add_child(root, group).unwrap();
        tree.add_child(group, nested).unwrap();
        tree.add_child(root, sibling).unwrap();

        assert_eq!(tree.find_view_by_id(root, 5).unwrap(), Some(nested));
    }

    #[test]
    fn test_cascade_destroy() {
        let mut tree = ViewTree::new();
        let (root, title, inner, check) = sample_row(&mut tree);

        tree.destroy(inner).unwrap();
        assert!(!tree.contains(inner));
        assert!(!tree.contains(check));
        assert!(tree.contains(title));
        assert_eq!(tree.children(root).unwrap(), &[title]);

        tree.destroy(root).unwrap();
        assert_eq!(tree.view_count(), 0);
    }

    #[test]
    fn test_circular_parentage_rejected() {
        let mut tree = ViewTree::new();
        let (root, _title, inner, _check) = sample_row(&mut tree);
        assert_eq!(
            tree.set_parent(root, Some(inner)),
            Err(ViewError::CircularParentage)
        );
    }

    #[test]
    fn test_reparenting() {
        let mut tree = ViewTree::new();
        let (root, title, inner, _check) = sample_row(&mut tree);

        tree.add_child(inner, title).unwrap();
        assert!(!tree.children(root).unwrap().contains(&title));
        assert_eq!(tree.parent(title).unwrap(), Some(inner));
    }

    #[test]
    fn test_keyed_tags() {
        let mut tree = ViewTree::new();
        let view = tree.create_view("LinearLayout", 100);

        tree.set_tag(view, 100, vec![1u32, 2, 3]).unwrap();
        tree.set_tag(view, 200, String::from("other tagger")).unwrap();

        assert_eq!(tree.tag::<Vec<u32>>(view, 100).unwrap(), Some(&vec![1, 2, 3]));
        assert_eq!(tree.tag::<String>(view, 200).unwrap().map(String::as_str), Some("other tagger"));
        assert_eq!(tree.tag::<String>(view, 300).unwrap(), None);
        assert_eq!(tree.tag_keys(view).unwrap(), vec![100, 200]);

        tree.tag_mut::<Vec<u32>>(view, 100).unwrap().unwrap().push(4);
        assert_eq!(tree.tag::<Vec<u32>>(view, 100).unwrap().map(Vec::len), Some(4));
    }

    #[test]
    fn test_tag_type_mismatch() {
        let mut tree = ViewTree::new();
        let view = tree.create_view("LinearLayout", 100);
        tree.set_tag(view, 100, 5u8).unwrap();

        assert!(matches!(
            tree.tag::<String>(view, 100),
            Err(ViewError::TagTypeMismatch { key: 100, .. })
        ));
        assert!(tree.take_tag::<String>(view, 100).is_err());
        assert!(tree.has_tag(view, 100).unwrap());

        assert_eq!(tree.take_tag::<u8>(view, 100).unwrap(), Some(5));
        assert!(!tree.has_tag(view, 100).unwrap());
    }

    #[test]
    fn test_text_and_checked_state() {
        let mut tree = ViewTree::new();
        let (_root, title, _inner, check) = sample_row(&mut tree);

        assert_eq!(tree.text(title).unwrap(), None);
        tree.set_text(title, "Hello").unwrap();
        assert_eq!(tree.text(title).unwrap(), Some("Hello"));

        assert_eq!(tree.is_checked(check).unwrap(), None);
        tree.set_checked(check, true).unwrap();
        assert_eq!(tree.is_checked(check).unwrap(), Some(true));
    }

    #[test]
    fn test_click_listener() {
        let mut tree = ViewTree::new();
        let button = tree.create_view("Button", 3);
        let clicks = Arc::new(AtomicUsize::new(0));

        assert!(!tree.perform_click(button).unwrap());

        let counter = clicks.clone();
        tree.set_on_click(
            button,
            Some(Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        )
        .unwrap();
        assert!(tree.has_click_listener(button).unwrap());
        assert!(tree.perform_click(button).unwrap());
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dynamic_properties() {
        let mut tree = ViewTree::new();
        let view = tree.create_view("TextView", 1);
        tree.set_property(view, "counter", 100i32).unwrap();
        assert_eq!(tree.property::<i32>(view, "counter").unwrap(), Some(&100));
        assert_eq!(tree.property::<String>(view, "counter").unwrap(), None);
        assert_eq!(tree.property_names(view).unwrap(), vec!["counter"]);
    }

    #[test]
    fn test_invalid_view_id() {
        let mut tree = ViewTree::new();
        let view = tree.create_view("TextView", 1);
        tree.destroy(view).unwrap();
        assert_eq!(tree.text(view), Err(ViewError::InvalidViewId));
        assert_eq!(tree.find_view_by_id(view, 1), Err(ViewError::InvalidViewId));
    }
}
