//! Field-to-view bindings.
//!
//! A [`BindingSpec`] maps view resource ids to [`FieldBinding`]s. It is built
//! once per adapter and shared by every row:
//!
//! ```
//! use instant_adapter::{BindingSpec, TextFormat};
//!
//! struct Contact {
//!     name: String,
//!     age: u32,
//!     favorite: bool,
//! }
//!
//! const NAME: i32 = 0x7f050001;
//! const AGE: i32 = 0x7f050002;
//! const FAVORITE: i32 = 0x7f050003;
//!
//! let bindings = BindingSpec::<Contact>::new()
//!     .text(NAME, |c| c.name.as_str().into())
//!     .text_formatted(AGE, TextFormat::pattern("{} years"), |c| c.age.into())
//!     .checked(FAVORITE, |c| c.favorite);
//! assert_eq!(bindings.len(), 3);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use instant_adapter_core::{ViewId, ViewTree};

use crate::cache::Holder;
use crate::error::BindResult;
use crate::value::{FieldValue, TextFormat};

/// Pushes one field of a data instance into a resolved view.
pub trait FieldBinding<T>: Send + Sync {
    /// Auxiliary value stored in the view's [`Holder`] when it is first resolved.
    fn auxiliary(&self, _item: &T) -> Option<usize> {
        None
    }

    /// Update `view` from `item`.
    fn update(&self, tree: &mut ViewTree, view: ViewId, holder: &Holder, item: &T) -> BindResult;
}

/// Shared, type-erased field binding.
pub type SharedFieldBinding<T> = Arc<dyn FieldBinding<T>>;

/// Type alias for a field extractor function.
pub type FieldExtractor<T> = Arc<dyn Fn(&T) -> FieldValue + Send + Sync>;

/// Sets a view's text from a formatted field value.
pub struct TextBinding<T> {
    extract: FieldExtractor<T>,
    format: TextFormat,
}

impl<T> TextBinding<T> {
    /// Create a text binding.
    pub fn new<F>(format: TextFormat, extract: F) -> Self
    where
        F: Fn(&T) -> FieldValue + Send + Sync + 'static,
    {
        Self {
            extract: Arc::new(extract),
            format,
        }
    }

    /// The format applied to extracted values.
    pub fn format(&self) -> &TextFormat {
        &self.format
    }
}

impl<T> FieldBinding<T> for TextBinding<T> {
    fn update(&self, tree: &mut ViewTree, view: ViewId, _holder: &Holder, item: &T) -> BindResult {
        let text = self.format.apply(&(self.extract)(item))?;
        tree.set_text(view, text)?;
        Ok(())
    }
}

/// Sets the checked state of a compound button.
pub struct CheckedBinding<T> {
    extract: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> CheckedBinding<T> {
    /// Create a checked-state binding.
    pub fn new<F>(extract: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            extract: Arc::new(extract),
        }
    }
}

impl<T> FieldBinding<T> for CheckedBinding<T> {
    fn update(&self, tree: &mut ViewTree, view: ViewId, _holder: &Holder, item: &T) -> BindResult {
        tree.set_checked(view, (self.extract)(item))?;
        Ok(())
    }
}

/// Binding backed by an arbitrary closure.
pub struct FnBinding<F> {
    update: F,
}

impl<F> FnBinding<F> {
    /// Wrap a closure.
    pub fn new(update: F) -> Self {
        Self { update }
    }
}

impl<T, F> FieldBinding<T> for FnBinding<F>
where
    F: Fn(&mut ViewTree, ViewId, &T) -> BindResult + Send + Sync,
{
    fn update(&self, tree: &mut ViewTree, view: ViewId, _holder: &Holder, item: &T) -> BindResult {
        (self.update)(tree, view, item)
    }
}

/// View resource id → field binding, iterated in ascending id order.
pub struct BindingSpec<T> {
    bindings: BTreeMap<i32, SharedFieldBinding<T>>,
}

impl<T: 'static> BindingSpec<T> {
    /// Create an empty spec.
    pub fn new() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// Bind `view_id` to `binding`, replacing any earlier binding for that id.
    pub fn bind(mut self, view_id: i32, binding: impl FieldBinding<T> + 'static) -> Self {
        self.insert(view_id, Arc::new(binding));
        self
    }

    /// Bind `view_id` to the displayed form of a field.
    pub fn text<F>(self, view_id: i32, extract: F) -> Self
    where
        F: Fn(&T) -> FieldValue + Send + Sync + 'static,
    {
        self.bind(view_id, TextBinding::new(TextFormat::Display, extract))
    }

    /// Bind `view_id` to a field rendered with `format`.
    pub fn text_formatted<F>(self, view_id: i32, format: TextFormat, extract: F) -> Self
    where
        F: Fn(&T) -> FieldValue + Send + Sync + 'static,
    {
        self.bind(view_id, TextBinding::new(format, extract))
    }

    /// Bind `view_id`'s checked state to a boolean field.
    pub fn checked<F>(self, view_id: i32, extract: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.bind(view_id, CheckedBinding::new(extract))
    }

    /// Bind `view_id` with custom update logic.
    pub fn bind_with<F>(self, view_id: i32, update: F) -> Self
    where
        F: Fn(&mut ViewTree, ViewId, &T) -> BindResult + Send + Sync + 'static,
    {
        self.bind(view_id, FnBinding::new(update))
    }

    /// Insert a shared binding, returning the one it replaces.
    pub fn insert(&mut self, view_id: i32, binding: SharedFieldBinding<T>) -> Option<SharedFieldBinding<T>> {
        self.bindings.insert(view_id, binding)
    }

    /// Remove the binding for `view_id`.
    pub fn remove(&mut self, view_id: i32) -> Option<SharedFieldBinding<T>> {
        self.bindings.remove(&view_id)
    }
}

impl<T> BindingSpec<T> {
    /// Get the binding for `view_id`.
    pub fn get(&self, view_id: i32) -> Option<&SharedFieldBinding<T>> {
        self.bindings.get(&view_id)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bound view ids, ascending.
    pub fn view_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.bindings.keys().copied()
    }

    /// Iterate over `(view_id, binding)` pairs, ascending by id.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &SharedFieldBinding<T>)> + '_ {
        self.bindings.iter().map(|(&id, binding)| (id, binding))
    }
}

impl<T: 'static> Default for BindingSpec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BindingSpec<T> {
    fn clone(&self) -> Self {
        Self {
            bindings: self.bindings.clone(),
        }
    }
}

impl<T> fmt::Debug for BindingSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingSpec")
            .field("view_ids", &self.bindings.keys().collect::<Vec<_>>())
            .finish()
    }
}
