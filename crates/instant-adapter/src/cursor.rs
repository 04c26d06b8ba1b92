//! Cursor-backed adapter.
//!
//! A [`Cursor`] is a table of rows with named columns. [`InstantCursorAdapter`]
//! binds one [`CursorRow`] per row view. Column bindings look their column up
//! by name once per row view and keep the index in the view's [`Holder`].
//!
//! ```
//! use std::sync::Arc;
//! use instant_adapter::{BindingSpec, Cursor, HandlerSpec, InstantCursorAdapter, ListAdapter};
//! use instant_adapter_core::{LayoutNode, LayoutRegistry, NO_ID, ViewTree};
//!
//! const ROW: i32 = 0x7f030001;
//! const TITLE: i32 = 0x7f050001;
//!
//! let mut layouts = LayoutRegistry::new();
//! layouts.register(ROW, LayoutNode::new("LinearLayout", NO_ID).with_child(LayoutNode::new("TextView", TITLE)));
//!
//! let cursor = Cursor::new(["_id", "title"])
//!     .with_row(vec![7.into(), "Dune".into()])
//!     .unwrap();
//! let adapter = InstantCursorAdapter::new(
//!     Arc::new(layouts),
//!     ROW,
//!     BindingSpec::new().column_text(TITLE, "title"),
//!     HandlerSpec::new(),
//!     Some(cursor),
//! )
//! .unwrap();
//!
//! let mut tree = ViewTree::new();
//! let list = tree.create_view("ListView", NO_ID);
//! let row = adapter.get_view(&mut tree, 0, None, list).unwrap();
//! let title = tree.find_view_by_id(row, TITLE).unwrap().unwrap();
//! assert_eq!(tree.text(title).unwrap(), Some("Dune"));
//! assert_eq!(adapter.item_id(0), 7);
//! ```

use std::sync::Arc;

use instant_adapter_core::{LayoutInflater, ViewId, ViewTree};
use parking_lot::RwLock;

use crate::adapter::ListAdapter;
use crate::adapter_core::InstantAdapterCore;
use crate::binding::{BindingSpec, FieldBinding};
use crate::cache::Holder;
use crate::config::AdapterConfig;
use crate::error::{AdapterError, AdapterResult, BindResult};
use crate::handler::HandlerSpec;
use crate::value::{FieldValue, TextFormat};

/// Name of the column holding stable row ids.
pub const ID_COLUMN: &str = "_id";

/// Errors raised by cursors and column bindings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// A row was added with the wrong number of values.
    #[error("Row has {actual} values but the cursor has {expected} columns")]
    ColumnCountMismatch { expected: usize, actual: usize },

    /// A binding refers to a column the cursor does not have.
    #[error("Cursor has no column named '{0}'")]
    UnknownColumn(String),
}

/// Rows of field values under a fixed set of named columns.
#[derive(Debug, Clone)]
pub struct Cursor {
    columns: Arc<[String]>,
    rows: Vec<Arc<[FieldValue]>>,
}

impl Cursor {
    /// Create an empty cursor with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row.
    pub fn add_row(&mut self, values: Vec<FieldValue>) -> Result<&mut Self, CursorError> {
        if values.len() != self.columns.len() {
            return Err(CursorError::ColumnCountMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        self.rows.push(values.into());
        Ok(self)
    }

    /// Append a row, builder style.
    pub fn with_row(mut self, values: Vec<FieldValue>) -> Result<Self, CursorError> {
        self.add_row(values)?;
        Ok(self)
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Index of the column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the cursor has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `position`.
    pub fn row(&self, position: usize) -> Option<CursorRow> {
        self.rows.get(position).map(|values| CursorRow {
            columns: Arc::clone(&self.columns),
            values: Arc::clone(values),
        })
    }
}

/// One row of a [`Cursor`]. Cheap to clone.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorRow {
    columns: Arc<[String]>,
    values: Arc<[FieldValue]>,
}

impl CursorRow {
    /// Index of the column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// The value in column `index`.
    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index)
    }

    /// The value in the column called `name`.
    pub fn get_by_name(&self, name: &str) -> Option<&FieldValue> {
        self.column_index(name).and_then(|index| self.get(index))
    }
}

/// Sets a view's text from a named cursor column.
///
/// The column index is resolved when the view is first cached for a row view
/// and reused for every later bind of that row view.
#[derive(Debug, Clone)]
pub struct ColumnTextBinding {
    column: String,
    format: TextFormat,
}

impl ColumnTextBinding {
    /// Create a column binding.
    pub fn new(column: impl Into<String>, format: TextFormat) -> Self {
        Self {
            column: column.into(),
            format,
        }
    }

    /// The bound column name.
    pub fn column(&self) -> &str {
        &self.column
    }
}

impl FieldBinding<CursorRow> for ColumnTextBinding {
    fn auxiliary(&self, item: &CursorRow) -> Option<usize> {
        item.column_index(&self.column)
    }

    fn update(&self, tree: &mut ViewTree, view: ViewId, holder: &Holder, item: &CursorRow) -> BindResult {
        let value = holder
            .aux()
            .and_then(|index| item.get(index))
            .ok_or_else(|| CursorError::UnknownColumn(self.column.clone()))?;
        tree.set_text(view, self.format.apply(value)?)?;
        Ok(())
    }
}

impl BindingSpec<CursorRow> {
    /// Bind `view_id` to the displayed form of `column`.
    pub fn column_text(self, view_id: i32, column: impl Into<String>) -> Self {
        self.bind(view_id, ColumnTextBinding::new(column, TextFormat::Display))
    }

    /// Bind `view_id` to `column` rendered with `format`.
    pub fn column_text_formatted(self, view_id: i32, column: impl Into<String>, format: TextFormat) -> Self {
        self.bind(view_id, ColumnTextBinding::new(column, format))
    }
}

/// Adapter binding the rows of a [`Cursor`] to rows of one layout.
///
/// Row views cache column indices, so a swapped-in cursor is expected to keep
/// the column layout of the one it replaces.
pub struct InstantCursorAdapter {
    core: InstantAdapterCore<CursorRow>,
    cursor: RwLock<Option<Cursor>>,
}

impl InstantCursorAdapter {
    /// Create an adapter with the default configuration.
    pub fn new(
        inflater: Arc<dyn LayoutInflater>,
        layout_id: i32,
        bindings: BindingSpec<CursorRow>,
        handlers: HandlerSpec<CursorRow>,
        cursor: Option<Cursor>,
    ) -> AdapterResult<Self> {
        Self::with_config(inflater, layout_id, bindings, handlers, cursor, AdapterConfig::default())
    }

    /// Create an adapter with an explicit configuration.
    pub fn with_config(
        inflater: Arc<dyn LayoutInflater>,
        layout_id: i32,
        bindings: BindingSpec<CursorRow>,
        handlers: HandlerSpec<CursorRow>,
        cursor: Option<Cursor>,
        config: AdapterConfig,
    ) -> AdapterResult<Self> {
        Ok(Self {
            core: InstantAdapterCore::with_config(inflater, layout_id, bindings, handlers, config)?,
            cursor: RwLock::new(cursor),
        })
    }

    /// The core that creates and binds rows.
    pub fn core(&self) -> &InstantAdapterCore<CursorRow> {
        &self.core
    }

    /// Mutable access to the core.
    pub fn core_mut(&mut self) -> &mut InstantAdapterCore<CursorRow> {
        &mut self.core
    }

    /// Replace the cursor, returning the old one.
    pub fn swap_cursor(&self, cursor: Option<Cursor>) -> Option<Cursor> {
        let old = std::mem::replace(&mut *self.cursor.write(), cursor);
        tracing::debug!(
            target: "instant_adapter::adapter",
            rows = self.count(),
            "swapped cursor"
        );
        old
    }

    /// The row at `position` of the current cursor.
    pub fn row(&self, position: usize) -> Option<CursorRow> {
        self.cursor.read().as_ref().and_then(|cursor| cursor.row(position))
    }

    /// Create a new, unbound row view.
    pub fn new_view(&self, tree: &mut ViewTree, parent: ViewId) -> AdapterResult<ViewId> {
        self.core.create_row(tree, parent)
    }

    /// Bind the cursor row at `position` to `row`.
    pub fn bind_view(&self, tree: &mut ViewTree, parent: ViewId, row: ViewId, position: usize) -> AdapterResult<()> {
        let item = self.row(position).ok_or(AdapterError::PositionOutOfRange {
            position,
            count: self.count(),
        })?;
        self.core.bind_row(self, tree, parent, row, &item, position)
    }

    /// Produce the row view for `position`, reusing `convert_view` if it is a
    /// row of this adapter. A row created by this call is destroyed again if
    /// binding fails.
    pub fn get_view(
        &self,
        tree: &mut ViewTree,
        position: usize,
        convert_view: Option<ViewId>,
        parent: ViewId,
    ) -> AdapterResult<ViewId> {
        let item = self.row(position).ok_or(AdapterError::PositionOutOfRange {
            position,
            count: self.count(),
        })?;

        match convert_view {
            Some(row) if self.core.owns_row(tree, row) => {
                self.core.bind_row(self, tree, parent, row, &item, position)?;
                Ok(row)
            }
            _ => {
                let row = self.new_view(tree, parent)?;
                self.core.bind_new_row(self, tree, parent, row, &item, position)
            }
        }
    }
}

impl ListAdapter for InstantCursorAdapter {
    fn count(&self) -> usize {
        self.cursor.read().as_ref().map_or(0, Cursor::len)
    }

    fn item_id(&self, position: usize) -> u64 {
        self.row(position)
            .and_then(|row| row.get_by_name(ID_COLUMN).and_then(FieldValue::as_int))
            .and_then(|id| u64::try_from(id).ok())
            .unwrap_or(position as u64)
    }

    fn has_stable_ids(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for InstantCursorAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstantCursorAdapter")
            .field("core", &self.core)
            .field("rows", &self.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instant_adapter_core::{LayoutNode, LayoutRegistry, NO_ID};

    const ROW: i32 = 0x7f03_0002;
    const TITLE: i32 = 0x7f05_0010;
    const YEAR: i32 = 0x7f05_0011;

    fn books() -> Cursor {
        Cursor::new(["_id", "title", "year"])
            .with_row(vec![11.into(), "Dune".into(), 1965.into()])
            .unwrap()
            .with_row(vec![12.into(), "Solaris".into(), FieldValue::Null])
            .unwrap()
    }

    fn adapter(bindings: BindingSpec<CursorRow>, cursor: Option<Cursor>) -> InstantCursorAdapter {
        let mut layouts = LayoutRegistry::new();
        layouts.register(
            ROW,
            LayoutNode::new("LinearLayout", NO_ID)
                .with_child(LayoutNode::new("TextView", TITLE))
                .with_child(LayoutNode::new("TextView", YEAR)),
        );
        InstantCursorAdapter::new(Arc::new(layouts), ROW, bindings, HandlerSpec::new(), cursor).unwrap()
    }

    fn text_of(tree: &ViewTree, row: ViewId, id: i32) -> Option<String> {
        let view = tree.find_view_by_id(row, id).unwrap()?;
        tree.text(view).unwrap().map(str::to_owned)
    }

    #[test]
    fn test_cursor_rows() {
        let mut cursor = books();
        assert_eq!(cursor.len(), 2);
        assert_eq!(cursor.column_index("year"), Some(2));

        let row = cursor.row(1).unwrap();
        assert_eq!(row.get_by_name("title"), Some(&FieldValue::from("Solaris")));
        assert_eq!(row.get_by_name("missing"), None);
        assert!(cursor.row(2).is_none());

        let err = cursor.add_row(vec![1.into()]).unwrap_err();
        assert_eq!(err, CursorError::ColumnCountMismatch { expected: 3, actual: 1 });
    }

    #[test]
    fn test_column_bindings_cache_index() {
        let bindings = BindingSpec::new()
            .column_text(TITLE, "title")
            .column_text_formatted(YEAR, "year", TextFormat::pattern("({})"));
        let adapter = adapter(bindings, Some(books()));

        let mut tree = ViewTree::new();
        let list = tree.create_view("ListView", NO_ID);
        let row = adapter.get_view(&mut tree, 0, None, list).unwrap();
        assert_eq!(text_of(&tree, row, TITLE).as_deref(), Some("Dune"));
        assert_eq!(text_of(&tree, row, YEAR).as_deref(), Some("(1965)"));

        let cache = adapter.core().cache(&tree, row).unwrap();
        assert_eq!(cache.get(TITLE).unwrap().aux(), Some(1));
        assert_eq!(cache.get(YEAR).unwrap().aux(), Some(2));

        adapter.get_view(&mut tree, 1, Some(row), list).unwrap();
        assert_eq!(text_of(&tree, row, TITLE).as_deref(), Some("Solaris"));
        assert_eq!(text_of(&tree, row, YEAR).as_deref(), Some(""));
    }

    #[test]
    fn test_unknown_column_fails_bind() {
        let adapter = adapter(BindingSpec::new().column_text(TITLE, "author"), Some(books()));
        let mut tree = ViewTree::new();
        let list = tree.create_view("ListView", NO_ID);

        let err = adapter.get_view(&mut tree, 0, None, list).unwrap_err();
        assert!(matches!(err, AdapterError::Binding { view_id: TITLE, .. }));
        assert!(err.to_string().contains("no column named 'author'"));
        assert_eq!(tree.view_count(), 1);
    }

    #[test]
    fn test_get_view_out_of_range_creates_nothing() {
        let adapter = adapter(BindingSpec::new().column_text(TITLE, "title"), None);
        let mut tree = ViewTree::new();
        let list = tree.create_view("ListView", NO_ID);

        let err = adapter.get_view(&mut tree, 0, None, list).unwrap_err();
        assert!(matches!(err, AdapterError::PositionOutOfRange { position: 0, count: 0 }));
        assert_eq!(tree.view_count(), 1);
    }

    #[test]
    fn test_ids_and_swap() {
        let adapter = adapter(BindingSpec::new().column_text(TITLE, "title"), None);
        assert_eq!(adapter.count(), 0);
        assert!(adapter.has_stable_ids());

        assert!(adapter.swap_cursor(Some(books())).is_none());
        assert_eq!(adapter.count(), 2);
        assert_eq!(adapter.item_id(1), 12);
        assert_eq!(adapter.item_id(5), 5);

        let old = adapter.swap_cursor(None).unwrap();
        assert_eq!(old.len(), 2);
        assert!(adapter.is_empty());
    }

    #[test]
    fn test_bind_view_out_of_range() {
        let adapter = adapter(BindingSpec::new(), Some(books()));
        let mut tree = ViewTree::new();
        let list = tree.create_view("ListView", NO_ID);
        let row = adapter.new_view(&mut tree, list).unwrap();

        let err = adapter.bind_view(&mut tree, list, row, 9).unwrap_err();
        assert!(matches!(err, AdapterError::PositionOutOfRange { position: 9, count: 2 }));
    }
}
