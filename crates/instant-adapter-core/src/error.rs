//! Error types for the view tree and layout inflation.

use std::path::PathBuf;

/// Result type for view tree operations.
pub type ViewResult<T> = std::result::Result<T, ViewError>;

/// Errors that can occur during view tree operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// The view handle is invalid or the view has been destroyed.
    #[error("Invalid or destroyed view handle")]
    InvalidViewId,

    /// Attempted to make a view its own parent or ancestor.
    #[error("Cannot set a view as its own parent or ancestor")]
    CircularParentage,

    /// A tag exists under the key but holds a different type.
    #[error("Tag {key} holds a value of a different type than {expected}")]
    TagTypeMismatch {
        /// The tag key that was looked up.
        key: i32,
        /// The type name the caller asked for.
        expected: &'static str,
    },
}

/// Errors that can occur while inflating or loading layouts.
#[derive(Debug, thiserror::Error)]
pub enum InflateError {
    /// No layout is registered under the given resource id.
    #[error("No layout registered for resource id {0:#x}")]
    UnknownLayout(i32),

    /// A layout file could not be read.
    #[error("Failed to read layout resources from {}: {source}", .path.display())]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A layout declaration could not be parsed.
    #[error("Failed to parse layout resources: {0}")]
    Parse(#[from] toml::de::Error),

    /// The layout declares the same resource id twice.
    #[error("Layout resource id {0:#x} is declared more than once")]
    DuplicateLayout(i32),

    /// The view tree rejected an operation during inflation.
    #[error("View tree error during inflation: {0}")]
    View(#[from] ViewError),
}

impl InflateError {
    /// Returns the layout id involved in the error, if any.
    pub fn layout_id(&self) -> Option<i32> {
        match self {
            Self::UnknownLayout(id) | Self::DuplicateLayout(id) => Some(*id),
            _ => None,
        }
    }
}
