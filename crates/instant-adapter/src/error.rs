//! Error types for the binding layer.

use instant_adapter_core::{InflateError, ViewError, ViewId};

/// Error returned by user-supplied field bindings and view handlers.
pub type BindError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of one field binding or view handler invocation.
pub type BindResult = std::result::Result<(), BindError>;

/// Result type alias for adapter operations.
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Errors that can occur while creating or binding rows.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The adapter was constructed with an invalid or unknown layout.
    #[error("Invalid adapter configuration: {message}")]
    Configuration { message: String },

    /// Layout inflation failed.
    #[error("Layout inflation failed: {0}")]
    Inflate(#[from] InflateError),

    /// The view tree rejected an operation.
    #[error("View tree error: {0}")]
    View(#[from] ViewError),

    /// The row view was not created by this adapter.
    #[error("Row view {row:?} carries no recycle cache for layout {layout_id:#x}")]
    MissingCache { row: ViewId, layout_id: i32 },

    /// A field binding reported a failure.
    #[error("Field binding for view {view_id:#x} failed: {source}")]
    Binding {
        view_id: i32,
        #[source]
        source: BindError,
    },

    /// A view handler reported a failure.
    #[error("View handler for view {view_id:#x} failed: {source}")]
    Handler {
        view_id: i32,
        #[source]
        source: BindError,
    },

    /// The requested position has no backing item.
    #[error("Position {position} is out of range for {count} items")]
    PositionOutOfRange { position: usize, count: usize },
}

impl AdapterError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns `true` for [`AdapterError::Configuration`].
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// Errors that can occur while loading an [`AdapterConfig`](crate::AdapterConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read adapter configuration from {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML source could not be parsed.
    #[error("Failed to parse adapter configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
