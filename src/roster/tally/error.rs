use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error type covering the failure cases that can occur while records are
/// loaded, imported, persisted, or exported.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the durable store cannot be opened or is corrupt.
    #[error("cannot open record database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Errors raised by the durable store once it is open.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Raised when a namespace name is not a plain SQL identifier.
    #[error("invalid namespace '{0}'")]
    InvalidNamespace(String),

    /// Raised when a bridge operation runs before a namespace is selected.
    #[error("no namespace selected")]
    NamespaceNotSelected,

    /// Raised when a persisted payload cannot be turned back into a record.
    #[error("cannot decode record '{id}': {reason}")]
    Decode { id: String, reason: String },

    /// Raised when import headers do not map onto the configured roles.
    #[error("import format is invalid: {0}")]
    ImportFormat(String),

    /// Raised when a mutation is requested before the persisted records are
    /// loaded.
    #[error("records are not loaded yet")]
    NotLoaded,

    /// Raised when an import source carries no rows at all.
    #[error("imported data is empty")]
    EmptyImport,

    /// Raised when the column/region configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
