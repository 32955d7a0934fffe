use std::path::PathBuf;
use thiserror::Error;

/// Result type for shotrename operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for shotrename operations
///
/// Directory-level variants abort a rename pass before anything is touched.
/// Filename variants are raised per entry and end up as failure strings in a
/// [`RenameOutcome`](crate::RenameOutcome) rather than propagating.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configured directory does not exist
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// The configured path exists but is not a directory
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The directory cannot be listed
    #[error("No read permission: {}", .0.display())]
    NoReadPermission(PathBuf),

    /// Entries in the directory cannot be renamed
    #[error("No write permission: {}", .0.display())]
    NoWritePermission(PathBuf),

    /// The path resolves outside every whitelisted directory
    #[error("Directory not in whitelist: {}", .0.display())]
    OutsideWhitelist(PathBuf),

    /// Empty or whitespace-only filename
    #[error("Filename cannot be empty")]
    EmptyFilename,

    /// Filename rejected by sanitization
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    /// No free destination name could be found
    #[error("No available filename for {0}")]
    CollisionExhausted(String),

    /// File watching errors
    #[error("Watcher error: {0}")]
    Watcher(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an invalid filename error
    pub fn invalid_filename(reason: impl Into<String>) -> Self {
        Self::InvalidFilename(reason.into())
    }

    /// Creates a watcher error
    pub fn watcher(msg: impl Into<String>) -> Self {
        Self::Watcher(msg.into())
    }

    /// Adds context to any error
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error rejects the directory as a whole
    pub fn is_directory_error(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound(_)
                | Self::NotADirectory(_)
                | Self::NoReadPermission(_)
                | Self::NoWritePermission(_)
                | Self::OutsideWhitelist(_)
        )
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::with_context(context, e))
    }
}
