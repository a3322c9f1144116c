/// Coarse classification of failures so the UI can pick its messaging
/// without matching on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotConfigured,
    NetworkUnavailable,
    Transport,
    LocalStorage,
    InvalidInput,
}

/// Common trait for all custom error types in the crate
pub trait AppError: std::error::Error + Send + Sync + 'static {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get the error code for frontend handling
    fn error_code(&self) -> &'static str;

    /// Get the kind used to choose user-facing messaging
    fn kind(&self) -> ErrorKind;

    /// Get optional suggested action for the user
    fn suggested_action(&self) -> Option<String> {
        None
    }
}

// Submodules for entity-specific errors
pub mod remote_book;

pub use remote_book::RemoteBookError;
