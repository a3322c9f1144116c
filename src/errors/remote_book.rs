use thiserror::Error;

use super::{AppError, ErrorKind};

/// Errors surfaced by remote book managers
#[derive(Error, Debug)]
pub enum RemoteBookError {
    #[error("Remote storage is not configured")]
    NotConfigured,

    #[error("Network is unavailable")]
    NetworkUnavailable,

    #[error("WebDAV {operation} failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("Local storage {operation} failed: {source}")]
    LocalStorage {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid book source '{book_url}'")]
    InvalidBookSource { book_url: String },
}

impl RemoteBookError {
    pub fn transport(operation: &'static str, source: anyhow::Error) -> Self {
        Self::Transport { operation, source }
    }

    pub fn local_storage(operation: &'static str, source: anyhow::Error) -> Self {
        Self::LocalStorage { operation, source }
    }
}

impl AppError for RemoteBookError {
    fn user_message(&self) -> String {
        match self {
            RemoteBookError::NotConfigured => "remote storage not configured".to_string(),
            RemoteBookError::NetworkUnavailable => "network unavailable".to_string(),
            RemoteBookError::Transport { operation, .. } => {
                format!("Remote {} failed, please try again later", operation)
            }
            RemoteBookError::LocalStorage { operation, .. } => {
                format!("Could not {} the local book", operation)
            }
            RemoteBookError::InvalidBookSource { .. } => "The book file location is invalid".to_string(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RemoteBookError::NotConfigured => "REMOTE_NOT_CONFIGURED",
            RemoteBookError::NetworkUnavailable => "REMOTE_NETWORK_UNAVAILABLE",
            RemoteBookError::Transport { .. } => "REMOTE_TRANSPORT_FAILED",
            RemoteBookError::LocalStorage { .. } => "REMOTE_LOCAL_STORAGE_FAILED",
            RemoteBookError::InvalidBookSource { .. } => "REMOTE_INVALID_BOOK_SOURCE",
        }
    }

    fn kind(&self) -> ErrorKind {
        match self {
            RemoteBookError::NotConfigured => ErrorKind::NotConfigured,
            RemoteBookError::NetworkUnavailable => ErrorKind::NetworkUnavailable,
            RemoteBookError::Transport { .. } => ErrorKind::Transport,
            RemoteBookError::LocalStorage { .. } => ErrorKind::LocalStorage,
            RemoteBookError::InvalidBookSource { .. } => ErrorKind::InvalidInput,
        }
    }

    fn suggested_action(&self) -> Option<String> {
        match self {
            RemoteBookError::NotConfigured => {
                Some("Set the WebDAV server URL, username and password".to_string())
            }
            RemoteBookError::NetworkUnavailable => Some("Check your network connection".to_string()),
            _ => None,
        }
    }
}
