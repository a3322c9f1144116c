// WebDAV transport modules organized by functionality

pub mod config;
pub mod connection;
pub mod transport;
pub mod url_management;

// Re-export main types for convenience
pub use config::{WebDAVConfig, RetryConfig};
pub use connection::{WebDAVConnection, HttpStatusError, error_status};
pub use transport::{BookStream, HttpWebDavTransport, WebDavTransport};
pub use url_management::{WebDAVUrlManager, join_segment, same_resource};
