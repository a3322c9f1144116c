// Re-export all model types for ease of use

pub mod book;
pub mod remote;

// Re-export commonly used types
pub use book::*;
pub use remote::*;
