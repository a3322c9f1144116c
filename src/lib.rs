pub mod auth;
pub mod config;
pub mod connectivity;
pub mod errors;
pub mod models;
pub mod services;
pub mod storage;
pub mod webdav_xml_parser;

pub use errors::{AppError, ErrorKind, RemoteBookError};
pub use services::remote_book::{RemoteBookManager, RemoteBookWebDav};
