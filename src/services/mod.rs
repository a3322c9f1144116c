pub mod remote_book;
pub mod webdav;
