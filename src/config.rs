use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;

use crate::auth::StaticAuthorization;
use crate::services::remote_book::{BookNamePattern, DEFAULT_REMOTE_BOOK_FOLDER};
use crate::services::webdav::WebDAVConfig;

#[derive(Clone, Debug)]
pub struct Config {
    pub webdav_server_url: String,
    pub webdav_username: Option<String>,
    pub webdav_password: Option<String>,
    pub webdav_server_type: Option<String>,
    pub webdav_timeout_seconds: u64,
    pub remote_book_folder: String,
    pub book_dir: PathBuf,
    pub content_root: PathBuf,
    pub book_extensions: Option<Vec<String>>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let webdav_server_url = non_empty("WEBDAV_SERVER_URL")
            .ok_or_else(|| anyhow!("WEBDAV_SERVER_URL must be set"))?;

        let webdav_timeout_seconds = match non_empty("WEBDAV_TIMEOUT_SECONDS") {
            Some(value) => value
                .parse()
                .map_err(|e| anyhow!("Invalid WEBDAV_TIMEOUT_SECONDS '{}': {}", value, e))?,
            None => 30,
        };

        Ok(Config {
            webdav_server_url,
            webdav_username: non_empty("WEBDAV_USERNAME"),
            webdav_password: lookup("WEBDAV_PASSWORD").filter(|v| !v.is_empty()),
            webdav_server_type: non_empty("WEBDAV_SERVER_TYPE").map(|s| s.to_lowercase()),
            webdav_timeout_seconds,
            remote_book_folder: non_empty("REMOTE_BOOK_FOLDER")
                .unwrap_or_else(|| DEFAULT_REMOTE_BOOK_FOLDER.to_string()),
            book_dir: PathBuf::from(non_empty("BOOK_DIR").unwrap_or_else(|| "./books".to_string())),
            content_root: PathBuf::from(non_empty("CONTENT_ROOT").unwrap_or_else(|| "./content".to_string())),
            book_extensions: non_empty("BOOK_EXTENSIONS").map(|s| {
                s.split(',')
                    .map(|ext| ext.trim().to_lowercase())
                    .filter(|ext| !ext.is_empty())
                    .collect()
            }),
        })
    }

    pub fn webdav_config(&self) -> WebDAVConfig {
        WebDAVConfig {
            server_url: self.webdav_server_url.clone(),
            username: self.webdav_username.clone().unwrap_or_default(),
            timeout_seconds: self.webdav_timeout_seconds,
            server_type: self.webdav_server_type.clone(),
        }
    }

    pub fn authorization(&self) -> StaticAuthorization {
        StaticAuthorization::from_parts(self.webdav_username.clone(), self.webdav_password.clone())
    }

    pub fn book_pattern(&self) -> Result<BookNamePattern> {
        match &self.book_extensions {
            Some(extensions) => BookNamePattern::from_extensions(extensions),
            None => Ok(BookNamePattern::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthorizationProvider;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("WEBDAV_SERVER_URL", "https://dav.example.com/dav/")])).unwrap();

        assert_eq!(config.remote_book_folder, "books");
        assert_eq!(config.webdav_timeout_seconds, 30);
        assert_eq!(config.book_dir, PathBuf::from("./books"));
        assert!(config.book_extensions.is_none());
        assert!(config.authorization().current_credential().is_none());
        assert!(config.book_pattern().unwrap().matches("a.epub"));
    }

    #[test]
    fn test_missing_server_url_is_an_error() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn test_full_configuration() {
        let config = Config::from_lookup(lookup(&[
            ("WEBDAV_SERVER_URL", "https://cloud.example.com"),
            ("WEBDAV_USERNAME", "reader"),
            ("WEBDAV_PASSWORD", "secret"),
            ("WEBDAV_SERVER_TYPE", "Nextcloud"),
            ("WEBDAV_TIMEOUT_SECONDS", "5"),
            ("REMOTE_BOOK_FOLDER", "library"),
            ("BOOK_EXTENSIONS", "EPUB, pdf"),
        ]))
        .unwrap();

        assert_eq!(
            config.webdav_config().webdav_url(),
            "https://cloud.example.com/remote.php/dav/files/reader"
        );
        assert_eq!(config.webdav_config().timeout_seconds, 5);
        assert_eq!(config.remote_book_folder, "library");
        assert!(config.authorization().current_credential().is_some());

        let pattern = config.book_pattern().unwrap();
        assert!(pattern.matches("a.pdf"));
        assert!(!pattern.matches("a.txt"));
    }

    #[test]
    fn test_invalid_timeout() {
        let result = Config::from_lookup(lookup(&[
            ("WEBDAV_SERVER_URL", "https://dav.example.com"),
            ("WEBDAV_TIMEOUT_SECONDS", "soon"),
        ]));
        assert!(result.is_err());
    }
}
