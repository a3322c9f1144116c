use std::time::Duration;

/// WebDAV server configuration
#[derive(Debug, Clone)]
pub struct WebDAVConfig {
    pub server_url: String,
    /// Only used to build the Nextcloud files root; credentials come from the authorization provider
    pub username: String,
    pub timeout_seconds: u64,
    pub server_type: Option<String>, // "nextcloud", "owncloud", "generic"
}

/// Retry configuration for WebDAV operations
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub rate_limit_backoff_ms: u64, // Additional backoff for 429 responses
    pub max_rate_limit_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000, // 1 second
            max_delay_ms: 30000,    // 30 seconds
            backoff_multiplier: 2.0,
            rate_limit_backoff_ms: 5000, // 5 seconds
            max_rate_limit_retries: 5,
        }
    }
}

impl RetryConfig {
    /// Retry policy that fails on the first error
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            max_rate_limit_retries: 0,
            ..Self::default()
        }
    }
}

impl WebDAVConfig {
    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server_url.is_empty() {
            return Err(anyhow::anyhow!("Server URL cannot be empty"));
        }

        // Validate URL format
        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(anyhow::anyhow!("Server URL must start with http:// or https://"));
        }

        if self.server_type.as_deref() == Some("nextcloud") && self.username.is_empty() {
            return Err(anyhow::anyhow!("Nextcloud servers require a username to locate the files root"));
        }

        Ok(())
    }

    /// Returns the base URL for WebDAV operations
    pub fn webdav_url(&self) -> String {
        let mut url = self.server_url.trim_end_matches('/').to_string();

        // Add WebDAV path based on server type
        match self.server_type.as_deref() {
            Some("nextcloud") => {
                if !url.contains("/remote.php/dav/files/") {
                    url.push_str(&format!("/remote.php/dav/files/{}", self.username));
                }
            }
            Some("owncloud") => {
                if !url.contains("/remote.php/webdav") {
                    url.push_str("/remote.php/webdav");
                }
            }
            _ => {
                // Generic WebDAV - use the URL as provided
            }
        }

        url
    }

    /// Gets the timeout duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(server_type: Option<&str>) -> WebDAVConfig {
        WebDAVConfig {
            server_url: "https://nas.example.com/".to_string(),
            username: "reader".to_string(),
            timeout_seconds: 30,
            server_type: server_type.map(str::to_string),
        }
    }

    #[test]
    fn test_webdav_url_by_server_type() {
        assert_eq!(
            config(Some("nextcloud")).webdav_url(),
            "https://nas.example.com/remote.php/dav/files/reader"
        );
        assert_eq!(config(Some("owncloud")).webdav_url(), "https://nas.example.com/remote.php/webdav");
        assert_eq!(config(None).webdav_url(), "https://nas.example.com");
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let mut bad = config(None);
        bad.server_url = "ftp://nas.example.com".to_string();
        assert!(bad.validate().is_err());
        assert!(config(None).validate().is_ok());
    }

    #[test]
    fn test_nextcloud_requires_username() {
        let mut cfg = config(Some("nextcloud"));
        cfg.username.clear();
        assert!(cfg.validate().is_err());
    }
}
