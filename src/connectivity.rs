use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

/// Reports whether the network is currently usable
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_network_available(&self) -> bool;
}

/// Probes reachability by opening a TCP connection to the WebDAV host
#[derive(Debug, Clone)]
pub struct TcpConnectivity {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpConnectivity {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Targets the host and port of `server_url`
    pub fn for_server(server_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let url = Url::parse(server_url)?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("Server URL '{}' has no host", server_url))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| anyhow::anyhow!("Server URL '{}' has no port", server_url))?;
        Ok(Self::new(host, port, timeout))
    }
}

#[async_trait]
impl Connectivity for TcpConnectivity {
    async fn is_network_available(&self) -> bool {
        let address = (self.host.as_str(), self.port);
        match timeout(self.timeout, TcpStream::connect(address)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!("Connectivity probe to {}:{} failed: {}", self.host, self.port, e);
                false
            }
            Err(_) => {
                debug!("Connectivity probe to {}:{} timed out", self.host, self.port);
                false
            }
        }
    }
}

/// Connectivity that never reports an outage
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

#[async_trait]
impl Connectivity for AlwaysOnline {
    async fn is_network_available(&self) -> bool {
        true
    }
}
