// # HTTP IP Source
//
// This crate provides an IP source backed by a plain-text IP-echo service
// (e.g., api.ipify.org, ifconfig.me/ip, icanhazip.com).
//
// ## Behavior
//
// - One GET per call to `current()`
// - Transport failures → `Error::Network`
// - Non-2xx responses → `Error::Api` with the status
// - Bodies that don't parse as an IP (after trimming) → `Error::InvalidResponse`
// - No caching, no polling, no retry

use cf_ddns_core::config::{IpSourceConfig, IpVersion};
use cf_ddns_core::traits::IpSource;
use cf_ddns_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Name used in errors and logs
const SERVICE_NAME: &str = "ip-echo";

/// Request timeout for the echo service
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// IP source that asks an HTTP echo service for the caller's address
#[derive(Debug)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// IP version to accept
    version: IpVersion,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://api.ipify.org")
    /// - `version`: IP version to accept
    pub fn new(url: impl Into<String>, version: IpVersion) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .user_agent(concat!("cf-ddns/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            version,
            client,
        })
    }

    /// Create from configuration
    pub fn from_config(config: &IpSourceConfig) -> Result<Self> {
        Self::new(config.url.clone(), config.version)
    }

    /// URL this source queries
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parse and filter an echo-service body
    fn parse_body(&self, body: &str) -> Result<IpAddr> {
        let ip_text = body.trim();

        let ip: IpAddr = ip_text.parse().map_err(|_| {
            Error::invalid_response(SERVICE_NAME, format!("Invalid IP address: {:?}", ip_text))
        })?;

        if !self.version.accepts(&ip) {
            return Err(Error::invalid_response(
                SERVICE_NAME,
                format!("Expected {:?} address, got: {}", self.version, ip),
            ));
        }

        Ok(ip)
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<IpAddr> {
        tracing::debug!("Fetching current IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(SERVICE_NAME, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::api(
                SERVICE_NAME,
                Some(status.as_u16()),
                format!("{} returned {}", self.url, status),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(SERVICE_NAME, format!("Failed to read response: {}", e)))?;

        self.parse_body(&body)
    }

    fn version(&self) -> IpVersion {
        self.version
    }

    fn source_name(&self) -> &str {
        &self.url
    }
}
