// # DNS Provider Trait
//
// Defines the interface for reading and writing DNS records via provider APIs.
//
// ## Implementations
//
// - Cloudflare: `cf-ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use cf_ddns_core::traits::{DnsProvider, RecordType};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     if let Some(record) = provider.get_record("home.example.com", RecordType::A).await? {
//         provider.update_record(&record, "203.0.113.7".parse()?).await?;
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Result of one updater run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// Record was successfully updated
    Updated {
        /// The previous IP address, if the old content parsed as one
        previous_ip: Option<IpAddr>,
        /// The new IP address
        new_ip: IpAddr,
    },
    /// Record already had the correct IP (no-op)
    Unchanged {
        /// The current IP address
        current_ip: IpAddr,
    },
    /// Record was created (didn't exist before)
    Created {
        /// The created IP address
        new_ip: IpAddr,
    },
}

/// DNS record type for address records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    Aaaa,
}

impl RecordType {
    /// Record type that holds `ip`
    pub fn for_ip(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::Aaaa,
        }
    }

    /// Wire name ("A" or "AAAA")
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata about a DNS record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMetadata {
    /// The record ID (provider-specific)
    pub id: String,
    /// The record name
    pub name: String,
    /// The record type
    pub record_type: RecordType,
    /// The record content as stored by the provider
    pub content: String,
    /// Time-to-live for the record
    pub ttl: Option<u32>,
    /// Whether the provider proxies traffic for this record
    pub proxied: Option<bool>,
}

impl RecordMetadata {
    /// The record content as an IP address, if it parses as one
    pub fn ip(&self) -> Option<IpAddr> {
        self.content.trim().parse().ok()
    }
}

/// Trait for DNS provider implementations
///
/// Providers perform API calls and nothing else. Whether an update is
/// needed is decided by `DdnsEngine`, never by the provider.
///
/// # Forbidden
///
/// - Retry logic or backoff (a failed run is retried by the next schedule)
/// - Comparing the current and new IP
/// - Caching records between calls
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Look up a DNS record
    ///
    /// # Returns
    ///
    /// - `Ok(Some(RecordMetadata))`: The record exists
    /// - `Ok(None)`: No record with this name and type
    /// - `Err(Error)`: The request failed
    async fn get_record(
        &self,
        record_name: &str,
        record_type: RecordType,
    ) -> Result<Option<RecordMetadata>, crate::Error>;

    /// Point an existing record at a new IP address
    ///
    /// Settings other than the content (TTL, proxying) are carried over
    /// from `record`.
    async fn update_record(
        &self,
        record: &RecordMetadata,
        new_ip: IpAddr,
    ) -> Result<(), crate::Error>;

    /// Create a new address record
    ///
    /// The record type follows the IP version of `ip`.
    async fn create_record(
        &self,
        record_name: &str,
        ip: IpAddr,
    ) -> Result<RecordMetadata, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
