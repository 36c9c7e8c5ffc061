//! Core updater engine
//!
//! The DdnsEngine is responsible for:
//! - Asking the IpSource for the current IP
//! - Looking up the configured record via DnsProvider
//! - Deciding whether an update is needed
//! - Issuing at most one write per run
//!
//! ## Run Flow
//!
//! ```text
//! ┌─────────────┐   current()   ┌──────────────┐  get_record()  ┌──────────────┐
//! │  IpSource   │──────────────▶│  DdnsEngine  │───────────────▶│ DnsProvider  │
//! └─────────────┘               └──────────────┘                └──────────────┘
//!                                      │   differs?                      ▲
//!                                      └──── update_record() ────────────┘
//! ```
//!
//! Any error ends the run. There is no retry here: the CI schedule runs the
//! task again next time.

use crate::config::DdnsConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, IpSource, RecordType, UpdateResult};
use tracing::{debug, info, warn};

/// Core updater engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Call [`DdnsEngine::run_once()`]
/// 3. Map the result to an exit status
pub struct DdnsEngine {
    /// IP source for the current address
    ip_source: Box<dyn IpSource>,

    /// DNS provider for the record
    provider: Box<dyn DnsProvider>,

    /// DNS record to manage
    record_name: String,

    /// Create the record when the lookup finds nothing
    create_missing: bool,
}

impl DdnsEngine {
    /// Create a new engine
    ///
    /// The configuration is validated here, so a bad config is rejected
    /// before either collaborator is called.
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: &DdnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ip_source,
            provider,
            record_name: config.record_name.clone(),
            create_missing: config.provider.create_missing,
        })
    }

    /// Run the update once
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateResult)`: What happened to the record
    /// - `Err(Error)`: The first failure, unmodified
    pub async fn run_once(&self) -> Result<UpdateResult> {
        let new_ip = self.ip_source.current().await?;
        let version = self.ip_source.version();
        if !version.accepts(&new_ip) {
            return Err(Error::invalid_response(
                self.ip_source.source_name(),
                format!("Expected {:?} address, got: {}", version, new_ip),
            ));
        }
        info!(
            "Current IP from {}: {}",
            self.ip_source.source_name(),
            new_ip
        );

        let record_type = RecordType::for_ip(&new_ip);
        let existing = self
            .provider
            .get_record(&self.record_name, record_type)
            .await?;

        let Some(record) = existing else {
            if !self.create_missing {
                return Err(Error::not_found(format!(
                    "{} (type: {}) does not exist in {}",
                    self.record_name,
                    record_type,
                    self.provider.provider_name()
                )));
            }

            info!("Creating record {} ({}) -> {}", self.record_name, record_type, new_ip);
            self.provider.create_record(&self.record_name, new_ip).await?;
            return Ok(UpdateResult::Created { new_ip });
        };

        let previous_ip = record.ip();
        if previous_ip == Some(new_ip) {
            info!(
                "Record {} already has IP {}, skipping update",
                self.record_name, new_ip
            );
            return Ok(UpdateResult::Unchanged { current_ip: new_ip });
        }

        if previous_ip.is_none() {
            warn!(
                "Record {} content '{}' is not an IP address, overwriting",
                self.record_name, record.content
            );
        }

        debug!("Record {} has id {}", self.record_name, record.id);
        info!(
            "Updating {} -> {} (previous: {})",
            self.record_name, new_ip, record.content
        );
        self.provider.update_record(&record, new_ip).await?;

        Ok(UpdateResult::Updated { previous_ip, new_ip })
    }
}
