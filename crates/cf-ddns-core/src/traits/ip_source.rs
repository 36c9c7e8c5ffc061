// # IP Source Trait
//
// Defines the interface for determining the caller's current public IP.
//
// ## Implementations
//
// - HTTP IP-echo service: `cf-ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use cf_ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let current_ip = source.current().await?;
//     println!("Current IP: {current_ip}");
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

use crate::config::IpVersion;

/// Trait for IP source implementations
///
/// One call to [`IpSource::current`] per run. Implementations must not
/// cache between calls or retry internally: a failed lookup fails the run
/// and the next scheduled run is the retry.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The current IP address
    /// - `Err(Error)`: Network failure, non-2xx response, or an unparsable body
    async fn current(&self) -> Result<IpAddr, crate::Error>;

    /// Get the IP version this source reports
    ///
    /// Returns [`IpVersion::Both`] when either version may come back.
    fn version(&self) -> IpVersion {
        IpVersion::Both
    }

    /// Short name for logging
    fn source_name(&self) -> &str;
}
