//! Configuration types for the IP updater
//!
//! All configuration comes from environment variables. [`DdnsConfig::from_lookup`]
//! takes the lookup as a function so tests never touch the process
//! environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Cloudflare API token (required)
pub const ENV_API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";
/// Cloudflare zone ID (required)
pub const ENV_ZONE_ID: &str = "CLOUDFLARE_ZONE_ID";
/// Fully-qualified record name (required)
pub const ENV_RECORD_NAME: &str = "CLOUDFLARE_RECORD_NAME";
/// Cloudflare API base URL
pub const ENV_API_BASE: &str = "CLOUDFLARE_API_BASE";
/// IP-echo service URL
pub const ENV_IP_SOURCE_URL: &str = "CF_DDNS_IP_SOURCE_URL";
/// IP version accepted from the echo service
pub const ENV_IP_VERSION: &str = "CF_DDNS_IP_VERSION";
/// Create the record when it does not exist
pub const ENV_CREATE_MISSING: &str = "CF_DDNS_CREATE_MISSING";
/// `live` or `dry-run`
pub const ENV_MODE: &str = "CF_DDNS_MODE";
/// Log level for the binary
pub const ENV_LOG_LEVEL: &str = "CF_DDNS_LOG_LEVEL";

/// Cloudflare API v4 base URL
pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Plain-text IP-echo service used when none is configured (answers over IPv4 only)
pub const DEFAULT_IP_SOURCE_URL: &str = "https://api.ipify.org";

/// IPv6-only echo service, the default when only v6 is accepted
pub const DEFAULT_IP6_SOURCE_URL: &str = "https://api6.ipify.org";

/// Main updater configuration
#[derive(Debug, Clone)]
pub struct DdnsConfig {
    /// IP source configuration
    pub ip_source: IpSourceConfig,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// DNS record to keep up to date (e.g., "home.example.com")
    pub record_name: String,

    /// Log level name
    pub log_level: String,
}

impl DdnsConfig {
    /// Create a configuration with defaults for everything but the required values
    pub fn new(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        record_name: impl Into<String>,
    ) -> Self {
        Self {
            ip_source: IpSourceConfig::default(),
            provider: ProviderConfig::new(api_token, zone_id),
            record_name: record_name.into(),
            log_level: "info".to_string(),
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, crate::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Blank values count as unset. Required variables are checked first so a
    /// missing token, zone or record is reported before anything else.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, crate::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                crate::Error::config(format!(
                    "{key} is required. Set it via: export {key}=..."
                ))
            })
        };

        let api_token = require(ENV_API_TOKEN)?;
        let zone_id = require(ENV_ZONE_ID)?;
        let record_name = require(ENV_RECORD_NAME)?;

        let mut config = Self::new(api_token, zone_id, record_name);

        if let Some(base) = get(ENV_API_BASE) {
            config.provider.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(mode) = get(ENV_MODE) {
            config.provider.mode = mode.parse()?;
        }
        if let Some(flag) = get(ENV_CREATE_MISSING) {
            config.provider.create_missing = parse_bool(ENV_CREATE_MISSING, &flag)?;
        }
        if let Some(version) = get(ENV_IP_VERSION) {
            config.ip_source.version = version.parse()?;
        }
        config.ip_source.url = get(ENV_IP_SOURCE_URL)
            .unwrap_or_else(|| config.ip_source.version.default_source_url().to_string());
        if let Some(level) = get(ENV_LOG_LEVEL) {
            config.log_level = level.to_lowercase();
        }

        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Runs before any network call so setup mistakes fail the job early
    /// with a readable message.
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.ip_source.validate()?;
        validate_domain_name(&self.record_name)?;

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(crate::Error::config(format!(
                    "{ENV_LOG_LEVEL} '{other}' is not valid. \
                    Valid levels: trace, debug, info, warn, error"
                )));
            }
        }

        Ok(())
    }
}

/// IP source configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpSourceConfig {
    /// URL returning the caller's IP as plain text
    pub url: String,

    /// IP version to accept
    pub version: IpVersion,
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_http_url(ENV_IP_SOURCE_URL, &self.url)?;

        if self.version == IpVersion::V6 && self.url == DEFAULT_IP_SOURCE_URL {
            return Err(crate::Error::config(format!(
                "{ENV_IP_VERSION}=v6 cannot work with {DEFAULT_IP_SOURCE_URL}, which only \
                answers over IPv4. Set {ENV_IP_SOURCE_URL} to an IPv6 echo service \
                (e.g., {DEFAULT_IP6_SOURCE_URL})"
            )));
        }

        Ok(())
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_IP_SOURCE_URL.to_string(),
            version: IpVersion::Both,
        }
    }
}

/// IP version to accept from the IP source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    /// IPv4 only
    V4,
    /// IPv6 only
    V6,
    /// Either version
    #[default]
    Both,
}

impl IpVersion {
    /// Whether `ip` is acceptable under this filter
    pub fn accepts(&self, ip: &IpAddr) -> bool {
        match self {
            IpVersion::V4 => ip.is_ipv4(),
            IpVersion::V6 => ip.is_ipv6(),
            IpVersion::Both => true,
        }
    }

    /// Echo service to use when no URL is configured
    pub fn default_source_url(&self) -> &'static str {
        match self {
            IpVersion::V6 => DEFAULT_IP6_SOURCE_URL,
            IpVersion::V4 | IpVersion::Both => DEFAULT_IP_SOURCE_URL,
        }
    }
}

impl FromStr for IpVersion {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "v4" | "ipv4" | "4" => Ok(IpVersion::V4),
            "v6" | "ipv6" | "6" => Ok(IpVersion::V6),
            "both" | "any" => Ok(IpVersion::Both),
            other => Err(crate::Error::config(format!(
                "{ENV_IP_VERSION} '{other}' is not supported. Supported values: v4, v6, both"
            ))),
        }
    }
}

/// Whether the provider is allowed to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Perform lookups and writes
    #[default]
    Live,
    /// Perform lookups, log the writes that would have been made
    DryRun,
}

impl FromStr for RunMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "live" => Ok(RunMode::Live),
            "dry-run" | "dry_run" | "dryrun" => Ok(RunMode::DryRun),
            other => Err(crate::Error::config(format!(
                "{ENV_MODE} '{other}' is not supported. Supported modes: live, dry-run"
            ))),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Live => f.write_str("LIVE"),
            RunMode::DryRun => f.write_str("DRY-RUN"),
        }
    }
}

/// Cloudflare provider configuration
#[derive(Clone)]
pub struct ProviderConfig {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// Zone ID the record lives in
    pub zone_id: String,

    /// API base URL, without trailing slash
    pub api_base: String,

    /// Create the record when the lookup finds nothing
    pub create_missing: bool,

    /// Live or dry-run
    pub mode: RunMode,
}

impl ProviderConfig {
    /// Create a live provider configuration against the public API
    pub fn new(api_token: impl Into<String>, zone_id: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            zone_id: zone_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            create_missing: false,
            mode: RunMode::Live,
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_token.trim().is_empty() {
            return Err(crate::Error::config(format!("{ENV_API_TOKEN} cannot be empty")));
        }

        // Check for obvious placeholder tokens (common mistake)
        let token_lower = self.api_token.to_lowercase();
        if token_lower.contains("your_token")
            || token_lower.contains("replace_me")
            || token_lower == "token"
        {
            return Err(crate::Error::config(format!(
                "{ENV_API_TOKEN} appears to be a placeholder. \
                Use an actual API token with Zone:DNS:Edit permission."
            )));
        }

        if self.zone_id.is_empty() {
            return Err(crate::Error::config(format!("{ENV_ZONE_ID} cannot be empty")));
        }
        if !self.zone_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(crate::Error::config(format!(
                "{ENV_ZONE_ID} must be alphanumeric. Got: {}",
                self.zone_id
            )));
        }

        validate_http_url(ENV_API_BASE, &self.api_base)
    }

    /// Whether writes are suppressed
    pub fn is_dry_run(&self) -> bool {
        self.mode == RunMode::DryRun
    }
}

// Custom Debug implementation that hides the API token
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("api_base", &self.api_base)
            .field("create_missing", &self.create_missing)
            .field("mode", &self.mode)
            .finish()
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, crate::Error> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(crate::Error::config(format!(
            "{key} must be true or false. Got: {other}"
        ))),
    }
}

fn validate_http_url(key: &str, url: &str) -> Result<(), crate::Error> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(crate::Error::config(format!(
            "{key} must use HTTP or HTTPS scheme. Got: {url}"
        )))
    }
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks: total length, label length, characters and
/// hyphen placement. Not exhaustive, but catches the usual typos.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    // A fully-qualified name may end in the root dot
    let labels = domain.strip_suffix('.').unwrap_or(domain);

    for label in labels.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain name has empty label: '{domain}'"
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(crate::Error::config(format!(
                "Domain label contains invalid characters. Label: '{label}'. \
                Valid: alphanumeric, hyphen and underscore only."
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Domain label cannot start or end with hyphen. Label: '{label}'"
            )));
        }
    }

    Ok(())
}
