// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of `DnsProvider`.
//
// ## Behavior
//
// - One HTTP request per trait call, no retry, no backoff
// - HTTP timeout configured (30 seconds)
// - Specific error messages for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - `success: false` envelopes are errors even on HTTP 200
// - Dry-run mode: lookups are real, writes are only logged
// - TTL and proxy settings are preserved on update
//
// ## Security Requirements
//
// - API token NEVER appears in logs, errors or `Debug` output
// - Provider construction fails if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=...`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`

use async_trait::async_trait;
use cf_ddns_core::config::{DEFAULT_API_BASE, ProviderConfig, RunMode};
use cf_ddns_core::traits::{DnsProvider, RecordMetadata, RecordType};
use cf_ddns_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Provider name used in errors and logs
const PROVIDER_NAME: &str = "cloudflare";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// TTL value Cloudflare treats as "automatic"
const AUTOMATIC_TTL: u32 = 1;

/// Cloudflare API v4 response envelope
#[derive(Debug, Deserialize)]
struct CloudflareResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<CloudflareMessage>,
    result: Option<T>,
}

/// Entry of the envelope's `errors` list
#[derive(Debug, Deserialize)]
struct CloudflareMessage {
    code: i64,
    message: String,
}

/// Error-only view of an envelope, used for non-2xx bodies
#[derive(Debug, Deserialize)]
struct CloudflareErrorBody {
    #[serde(default)]
    errors: Vec<CloudflareMessage>,
}

/// DNS record as returned by the API
#[derive(Debug, Deserialize)]
struct DnsRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    record_type: RecordType,
    content: String,
    ttl: Option<u32>,
    proxied: Option<bool>,
}

impl From<DnsRecord> for RecordMetadata {
    fn from(record: DnsRecord) -> Self {
        RecordMetadata {
            id: record.id,
            name: record.name,
            record_type: record.record_type,
            content: record.content,
            ttl: record.ttl,
            proxied: record.proxied,
        }
    }
}

/// Body for PUT and POST on `dns_records`
#[derive(Debug, Serialize)]
struct RecordPayload<'a> {
    #[serde(rename = "type")]
    record_type: RecordType,
    name: &'a str,
    content: String,
    ttl: u32,
    proxied: bool,
}

fn join_errors(errors: &[CloudflareMessage]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Cloudflare DNS provider
///
/// Stateless and single-shot: every trait call is one API request.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests
/// - Log the intended PUT/POST payload
/// - **NOT** modify DNS records
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Zone the record lives in
    zone_id: String,

    /// API base URL, without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip writes
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("api_base", &self.api_base)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider against the public API
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    /// - `zone_id`: Zone the record lives in
    /// - `dry_run`: If true, perform GET requests but skip writes
    pub fn new(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        dry_run: bool,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .user_agent(concat!("cf-ddns/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            zone_id: zone_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            client,
            dry_run,
        })
    }

    /// Create a provider from configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let provider = Self::new(
            config.api_token.clone(),
            config.zone_id.clone(),
            config.mode == RunMode::DryRun,
        )?
        .with_api_base(config.api_base.clone());

        if provider.dry_run {
            tracing::warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(provider)
    }

    /// Point the provider at a different API base (proxies, tests)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether writes are suppressed
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn records_url(&self) -> String {
        format!("{}/zones/{}/dns_records", self.api_base, self.zone_id)
    }

    /// Send an authenticated request and unwrap the response envelope
    ///
    /// Only a lookup treats 404 as "not found"; a 404 on a write keeps its
    /// status as an API error.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        action: Action,
    ) -> Result<T> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::network(PROVIDER_NAME, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network(PROVIDER_NAME, format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<CloudflareErrorBody>(&body)
                .ok()
                .filter(|b| !b.errors.is_empty())
                .map(|b| join_errors(&b.errors))
                .unwrap_or(body);
            let code = Some(status.as_u16());

            return Err(match status.as_u16() {
                401 | 403 => Error::api(
                    PROVIDER_NAME,
                    code,
                    format!("Authentication failed: Invalid API token or insufficient permissions ({})", detail),
                ),
                404 if action == Action::Lookup => {
                    Error::not_found(format!("{}: zone or record not found ({})", action, detail))
                }
                409 => Error::api(
                    PROVIDER_NAME,
                    code,
                    format!("Conflict: Record is being updated by another process ({})", detail),
                ),
                429 => Error::api(
                    PROVIDER_NAME,
                    code,
                    format!("Rate limit exceeded ({})", detail),
                ),
                500..=599 => Error::api(
                    PROVIDER_NAME,
                    code,
                    format!("Cloudflare server error (transient): {}", detail),
                ),
                _ => Error::api(PROVIDER_NAME, code, format!("{} failed: {}", action, detail)),
            });
        }

        let envelope: CloudflareResponse<T> = serde_json::from_str(&body).map_err(|e| {
            Error::invalid_response(PROVIDER_NAME, format!("Failed to parse response: {}", e))
        })?;

        if !envelope.success {
            return Err(Error::api(
                PROVIDER_NAME,
                None,
                format!("{} failed: {}", action, join_errors(&envelope.errors)),
            ));
        }

        envelope.result.ok_or_else(|| {
            Error::invalid_response(PROVIDER_NAME, "Invalid response format: missing result")
        })
    }

    fn payload(name: &str, ip: IpAddr, ttl: u32, proxied: bool) -> RecordPayload<'_> {
        RecordPayload {
            record_type: RecordType::for_ip(&ip),
            name,
            content: ip.to_string(),
            ttl,
            proxied,
        }
    }
}

/// Request kinds, for error mapping and messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Lookup,
    Update,
    Create,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Lookup => f.write_str("Record lookup"),
            Action::Update => f.write_str("Record update"),
            Action::Create => f.write_str("Record creation"),
        }
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// Look up a record by name and type
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?name=home.example.com&type=A
    /// Authorization: Bearer <token>
    /// ```
    async fn get_record(
        &self,
        record_name: &str,
        record_type: RecordType,
    ) -> Result<Option<RecordMetadata>> {
        tracing::debug!("Looking up record: {} (type: {})", record_name, record_type);

        let request = self
            .client
            .get(self.records_url())
            .query(&[("name", record_name), ("type", record_type.as_str())]);

        let records: Vec<DnsRecord> = self.send(request, Action::Lookup).await?;

        let record = records.into_iter().next().map(RecordMetadata::from);
        match &record {
            Some(r) => tracing::debug!("Found record ID: {} (content: {})", r.id, r.content),
            None => tracing::debug!("No {} record named {}", record_type, record_name),
        }

        Ok(record)
    }

    /// Overwrite an existing record's content
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// { "type": "A", "name": "...", "content": "1.2.3.4", "ttl": 1, "proxied": false }
    /// ```
    async fn update_record(&self, record: &RecordMetadata, new_ip: IpAddr) -> Result<()> {
        let url = format!("{}/{}", self.records_url(), record.id);
        let payload = Self::payload(
            &record.name,
            new_ip,
            record.ttl.unwrap_or(AUTOMATIC_TTL),
            record.proxied.unwrap_or(false),
        );

        tracing::info!(
            "{} DNS record: {} -> {} (was: {}) [mode: {}]",
            if self.dry_run { "Would update" } else { "Updating" },
            record.name,
            new_ip,
            record.content,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                serde_json::to_string(&payload).unwrap_or_default()
            );
            return Ok(());
        }

        let _: serde_json::Value = self
            .send(self.client.put(&url).json(&payload), Action::Update)
            .await?;

        tracing::info!("DNS record updated successfully: {} -> {}", record.name, new_ip);
        Ok(())
    }

    /// Create a new address record with automatic TTL, unproxied
    ///
    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// ```
    async fn create_record(&self, record_name: &str, ip: IpAddr) -> Result<RecordMetadata> {
        let payload = Self::payload(record_name, ip, AUTOMATIC_TTL, false);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send POST request to {} with payload: {}",
                self.records_url(),
                serde_json::to_string(&payload).unwrap_or_default()
            );
            return Ok(RecordMetadata {
                id: String::new(),
                name: record_name.to_string(),
                record_type: payload.record_type,
                content: payload.content,
                ttl: Some(payload.ttl),
                proxied: Some(payload.proxied),
            });
        }

        let created: DnsRecord = self
            .send(
                self.client.post(self.records_url()).json(&payload),
                Action::Create,
            )
            .await?;

        tracing::info!("DNS record created: {} -> {} (id: {})", created.name, ip, created.id);
        Ok(created.into())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
