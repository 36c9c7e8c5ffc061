// # cf-ddns - scheduled Cloudflare IP updater
//
// Thin integration layer. All update logic lives in cf-ddns-core; this
// binary only:
// 1. Reads configuration from environment variables
// 2. Initializes logging and the runtime
// 3. Wires the HTTP IP source and Cloudflare provider into the engine
// 4. Runs the engine once and turns the outcome into an exit code
//
// Scheduling is the CI platform's job (see .github/workflows/update-dns.yml).
//
// ## Configuration
//
// ### Required
// - `CLOUDFLARE_API_TOKEN`: API token with Zone:DNS:Edit
// - `CLOUDFLARE_ZONE_ID`: Zone ID
// - `CLOUDFLARE_RECORD_NAME`: Record to update (e.g., home.example.com)
//
// ### Optional
// - `CLOUDFLARE_API_BASE`: API base URL
// - `CF_DDNS_IP_SOURCE_URL`: IP-echo service (default https://api.ipify.org,
//   or https://api6.ipify.org with v6)
// - `CF_DDNS_IP_VERSION`: v4, v6 or both
// - `CF_DDNS_CREATE_MISSING`: create the record if it does not exist
// - `CF_DDNS_MODE`: live or dry-run
// - `CF_DDNS_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export CLOUDFLARE_API_TOKEN=...
// export CLOUDFLARE_ZONE_ID=023e105f4ecef8ad9ca31a8372d0c353
// export CLOUDFLARE_RECORD_NAME=home.example.com
//
// cf-ddns
// ```

use anyhow::Result;
use cf_ddns_core::config::RunMode;
use cf_ddns_core::traits::UpdateResult;
use cf_ddns_core::{DdnsConfig, DdnsEngine};
use cf_ddns_ip_http::HttpIpSource;
use cf_ddns_provider_cloudflare::CloudflareProvider;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes reported to the CI platform
///
/// - 0: Record is up to date
/// - 1: Configuration or startup error
/// - 2: Runtime error (network or API failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Run completed
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Network or API failure during the run
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl DdnsExitCode {
    /// Exit code for a failed run
    fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<cf_ddns_core::Error>() {
            Some(e) if e.is_config() => DdnsExitCode::ConfigError,
            _ => DdnsExitCode::RuntimeError,
        }
    }
}

fn parse_level(level: &str) -> Level {
    match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match DdnsConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&config.log_level))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting cf-ddns for record {}", config.record_name);

    // A single run needs no worker pool
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(&config).await {
            Ok(result) => {
                info!("{}", summary(&config.record_name, &result, config.provider.mode));
                DdnsExitCode::Success
            }
            Err(e) => {
                error!("Update failed: {:#}", e);
                DdnsExitCode::for_error(&e)
            }
        }
    });

    code.into()
}

/// Build the collaborators and run the engine once
async fn run(config: &DdnsConfig) -> Result<UpdateResult> {
    let ip_source = HttpIpSource::from_config(&config.ip_source)?;
    let provider = CloudflareProvider::from_config(&config.provider)?;

    let engine = DdnsEngine::new(Box::new(ip_source), Box::new(provider), config)?;
    Ok(engine.run_once().await?)
}

/// One-line outcome for the final log entry
///
/// A dry run reports the write it skipped, not one that happened.
fn summary(record_name: &str, result: &UpdateResult, mode: RunMode) -> String {
    let dry_run = mode == RunMode::DryRun;

    match result {
        UpdateResult::Updated { previous_ip, new_ip } => format!(
            "{} {} -> {} (previous: {}) [mode: {}]",
            if dry_run { "Would update" } else { "Updated" },
            record_name,
            new_ip,
            previous_ip.map(|ip| ip.to_string()).unwrap_or_else(|| "unknown".to_string()),
            mode
        ),
        UpdateResult::Unchanged { current_ip } => {
            format!("{} already points at {}, nothing to do", record_name, current_ip)
        }
        UpdateResult::Created { new_ip } => format!(
            "{} {} -> {} [mode: {}]",
            if dry_run { "Would create" } else { "Created" },
            record_name,
            new_ip,
            mode
        ),
    }
}
