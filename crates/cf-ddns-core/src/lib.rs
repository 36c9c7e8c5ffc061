// # cf-ddns-core
//
// Core library for the scheduled Cloudflare IP updater.
//
// ## Architecture Overview
//
// One run of the updater is a linear sequence:
//
// 1. **IpSource** reports the caller's current public IP
// 2. **DnsProvider** looks up the configured record
// 3. **DdnsEngine** compares the two and asks the provider to write only
//    when they differ
//
// Scheduling is not part of this library. The CI platform invokes the
// binary once per run and reads the exit status.
//
// ## Design Principles
//
// 1. **Separation of Concerns**: the engine decides, sources and providers only do I/O
// 2. **Fail Fast**: every error is fatal to the run, nothing is retried here
// 3. **Library-First**: the binary is a thin wrapper around `DdnsEngine`

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider};
pub use engine::DdnsEngine;
pub use config::{DdnsConfig, IpSourceConfig, ProviderConfig, RunMode};
pub use error::{Error, Result};
