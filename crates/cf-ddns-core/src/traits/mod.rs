//! Core traits for the IP updater
//!
//! This module defines the abstract interfaces the engine drives.
//!
//! - [`IpSource`]: Report the caller's current public IP
//! - [`DnsProvider`]: Read and write a DNS record via a provider API

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use dns_provider::{DnsProvider, RecordMetadata, RecordType, UpdateResult};
