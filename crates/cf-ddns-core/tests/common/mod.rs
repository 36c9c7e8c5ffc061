//! Test doubles and common utilities for engine contract tests
//!
//! The doubles record every call so tests can assert on how many requests
//! a run would have made.

#![allow(dead_code)]

use cf_ddns_core::config::{DdnsConfig, IpVersion};
use cf_ddns_core::error::{Error, Result};
use cf_ddns_core::traits::{DnsProvider, IpSource, RecordMetadata, RecordType};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// How a fake collaborator should fail
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Network,
    Api(u16),
}

impl Failure {
    fn into_error(self, service: &str) -> Error {
        match self {
            Failure::Network => Error::network(service, "connection refused"),
            Failure::Api(status) => Error::api(service, Some(status), "request failed"),
        }
    }
}

/// An IpSource returning a fixed answer
pub struct StaticIpSource {
    answer: std::result::Result<IpAddr, Failure>,
    version: IpVersion,
    call_count: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            answer: Ok(ip),
            version: IpVersion::Both,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(failure: Failure) -> Self {
        Self {
            answer: Err(failure),
            version: IpVersion::Both,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Declare the version this source claims to report
    pub fn reporting(mut self, version: IpVersion) -> Self {
        self.version = version;
        self
    }

    /// Handle to the call counter, valid after the source is boxed
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.call_count)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<IpAddr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.answer.map_err(|failure| failure.into_error("ip-echo"))
    }

    fn version(&self) -> IpVersion {
        self.version
    }

    fn source_name(&self) -> &str {
        "static"
    }
}

/// Calls observed by a MockDnsProvider
#[derive(Debug, Default)]
pub struct ProviderCalls {
    pub lookups: Vec<(String, RecordType)>,
    pub updates: Vec<(String, IpAddr)>,
    pub creates: Vec<(String, IpAddr)>,
}

/// A mock DnsProvider holding at most one record
pub struct MockDnsProvider {
    record: Option<RecordMetadata>,
    lookup_failure: Option<Failure>,
    write_failure: Option<Failure>,
    calls: Arc<Mutex<ProviderCalls>>,
}

impl MockDnsProvider {
    /// Provider with no records
    pub fn empty() -> Self {
        Self {
            record: None,
            lookup_failure: None,
            write_failure: None,
            calls: Arc::new(Mutex::new(ProviderCalls::default())),
        }
    }

    /// Provider holding one record with the given content
    pub fn with_record(name: &str, record_type: RecordType, content: &str) -> Self {
        Self {
            record: Some(RecordMetadata {
                id: "rec-1".to_string(),
                name: name.to_string(),
                record_type,
                content: content.to_string(),
                ttl: Some(300),
                proxied: Some(false),
            }),
            ..Self::empty()
        }
    }

    pub fn failing_lookup(mut self, failure: Failure) -> Self {
        self.lookup_failure = Some(failure);
        self
    }

    pub fn failing_writes(mut self, failure: Failure) -> Self {
        self.write_failure = Some(failure);
        self
    }

    /// Handle to the call log, valid after the provider is boxed
    pub fn calls(&self) -> Arc<Mutex<ProviderCalls>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn get_record(
        &self,
        record_name: &str,
        record_type: RecordType,
    ) -> Result<Option<RecordMetadata>> {
        self.calls
            .lock()
            .unwrap()
            .lookups
            .push((record_name.to_string(), record_type));

        if let Some(failure) = self.lookup_failure {
            return Err(failure.into_error("mock"));
        }

        Ok(self
            .record
            .clone()
            .filter(|r| r.name == record_name && r.record_type == record_type))
    }

    async fn update_record(&self, record: &RecordMetadata, new_ip: IpAddr) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .updates
            .push((record.id.clone(), new_ip));

        match self.write_failure {
            Some(failure) => Err(failure.into_error("mock")),
            None => Ok(()),
        }
    }

    async fn create_record(&self, record_name: &str, ip: IpAddr) -> Result<RecordMetadata> {
        self.calls
            .lock()
            .unwrap()
            .creates
            .push((record_name.to_string(), ip));

        if let Some(failure) = self.write_failure {
            return Err(failure.into_error("mock"));
        }

        Ok(RecordMetadata {
            id: "rec-new".to_string(),
            name: record_name.to_string(),
            record_type: RecordType::for_ip(&ip),
            content: ip.to_string(),
            ttl: Some(1),
            proxied: Some(false),
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(record_name: &str) -> DdnsConfig {
    DdnsConfig::new(
        "test-token-0123456789abcdef",
        "023e105f4ecef8ad9ca31a8372d0c353",
        record_name,
    )
}

pub fn ip(s: &str) -> IpAddr {
    s.parse().expect("valid test IP")
}
