//! End-to-end runs against mocked HTTP services
//!
//! Wires the real `HttpIpSource` and `CloudflareProvider` into `DdnsEngine`
//! and counts the requests each run makes.

use cf_ddns_core::config::DdnsConfig;
use cf_ddns_core::traits::UpdateResult;
use cf_ddns_core::{DdnsEngine, Error};
use cf_ddns_ip_http::HttpIpSource;
use cf_ddns_provider_cloudflare::CloudflareProvider;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ZONE: &str = "023e105f4ecef8ad9ca31a8372d0c353";
const RECORD: &str = "home.example.com";

fn config_for(echo: &MockServer, cloudflare: &MockServer) -> DdnsConfig {
    let mut config = DdnsConfig::new("e2e-token-0123456789", ZONE, RECORD);
    config.ip_source.url = format!("{}/ip", echo.uri());
    config.provider.api_base = format!("{}/client/v4", cloudflare.uri());
    config
}

fn engine_for(config: &DdnsConfig) -> DdnsEngine {
    let ip_source = HttpIpSource::from_config(&config.ip_source).unwrap();
    let provider = CloudflareProvider::from_config(&config.provider).unwrap();
    DdnsEngine::new(Box::new(ip_source), Box::new(provider), config).unwrap()
}

async fn mount_echo(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_lookup(server: &MockServer, content: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/client/v4/zones/{}/dns_records", ZONE)))
        .and(query_param("name", RECORD))
        .and(query_param("type", "A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": [{
                "id": "rec-42",
                "name": RECORD,
                "type": "A",
                "content": content,
                "proxied": false,
                "ttl": 1
            }]
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn unchanged_ip_makes_no_write() {
    let echo = MockServer::start().await;
    let cloudflare = MockServer::start().await;

    mount_echo(&echo, 200, "203.0.113.7\n").await;
    mount_lookup(&cloudflare, "203.0.113.7").await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&cloudflare)
        .await;

    let config = config_for(&echo, &cloudflare);
    let result = engine_for(&config).run_once().await.unwrap();

    assert!(matches!(result, UpdateResult::Unchanged { .. }));
}

#[tokio::test]
async fn changed_ip_makes_exactly_one_write() {
    let echo = MockServer::start().await;
    let cloudflare = MockServer::start().await;

    mount_echo(&echo, 200, "203.0.113.7").await;
    mount_lookup(&cloudflare, "198.51.100.1").await;
    Mock::given(method("PUT"))
        .and(path(format!("/client/v4/zones/{}/dns_records/rec-42", ZONE)))
        .and(body_partial_json(serde_json::json!({ "content": "203.0.113.7" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": { "id": "rec-42", "content": "203.0.113.7" }
        })))
        .expect(1)
        .mount(&cloudflare)
        .await;

    let config = config_for(&echo, &cloudflare);
    let result = engine_for(&config).run_once().await.unwrap();

    assert_eq!(
        result,
        UpdateResult::Updated {
            previous_ip: Some("198.51.100.1".parse().unwrap()),
            new_ip: "203.0.113.7".parse().unwrap(),
        }
    );
}

#[tokio::test]
async fn echo_failure_fails_run_without_touching_cloudflare() {
    let echo = MockServer::start().await;
    let cloudflare = MockServer::start().await;

    mount_echo(&echo, 502, "bad gateway").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&cloudflare)
        .await;

    let config = config_for(&echo, &cloudflare);
    let err = engine_for(&config).run_once().await.unwrap_err();

    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn cloudflare_failure_fails_run() {
    let echo = MockServer::start().await;
    let cloudflare = MockServer::start().await;

    mount_echo(&echo, 200, "203.0.113.7").await;
    mount_lookup(&cloudflare, "198.51.100.1").await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&cloudflare)
        .await;

    let config = config_for(&echo, &cloudflare);
    let err = engine_for(&config).run_once().await.unwrap_err();

    assert!(matches!(err, Error::Api { status: Some(500), .. }));
}
