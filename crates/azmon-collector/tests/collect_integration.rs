//! End-to-end collector runs against the scripted metric client
//!
//! These tests go through the same entry points as the `azmon` binary and
//! check the exact line that would be printed on stdout.

use azmon_collector::azure::context::build_http_client;
use azmon_collector::azure::{AccessToken, AzureContext, FromAzureContext, InventoryClient};
use azmon_collector::collect;
use azmon_collector::config::{DiscoverConfig, SampleConfig};
use azmon_collector::{Inventory, InventoryKind, Report};
use azmon_common::lld::{DiscoveryDocument, macro_key};
use azmon_common::{Aggregation, Component, Interval, Timespan};
use azmon_test_utils::fixtures::{cross_product, labelled_series, region_status_rows};
use azmon_test_utils::{ArmStub, FakeMetricClient, point, series};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

const RESOURCE: &str =
    "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.DocumentDB/databaseAccounts/db";

fn now() -> DateTime<Utc> {
    "2024-06-15T10:30:00Z".parse().unwrap()
}

fn sample_config(metric: &str, aggregation: Aggregation) -> SampleConfig {
    SampleConfig {
        metric: metric.to_string(),
        aggregation,
        interval: Interval::OneHour,
        timespan: None,
        filters: Vec::new(),
    }
}

fn discover_config(metric: Option<&str>, dimensions: &str) -> DiscoverConfig {
    DiscoverConfig {
        metric: metric.map(str::to_string),
        dimensions: dimensions.to_string(),
    }
}

async fn run_sample(
    client: &FakeMetricClient,
    component: Component,
    config: &SampleConfig,
) -> String {
    let outcome = collect::sample(client, RESOURCE, component, config, now()).await;
    Report::from_outcome(component, outcome).to_string()
}

async fn run_discover(
    client: &FakeMetricClient,
    component: Component,
    config: &DiscoverConfig,
) -> String {
    let outcome = collect::discover(client, RESOURCE, config).await;
    Report::from_outcome(component, outcome).to_string()
}

#[tokio::test]
async fn test_sample_prints_rounded_latest_value() {
    let client = FakeMetricClient::new().with_series(vec![series(vec![point(1.0), point(12.6)])]);
    let line = run_sample(
        &client,
        Component::CosmosDb,
        &sample_config("TotalRequests", Aggregation::Average),
    )
    .await;
    assert_eq!(line, "13");
}

#[tokio::test]
async fn test_sample_without_points_prints_component_code() {
    let client = FakeMetricClient::new().with_series(vec![series(vec![])]);
    let line = run_sample(
        &client,
        Component::CosmosDb,
        &sample_config("TotalRequests", Aggregation::Average),
    )
    .await;
    assert_eq!(line, "-27");
}

#[tokio::test]
async fn test_sample_without_series_prints_component_code() {
    let client = FakeMetricClient::new();
    let line = run_sample(
        &client,
        Component::StorageAccount,
        &sample_config("Transactions", Aggregation::Total),
    )
    .await;
    assert_eq!(line, "-7");
}

#[tokio::test]
async fn test_sample_scale_set_metric_name_is_spaced() {
    let client = FakeMetricClient::new().with_series(vec![series(vec![point(41.7)])]);
    let line = run_sample(
        &client,
        Component::Vmss,
        &sample_config("Percentage_CPU", Aggregation::Average),
    )
    .await;
    assert_eq!(line, "42");
    assert_eq!(client.queries()[0].metric, "Percentage CPU");
}

#[tokio::test]
async fn test_sample_transport_failure_prints_component_code() {
    let client = FakeMetricClient::new().fail_series("operation timed out");
    let line = run_sample(
        &client,
        Component::LoadBalancer,
        &sample_config("VipAvailability", Aggregation::Average),
    )
    .await;
    assert_eq!(line, "-16");
}

#[tokio::test]
async fn test_sample_query_follows_component_window_and_filters() {
    let client = FakeMetricClient::new().with_series(vec![labelled_series(
        &[("ApiName", "GetSecret")],
        vec![point(2.5)],
    )]);
    let config = SampleConfig {
        filters: vec![("ApiName".into(), "GetSecret".into())],
        ..sample_config("ServiceApiHit", Aggregation::Average)
    };

    let line = run_sample(&client, Component::KeyVault, &config).await;
    assert_eq!(line, "2");

    let queries = client.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].filter.to_string(), "ApiName eq 'GetSecret'");
    assert_eq!(
        queries[0].timespan.map(|t| t.to_string()).as_deref(),
        Some("2024-06-14T00:00:00Z/2024-06-15T10:30:00Z")
    );
}

#[tokio::test]
async fn test_sample_explicit_timespan_is_passed_through() {
    let client = FakeMetricClient::new().with_series(vec![series(vec![point(5.0)])]);
    let timespan: Timespan = "2024-01-01T00:00:00Z/2024-01-01T06:00:00Z".parse().unwrap();
    let config = SampleConfig {
        timespan: Some(timespan),
        ..sample_config("Requests", Aggregation::Average)
    };

    run_sample(&client, Component::Webapp, &config).await;
    assert_eq!(client.queries()[0].timespan, Some(timespan));
}

#[tokio::test]
async fn test_discover_prints_region_status_document() {
    let client = FakeMetricClient::new().with_rows(region_status_rows());
    let line = run_discover(
        &client,
        Component::Webapp,
        &discover_config(Some("Requests"), "Region+Status"),
    )
    .await;

    let doc = DiscoveryDocument::parse(&line).unwrap();
    let mut rows: Vec<_> = doc
        .data
        .iter()
        .map(|row| (row["{#REGION}"].clone(), row["{#STATUS}"].clone()))
        .collect();
    rows.sort();
    assert_eq!(
        rows,
        vec![
            ("east".to_string(), "ok".to_string()),
            ("west".to_string(), "fail".to_string()),
            ("west".to_string(), "ok".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_discover_keys_follow_requested_order() {
    let client =
        FakeMetricClient::new().with_rows(vec![vec![("status-code", "200"), ("Region", "east")]]);
    let line = run_discover(
        &client,
        Component::ApplicationGateway,
        &discover_config(Some("Requests"), "status-code+Region"),
    )
    .await;
    assert_eq!(line, r#"{"data":[{"{#STATUS_CODE}":"200","{#REGION}":"east"}]}"#);
}

#[tokio::test]
async fn test_discover_product_size_and_probe_count() {
    let rows = cross_product(vec![
        ("Tier", vec!["hot", "cool", "archive"]),
        ("ApiName", vec!["Get", "Put"]),
    ]);
    let client = FakeMetricClient::new().with_rows(rows);
    let line = run_discover(
        &client,
        Component::StorageAccount,
        &discover_config(Some("Transactions"), "Tier+ApiName"),
    )
    .await;

    let doc = DiscoveryDocument::parse(&line).unwrap();
    assert_eq!(doc.data.len(), 6);
    for row in &doc.data {
        assert_eq!(row.len(), 2);
        assert!(row.contains_key(&macro_key("Tier")));
        assert!(row.contains_key(&macro_key("ApiName")));
    }
    // 1 root probe + 3 per-tier probes
    assert_eq!(client.probe_count(), 4);
}

#[tokio::test]
async fn test_discover_without_dimensions_prints_one_empty_entry() {
    let client = FakeMetricClient::new().with_definition("Requests", &[]);
    let line = run_discover(&client, Component::Webapp, &discover_config(None, "")).await;
    assert_eq!(line, r#"{"data":[{}]}"#);
    assert_eq!(client.probe_count(), 0);
}

#[tokio::test]
async fn test_discover_failures_print_discovery_code() {
    // A level with no values
    let client = FakeMetricClient::new().with_rows(vec![vec![("Region", "east")]]);
    let line = run_discover(
        &client,
        Component::CosmosDb,
        &discover_config(Some("Requests"), "Region+Status"),
    )
    .await;
    assert_eq!(line, "-102");

    // No metric supporting the dimensions
    let client = FakeMetricClient::new().with_definition("Requests", &["Region"]);
    let line = run_discover(&client, Component::CosmosDb, &discover_config(None, "Status")).await;
    assert_eq!(line, "-102");

    // Repeated dimension
    let client = FakeMetricClient::new().with_rows(region_status_rows());
    let line = run_discover(
        &client,
        Component::CosmosDb,
        &discover_config(Some("Requests"), "Region+Region"),
    )
    .await;
    assert_eq!(line, "-102");
    assert_eq!(client.probe_count(), 0);
}

#[tokio::test]
async fn test_discover_definitions_failure_prints_discovery_code() {
    let client = FakeMetricClient::new().fail_definitions("service unavailable");
    let line = run_discover(&client, Component::Frontdoors, &discover_config(None, "Region")).await;
    assert_eq!(line, "-102");

    let line = run_discover(
        &client,
        Component::Frontdoors,
        &discover_config(Some("RequestCount"), ""),
    )
    .await;
    assert_eq!(line, "-102");
}

#[tokio::test]
async fn test_discover_unknown_metric_without_dimensions_prints_discovery_code() {
    let client = FakeMetricClient::new().with_definition("RequestCount", &[]);
    let line = run_discover(
        &client,
        Component::Frontdoors,
        &discover_config(Some("RequestCont"), ""),
    )
    .await;
    assert_eq!(line, "-102");

    let line = run_discover(
        &client,
        Component::Frontdoors,
        &discover_config(Some("requestcount"), ""),
    )
    .await;
    assert_eq!(line, r#"{"data":[{}]}"#);
}

#[tokio::test]
async fn test_discover_is_repeatable() {
    let client = FakeMetricClient::new().with_rows(region_status_rows());
    let config = discover_config(Some("Requests"), "Region+Status");

    let parse = |line: String| -> Vec<BTreeMap<String, String>> {
        let mut data = DiscoveryDocument::parse(&line).unwrap().data;
        data.sort();
        data
    };
    let first = parse(run_discover(&client, Component::Webapp, &config).await);
    let second = parse(run_discover(&client, Component::Webapp, &config).await);
    assert_eq!(first, second);
}

fn inventory_client(endpoint: &str) -> InventoryClient {
    let http = build_http_client(Duration::from_secs(5)).unwrap();
    let ctx = AzureContext::new(http, AccessToken::new("t"), "sub-1").with_endpoint(endpoint);
    InventoryClient::from_context(&ctx)
}

#[tokio::test]
async fn test_file_share_inventory_prints_file_systems() {
    let account = "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/st";
    let stub = ArmStub::new()
        .respond(
            &format!("{account}/fileServices"),
            r#"{"value":[{"id":"x/fileServices/default","name":"default"}]}"#,
        )
        .start()
        .await
        .unwrap();

    let inventory = Inventory::select(Component::FileShare, None).unwrap();
    let outcome = collect::inventory(&inventory_client(stub.endpoint()), account, inventory).await;
    assert_eq!(
        Report::from_outcome(Component::FileShare, outcome).to_string(),
        r#"{"data":[{"{#FILE_SYSTEM}":"default"}]}"#
    );
}

#[tokio::test]
async fn test_scale_set_cluster_inventory_needs_no_listing() {
    let scale_set =
        "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.Compute/virtualMachineScaleSets/web";
    let stub = ArmStub::new().start().await.unwrap();

    let inventory = Inventory::select(Component::Vmss, Some(InventoryKind::Cluster)).unwrap();
    let outcome = collect::inventory(&inventory_client(stub.endpoint()), scale_set, inventory).await;
    assert_eq!(
        Report::from_outcome(Component::Vmss, outcome).to_string(),
        format!(r#"{{"data":[{{"{{#VMSSNAME}}":"web","{{#RESOURCEID}}":"{scale_set}"}}]}}"#)
    );
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_session_host_prints_availability() {
    let pool = "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.DesktopVirtualization/hostPools/pool";
    let stub = ArmStub::new()
        .respond(
            &format!("{pool}/sessionHosts"),
            r#"{"value":[{"name":"pool/vm-1.corp.local","properties":{"status":"Available"}},
                         {"name":"pool/vm-2.corp.local","properties":{"status":"Shutdown"}}]}"#,
        )
        .start()
        .await
        .unwrap();
    let client = inventory_client(stub.endpoint());

    let line = |outcome| Report::from_outcome(Component::Wvd, outcome).to_string();
    assert_eq!(line(collect::session_host(&client, pool, "wvd.vm-1.corp").await), "1");
    assert_eq!(line(collect::session_host(&client, pool, "wvd.vm-2.corp").await), "0");
    assert_eq!(line(collect::session_host(&client, pool, "wvd.vm-9.corp").await), "-3");
    assert_eq!(line(collect::session_host(&client, pool, "no-alias").await), "-3");
}
