//! HTTP transport and resource service tests against a mock Service.

use std::time::Duration;

use honeybadger_mcp_server::api::dashboards::DashboardRequest;
use honeybadger_mcp_server::api::faults::{FaultListOptions, FaultOrder};
use honeybadger_mcp_server::api::projects::{OccurrenceOptions, Period, ProjectRequest};
use honeybadger_mcp_server::api::types::{Listing, UpdateOutcome};
use honeybadger_mcp_server::api::{ApiClient, RequestErrorKind};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{basic_auth, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::test_helpers::{test_config, TEST_TOKEN};

fn client_for(service: &MockServer) -> ApiClient {
    ApiClient::new(&test_config(&service.uri(), false)).expect("api client")
}

// ── Transport ────────────────────────────────────────────

#[tokio::test]
async fn requests_carry_auth_and_json_headers_under_v2() {
    let service = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/projects/7"))
        .and(basic_auth(TEST_TOKEN, ""))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "name": "web"})))
        .expect(1)
        .mount(&service)
        .await;

    let project = client_for(&service)
        .projects
        .get(&CancellationToken::new(), 7)
        .await
        .expect("project");
    assert_eq!(project.name, "web");
}

#[tokio::test]
async fn api_error_carries_status_message_and_body() {
    let service = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/projects/1"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"errors": "You are not authorized"})),
        )
        .mount(&service)
        .await;

    let err = client_for(&service)
        .projects
        .get(&CancellationToken::new(), 1)
        .await
        .expect_err("403 is an error");

    assert_eq!(err.kind, RequestErrorKind::Api);
    assert_eq!(err.status_code(), Some(403));
    assert_eq!(err.message, "You are not authorized");
    assert_eq!(err.body, Some(json!({"errors": "You are not authorized"})));
}

#[tokio::test]
async fn rate_limit_is_surfaced_like_any_other_api_error() {
    let service = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(1)
        .mount(&service)
        .await;

    let err = client_for(&service)
        .projects
        .list_all(&CancellationToken::new())
        .await
        .expect_err("429 is an error");

    assert_eq!(err.kind, RequestErrorKind::Api);
    assert_eq!(err.message, "Too Many Requests");
    assert_eq!(err.body, Some(json!("slow down")));
}

#[tokio::test]
async fn undecodable_success_body_is_a_decode_error() {
    let service = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&service)
        .await;

    let err = client_for(&service)
        .faults
        .get(&CancellationToken::new(), 1, 2)
        .await
        .expect_err("html is not a fault");

    assert_eq!(err.kind, RequestErrorKind::Decode);
    assert_eq!(err.to_string(), "failed to decode response");
}

#[tokio::test]
async fn cancelled_token_skips_the_request() {
    let service = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(0)
        .mount(&service)
        .await;

    let ct = CancellationToken::new();
    ct.cancel();
    let err = client_for(&service)
        .projects
        .list_all(&ct)
        .await
        .expect_err("cancelled before sending");

    assert!(err.is_cancelled());
}

#[tokio::test]
async fn cancellation_aborts_an_in_flight_request() {
    let service = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": []}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&service)
        .await;

    let ct = CancellationToken::new();
    let canceller = ct.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let started = std::time::Instant::now();
    let err = client_for(&service)
        .projects
        .list_all(&ct)
        .await
        .expect_err("cancelled mid-flight");

    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let client = ApiClient::new(&test_config("http://127.0.0.1:9", false)).expect("api client");

    let err = client
        .projects
        .list_all(&CancellationToken::new())
        .await
        .expect_err("nothing listens on port 9");

    assert_eq!(err.kind, RequestErrorKind::Transport);
}

// ── Resource services ────────────────────────────────────

#[tokio::test]
async fn fault_listing_only_sends_set_options() {
    let service = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/projects/3/faults"))
        .and(query_param("order", "frequent"))
        .and(query_param("occurred_after", "1700000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 11, "klass": "RuntimeError", "notices_count": 4}],
            "links": {"next": "https://app.honeybadger.io/v2/projects/3/faults?page=2"}
        })))
        .mount(&service)
        .await;

    let options = FaultListOptions {
        order: Some(FaultOrder::Frequent),
        occurred_after: Some(1_700_000_000),
        ..FaultListOptions::default()
    };
    let faults = client_for(&service)
        .faults
        .list(&CancellationToken::new(), 3, &options)
        .await
        .expect("faults");
    assert_eq!(faults.results[0].id, 11);

    let requests = service.received_requests().await.expect("recorded requests");
    let query = requests[0].url.query().unwrap_or_default().to_owned();
    assert!(!query.contains("limit"), "unset limit omitted, got {query}");
    assert!(!query.contains("page"), "unset page omitted, got {query}");
}

#[tokio::test]
async fn create_project_wraps_body_and_passes_account() {
    let service = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/projects"))
        .and(query_param("account_id", "acc1"))
        .and(body_json(json!({"project": {"name": "New", "purge_days": 30}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 99, "name": "New", "token": "secret"
        })))
        .expect(1)
        .mount(&service)
        .await;

    let request = ProjectRequest {
        name: Some("New".into()),
        purge_days: Some(30),
        ..ProjectRequest::default()
    };
    let project = client_for(&service)
        .projects
        .create(&CancellationToken::new(), "acc1", &request)
        .await
        .expect("created project");
    assert_eq!(project.id, 99);
}

#[tokio::test]
async fn delete_project_acknowledges() {
    let service = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v2/projects/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&service)
        .await;

    let ack = client_for(&service)
        .projects
        .delete(&CancellationToken::new(), 5)
        .await
        .expect("deleted");
    assert!(ack.success);
    assert_eq!(ack.message, "Project 5 deleted successfully");
}

#[tokio::test]
async fn occurrence_counts_for_all_projects_are_keyed_by_id() {
    let service = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/projects/occurrences"))
        .and(query_param("period", "day"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "1": [[1_700_000_000, 3], [1_700_086_400, 0]],
            "2": []
        })))
        .mount(&service)
        .await;

    let options = OccurrenceOptions {
        period: Some(Period::Day),
        environment: None,
    };
    let counts = client_for(&service)
        .projects
        .all_occurrence_counts(&CancellationToken::new(), &options)
        .await
        .expect("counts");
    assert_eq!(counts["1"], vec![(1_700_000_000, 3), (1_700_086_400, 0)]);
    assert!(counts["2"].is_empty());
}

#[tokio::test]
async fn dashboard_update_echoes_resource_when_returned() {
    let service = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v2/projects/1/dashboards/d1"))
        .and(body_json(json!({"dashboard": {"title": "Ops"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "d1", "title": "Ops"})))
        .mount(&service)
        .await;

    let request = DashboardRequest {
        title: Some("Ops".into()),
        widgets: None,
    };
    let outcome = client_for(&service)
        .dashboards
        .update(&CancellationToken::new(), 1, "d1", &request)
        .await
        .expect("updated");
    assert!(matches!(outcome, UpdateOutcome::Updated(ref dashboard) if dashboard.id == "d1"));
}

#[tokio::test]
async fn dashboard_update_acknowledges_empty_body() {
    let service = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v2/projects/1/dashboards/d1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&service)
        .await;

    let outcome = client_for(&service)
        .dashboards
        .update(&CancellationToken::new(), 1, "d1", &DashboardRequest::default())
        .await
        .expect("updated");
    match outcome {
        UpdateOutcome::Acknowledged(ack) => {
            assert_eq!(ack.message, "Dashboard d1 was successfully updated");
        }
        UpdateOutcome::Updated(_) => panic!("empty body must acknowledge"),
    }
}

#[tokio::test]
async fn alarm_listing_accepts_bare_arrays() {
    let service = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/projects/1/alarms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 10, "name": "High error rate", "trigger_config": {"type": "alert_on_count"}}
        ])))
        .mount(&service)
        .await;

    let listing = client_for(&service)
        .alarms
        .list(&CancellationToken::new(), 1)
        .await
        .expect("alarms");
    assert!(matches!(listing, Listing::Bare(_)));
    assert_eq!(listing.items()[0].id, "10");
}

#[tokio::test]
async fn alarm_history_passes_page() {
    let service = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/projects/1/alarms/a1/history"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"state": "triggered"}],
            "links": {}
        })))
        .expect(1)
        .mount(&service)
        .await;

    let history = client_for(&service)
        .alarms
        .history(&CancellationToken::new(), 1, "a1", Some(2))
        .await
        .expect("history");
    assert_eq!(history.items().len(), 1);
}

#[tokio::test]
async fn unknown_listing_shape_is_a_decode_error() {
    let service = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/projects/1/dashboards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dashboards": [{"id": "d1", "title": "Ops"}],
            "total": 1
        })))
        .mount(&service)
        .await;

    let err = client_for(&service)
        .dashboards
        .list(&CancellationToken::new(), 1)
        .await
        .expect_err("object without results");
    assert_eq!(err.kind, RequestErrorKind::Decode);
}
