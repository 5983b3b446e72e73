//! Integration tests for the Twilio call-log client.
//!
//! Each test starts a local mock server and exercises the real HTTP contract:
//! basic auth, query filters, pagination and error mapping.

use chrono::{TimeZone, Utc};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{basic_auth, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use call_monitor::calls::{CallSource, CallStatus, TwilioClient};
use call_monitor::config::TwilioConfig;
use call_monitor::error::FetchError;

const CALLS_PATH: &str = "/2010-04-01/Accounts/AC123/Calls.json";

fn client(server: &MockServer, page_size: u32, max_calls: usize) -> TwilioClient {
    let config = TwilioConfig {
        account_sid: "AC123".into(),
        auth_token: SecretString::from("secret-token"),
        api_base: server.uri(),
        page_size,
        max_calls,
    };
    TwilioClient::new(config, reqwest::Client::new())
}

fn since() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 11, 45, 0).unwrap()
}

fn call_json(sid: &str, status: &str, duration: Option<&str>) -> serde_json::Value {
    json!({
        "sid": sid,
        "status": status,
        "duration": duration,
        "start_time": "Sun, 18 Oct 2026 11:50:00 +0000",
        "end_time": null,
        "from": "+15550001111",
        "to": "+15550002222",
        "from_formatted": "(555) 000-1111",
        "to_formatted": "(555) 000-2222"
    })
}

#[tokio::test]
async fn fetches_single_page_with_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CALLS_PATH))
        .and(basic_auth("AC123", "secret-token"))
        .and(query_param("StartTime>=", "2026-10-17"))
        .and(query_param("PageSize", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "calls": [
                call_json("CA1", "in-progress", None),
                call_json("CA2", "completed", Some("915")),
            ],
            "next_page_uri": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let calls = client(&server, 50, 200).recent_calls(since()).await.unwrap();

    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].sid, "CA1");
    assert_eq!(calls[0].status, CallStatus::InProgress);
    assert_eq!(calls[0].duration, None);
    assert_eq!(calls[1].duration, Some(915));
    assert_eq!(calls[1].display_to(), "(555) 000-2222");
}

#[tokio::test]
async fn follows_next_page_uri() {
    let server = MockServer::start().await;
    let next = format!("{CALLS_PATH}?Page=1&PageSize=2&PageToken=PA1");

    Mock::given(method("GET"))
        .and(path(CALLS_PATH))
        .and(query_param("StartTime>=", "2026-10-17"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "calls": [
                call_json("CA1", "completed", Some("10")),
                call_json("CA2", "completed", Some("20")),
            ],
            "next_page_uri": next
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(CALLS_PATH))
        .and(basic_auth("AC123", "secret-token"))
        .and(query_param("PageToken", "PA1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "calls": [call_json("CA3", "in-progress", None)],
            "next_page_uri": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let calls = client(&server, 2, 200).recent_calls(since()).await.unwrap();

    let sids: Vec<_> = calls.iter().map(|c| c.sid.as_str()).collect();
    assert_eq!(sids, vec!["CA1", "CA2", "CA3"]);
}

#[tokio::test]
async fn stops_at_max_calls() {
    let server = MockServer::start().await;
    let next = format!("{CALLS_PATH}?Page=1&PageSize=2&PageToken=PA1");

    Mock::given(method("GET"))
        .and(path(CALLS_PATH))
        .and(query_param("StartTime>=", "2026-10-17"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "calls": [
                call_json("CA1", "completed", Some("10")),
                call_json("CA2", "completed", Some("20")),
            ],
            "next_page_uri": next
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(CALLS_PATH))
        .and(query_param("PageToken", "PA1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "calls": [],
            "next_page_uri": null
        })))
        .expect(0)
        .mount(&server)
        .await;

    let calls = client(&server, 2, 1).recent_calls(since()).await.unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].sid, "CA1");
}

#[tokio::test]
async fn auth_failure_maps_to_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CALLS_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("Authenticate"))
        .mount(&server)
        .await;

    let err = client(&server, 50, 200)
        .recent_calls(since())
        .await
        .unwrap_err();

    match err {
        FetchError::Status { status, body, .. } => {
            assert_eq!(status, 401);
            assert_eq!(body, "Authenticate");
        }
        other => panic!("Expected Status, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_body_maps_to_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CALLS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server, 50, 200)
        .recent_calls(since())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test]
async fn unreachable_host_maps_to_request_error() {
    let config = TwilioConfig {
        account_sid: "AC123".into(),
        auth_token: SecretString::from("secret-token"),
        // Port 9 (discard) on loopback: nothing listens there in test environments.
        api_base: "http://127.0.0.1:9".into(),
        page_size: 50,
        max_calls: 200,
    };
    let err = TwilioClient::new(config, reqwest::Client::new())
        .recent_calls(since())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Request { .. }));
}

#[tokio::test]
async fn repeated_next_page_uri_stops_paging() {
    let server = MockServer::start().await;
    let next = format!("{CALLS_PATH}?Page=1&PageSize=1&PageToken=PA1");

    Mock::given(method("GET"))
        .and(path(CALLS_PATH))
        .and(query_param("StartTime>=", "2026-10-17"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "calls": [call_json("CA1", "completed", Some("10"))],
            "next_page_uri": next
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The follow-up page keeps pointing at itself.
    Mock::given(method("GET"))
        .and(path(CALLS_PATH))
        .and(query_param("PageToken", "PA1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "calls": [call_json("CA2", "completed", Some("20"))],
            "next_page_uri": next
        })))
        .expect(1)
        .mount(&server)
        .await;

    let calls = client(&server, 1, 200).recent_calls(since()).await.unwrap();

    let sids: Vec<_> = calls.iter().map(|c| c.sid.as_str()).collect();
    assert_eq!(sids, vec!["CA1", "CA2"]);
}

#[tokio::test]
async fn empty_page_stops_paging() {
    let server = MockServer::start().await;
    let next = format!("{CALLS_PATH}?Page=1&PageSize=1&PageToken=PA1");
    let after = format!("{CALLS_PATH}?Page=2&PageSize=1&PageToken=PA2");

    Mock::given(method("GET"))
        .and(path(CALLS_PATH))
        .and(query_param("StartTime>=", "2026-10-17"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "calls": [call_json("CA1", "completed", Some("10"))],
            "next_page_uri": next
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(CALLS_PATH))
        .and(query_param("PageToken", "PA1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "calls": [],
            "next_page_uri": after
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(CALLS_PATH))
        .and(query_param("PageToken", "PA2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "calls": [],
            "next_page_uri": null
        })))
        .expect(0)
        .mount(&server)
        .await;

    let calls = client(&server, 1, 200).recent_calls(since()).await.unwrap();
    assert_eq!(calls.len(), 1);
}
