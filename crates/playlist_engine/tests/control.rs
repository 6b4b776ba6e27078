use std::time::Duration;

use playlist_engine::{ControlClient, ControlError, EngineSettings, HttpControlClient};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpControlClient {
    let settings = EngineSettings {
        base_url: server.uri(),
        ..EngineSettings::default()
    };
    HttpControlClient::new(settings).expect("client")
}

#[tokio::test]
async fn start_posts_url_and_returns_job_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .and(body_json(json!({ "url": "https://example.com/playlist?list=PL1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Download started",
            "download_id": "1717171717.5"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let job_id = client
        .start("  https://example.com/playlist?list=PL1 ")
        .await
        .expect("start ok");
    assert_eq!(job_id.as_deref(), Some("1717171717.5"));
}

#[tokio::test]
async fn start_without_echoed_id_still_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .mount(&server)
        .await;

    let job_id = client_for(&server).start("https://a.example").await.unwrap();
    assert_eq!(job_id, None);
}

#[tokio::test]
async fn start_surfaces_runner_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "error": "Error starting download: boom" })),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .start("https://a.example")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ControlError::Rejected {
            status: 500,
            message: "Error starting download: boom".to_string(),
        }
    );
    assert_eq!(err.to_string(), "Error starting download: boom");
}

#[tokio::test]
async fn start_rejects_empty_url_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server).start("   ").await.unwrap_err();
    assert_eq!(err, ControlError::EmptyUrl);
}

#[tokio::test]
async fn stop_hits_job_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stop_download/1717.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Stop signal sent" })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).stop("1717.5").await.expect("stop ok");
}

#[tokio::test]
async fn stop_for_unknown_job_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stop_download/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Download not found" })))
        .mount(&server)
        .await;

    let err = client_for(&server).stop("gone").await.unwrap_err();
    assert_eq!(
        err,
        ControlError::Rejected {
            status: 404,
            message: "Download not found".to_string(),
        }
    );
}

#[tokio::test]
async fn slow_runner_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "download_id": "late" })),
        )
        .mount(&server)
        .await;

    let settings = EngineSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..EngineSettings::default()
    };
    let client = HttpControlClient::new(settings).unwrap();
    let err = client.start("https://a.example").await.unwrap_err();
    assert_eq!(err, ControlError::Timeout);
}

#[tokio::test]
async fn unreachable_runner_is_a_transport_error() {
    let settings = EngineSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        connect_timeout: Duration::from_millis(200),
        ..EngineSettings::default()
    };
    let client = HttpControlClient::new(settings).unwrap();
    let err = client.start("https://a.example").await.unwrap_err();
    assert!(
        matches!(err, ControlError::Transport(_) | ControlError::Timeout),
        "unexpected {err:?}"
    );
}

#[tokio::test]
async fn malformed_base_url_is_reported() {
    let settings = EngineSettings {
        base_url: "not a url".to_string(),
        ..EngineSettings::default()
    };
    let client = HttpControlClient::new(settings).unwrap();
    let err = client.start("https://a.example").await.unwrap_err();
    assert!(matches!(err, ControlError::InvalidBaseUrl(_)));
}
