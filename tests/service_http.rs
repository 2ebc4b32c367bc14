//! HTTP client tests against a wiremock review service.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use acr::action::Action;
use acr::clipboard::Clipboard;
use acr::command::{Command, CommandExecutor};
use acr::domain::service::{self, HttpReviewService, ReviewService};
use acr::domain::types::{LinterIssue, ReviewStatus, ServiceLimits, SessionId, Submission};
use acr::error::ServiceError;
use acr::poller::RetryPolicy;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::mpsc;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn service() -> (MockServer, HttpReviewService) {
    let server = MockServer::start().await;
    let client = HttpReviewService::new(&server.uri(), Duration::from_secs(5)).unwrap();
    (server, client)
}

#[tokio::test]
async fn test_config_limits() {
    let (server, client) = service().await;
    Mock::given(method("GET"))
        .and(path("/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "max_zip_size_mb": 10,
            "max_zip_size_bytes": 10485760
        })))
        .mount(&server)
        .await;

    let limits = service::load_limits(&client).await;
    assert_eq!(
        limits,
        ServiceLimits {
            max_zip_size_mb: 10,
            max_zip_size_bytes: 10485760,
        }
    );
}

#[tokio::test]
async fn test_config_partial_response_falls_back_per_field() {
    let (server, client) = service().await;
    Mock::given(method("GET"))
        .and(path("/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "max_zip_size_mb": 0 })))
        .mount(&server)
        .await;

    assert_eq!(service::load_limits(&client).await, ServiceLimits::default());
}

#[tokio::test]
async fn test_config_failure_uses_defaults() {
    let (server, client) = service().await;
    Mock::given(method("GET"))
        .and(path("/config"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(service::load_limits(&client).await, ServiceLimits::default());
}

#[tokio::test]
async fn test_submit_paste_sends_code_and_filename() {
    let (server, client) = service().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .and(body_string_contains("name=\"code\""))
        .and(body_string_contains("name=\"filename\""))
        .and(body_string_contains("main.py"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "session_id": "abc" })))
        .expect(1)
        .mount(&server)
        .await;

    let session = client
        .submit(&Submission::Paste {
            code: "print(1)".to_string(),
            filename: "main.py".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(session, SessionId::new("abc"));
}

#[tokio::test]
async fn test_submit_zip_sends_file_part() {
    let (server, client) = service().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .and(body_string_contains("name=\"zip\""))
        .and(body_string_contains("filename=\"project.zip\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "session_id": "zip1" })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let zip_path = dir.path().join("project.zip");
    let mut file = std::fs::File::create(&zip_path).unwrap();
    file.write_all(b"PK\x03\x04").unwrap();

    let session = client
        .submit(&Submission::Zip {
            path: zip_path,
            size_bytes: 4,
        })
        .await
        .unwrap();
    assert_eq!(session, SessionId::new("zip1"));
}

#[tokio::test]
async fn test_submit_github_url() {
    let (server, client) = service().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .and(body_string_contains("name=\"github_url\""))
        .and(body_string_contains("https://github.com/user/repo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "session_id": "gh1" })))
        .expect(1)
        .mount(&server)
        .await;

    let url = Url::parse("https://github.com/user/repo").unwrap();
    let session = client.submit(&Submission::Github { url }).await.unwrap();
    assert_eq!(session, SessionId::new("gh1"));
}

#[tokio::test]
async fn test_submit_rejection_carries_service_message() {
    let (server, client) = service().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": "Invalid file type for pasted code." })),
        )
        .mount(&server)
        .await;

    let err = client
        .submit(&Submission::Paste {
            code: "x".to_string(),
            filename: "notes.exe".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Rejected { status: 400, .. }));
    assert_eq!(
        err.user_message("Submission failed"),
        "Invalid file type for pasted code."
    );
}

#[tokio::test]
async fn test_submit_rejection_without_message_uses_fallback() {
    let (server, client) = service().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = client
        .submit(&Submission::Paste {
            code: "x".to_string(),
            filename: "main.py".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.user_message("Submission failed"), "Submission failed");
}

#[tokio::test]
async fn test_submit_without_session_id() {
    let (server, client) = service().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = client
        .submit(&Submission::Paste {
            code: "x".to_string(),
            filename: "main.py".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::MissingField {
            field: "session_id",
            ..
        }
    ));
}

#[tokio::test]
async fn test_submit_rejects_unsafe_session_id() {
    let (server, client) = service().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "session_id": "../../etc/passwd" })),
        )
        .mount(&server)
        .await;

    let err = client
        .submit(&Submission::Paste {
            code: "x".to_string(),
            filename: "main.py".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidSessionId { .. }));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "processing" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    let client = HttpReviewService::new(&server.uri(), Duration::from_millis(200)).unwrap();

    let started = std::time::Instant::now();
    let err = client.status(&SessionId::new("abc")).await.unwrap_err();
    match err {
        ServiceError::Transport { source, .. } => assert!(source.is_timeout()),
        other => panic!("expected a transport timeout, got {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_status_path_escapes_session_id() {
    let (server, client) = service().await;
    Mock::given(method("GET"))
        .and(path("/status/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "pending" })))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = client.status(&SessionId::new("a/b")).await.unwrap();
    assert_eq!(snapshot.status, ReviewStatus::Pending);
}

#[tokio::test]
async fn test_status_and_not_found() {
    let (server, client) = service().await;
    Mock::given(method("GET"))
        .and(path("/status/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "abc",
            "status": "processing"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status/gone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "not found" })))
        .mount(&server)
        .await;

    let snapshot = client.status(&SessionId::new("abc")).await.unwrap();
    assert_eq!(snapshot.status, ReviewStatus::Processing);
    assert_eq!(snapshot.download_url, None);

    let snapshot = client.status(&SessionId::new("gone")).await.unwrap();
    assert_eq!(snapshot.status, ReviewStatus::NotFound);
    assert!(snapshot.status.is_terminal());
}

#[tokio::test]
async fn test_review_payload() {
    let (server, client) = service().await;
    Mock::given(method("GET"))
        .and(path("/review/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ai_log": [{
                "file": "main.py",
                "line": 4,
                "issue": {"line": 4, "col": 1, "message": "unused import"},
                "suggestion": "Remove the import",
                "current_code": "import os",
                "recommended_code": "",
                "patch": null
            }],
            "linter_results": {
                "main.py": [{"line": 4, "col": 1, "message": "unused import"}],
                "README.md": [{"info": "No linter for this file type"}]
            },
            "code_quality_score": 87.5,
            "patch": "--- a/main.py\n+++ b/main.py\n",
            "download_url": "/download/abc"
        })))
        .mount(&server)
        .await;

    let review = client.review(&SessionId::new("abc")).await.unwrap();
    assert_eq!(review.ai_log[0].issue.message(), "unused import");
    assert_eq!(review.code_quality_score, Some(87.5));
    assert!(review.linter_results["main.py"][0].is_finding());
    assert_eq!(
        review.linter_results["README.md"][0],
        LinterIssue::Info {
            info: "No linter for this file type".to_string()
        }
    );
    assert_eq!(review.pr_comments(), None);
}

#[tokio::test]
async fn test_review_decode_error() {
    let (server, client) = service().await;
    Mock::given(method("GET"))
        .and(path("/review/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client.review(&SessionId::new("abc")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Decode { .. }));
}

struct NoClipboard;

impl Clipboard for NoClipboard {
    fn copy(&self, _text: &str) -> Result<(), String> {
        Ok(())
    }
}

#[tokio::test]
async fn test_download_saves_archive() {
    let (server, client) = service().await;
    Mock::given(method("GET"))
        .and(path("/download/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x05\x06".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut executor = CommandExecutor::new(
        Arc::new(client),
        Arc::new(NoClipboard),
        tx,
        RetryPolicy::default(),
        dir.path().to_path_buf(),
    );

    executor.execute(Command::Download {
        session: SessionId::new("abc"),
        url: "/download/abc".to_string(),
    });

    let Some(Action::Downloaded { session, result }) = rx.recv().await else {
        panic!("expected a download result");
    };
    assert_eq!(session, SessionId::new("abc"));
    let saved = result.unwrap();
    assert_eq!(saved, dir.path().join("review-abc.zip"));
    assert_eq!(std::fs::read(saved).unwrap(), b"PK\x05\x06");
}
