//! Direct upload protocol tests
//!
//! Drives `UploadClient` against short-lived local servers:
//! 1. Status classification (2xx success, redirects and errors fail)
//! 2. Timeout reported distinctly from transport failure
//! 3. End-to-end grant, upload, and single-write enforcement

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::put,
    Router,
};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use tokio::net::TcpListener;

use entrydesk::auth::{JwtManager, Role};
use entrydesk::config::AppConfig;
use entrydesk::db::Database;
use entrydesk::http_server::{AppState, HttpServer, HttpServerConfig};
use entrydesk::media::{UploadClient, UploadError, UploadFile, UploadOutcome};

async fn serve_on(listener: TcpListener, router: Router) -> SocketAddr {
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn mock_store() -> SocketAddr {
    let router = Router::new()
        .route("/ok", put(|| async { StatusCode::NO_CONTENT }))
        .route(
            "/moved",
            put(|| async { (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/ok")]) }),
        )
        .route("/missing", put(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/slow",
            put(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK
            }),
        )
        .route("/typed", put(require_png));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    serve_on(listener, router).await
}

async fn require_png(headers: HeaderMap) -> impl IntoResponse {
    match headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        Some("image/png") => StatusCode::OK,
        _ => StatusCode::UNSUPPORTED_MEDIA_TYPE,
    }
}

fn png(name: &str) -> UploadFile {
    UploadFile::new(name, "image/png", b"\x89PNG fake image".to_vec())
}

// =============================================================================
// STATUS CLASSIFICATION
// =============================================================================

#[tokio::test]
async fn test_no_content_is_success() {
    let addr = mock_store().await;
    let client = UploadClient::new().unwrap();

    let outcome = client
        .upload_and_verify(&format!("http://{}/ok", addr), &png("logo.png"))
        .await;
    assert_eq!(outcome, UploadOutcome::Succeeded { status: 204 });
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let addr = mock_store().await;
    let client = UploadClient::new().unwrap();

    let outcome = client
        .upload_and_verify(&format!("http://{}/moved", addr), &png("logo.png"))
        .await;
    assert_eq!(
        outcome,
        UploadOutcome::Failed(UploadError::Status {
            file: "logo.png".into(),
            status: 301
        })
    );
}

#[tokio::test]
async fn test_not_found_is_failure() {
    let addr = mock_store().await;
    let client = UploadClient::new().unwrap();

    let outcome = client
        .upload_and_verify(&format!("http://{}/missing", addr), &png("logo.png"))
        .await;
    match outcome {
        UploadOutcome::Failed(UploadError::Status { file, status }) => {
            assert_eq!(file, "logo.png");
            assert_eq!(status, 404);
        }
        other => panic!("expected status failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_content_type_header_sent() {
    let addr = mock_store().await;
    let client = UploadClient::new().unwrap();
    let url = format!("http://{}/typed", addr);

    assert!(client.upload_and_verify(&url, &png("a.png")).await.is_success());

    let text = UploadFile::new("a.txt", "text/plain", b"hello".to_vec());
    assert!(!client.upload_and_verify(&url, &text).await.is_success());
}

// =============================================================================
// TIMEOUT VS TRANSPORT
// =============================================================================

#[tokio::test]
async fn test_slow_store_times_out() {
    let addr = mock_store().await;
    let client = UploadClient::with_timeout(Duration::from_millis(200)).unwrap();

    let outcome = client
        .upload_and_verify(&format!("http://{}/slow", addr), &png("big.png"))
        .await;
    match outcome {
        UploadOutcome::Failed(err @ UploadError::Timeout { .. }) => {
            assert_eq!(err.kind(), "timeout");
            assert!(err.to_string().contains("big.png"));
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_refused_connection_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = UploadClient::with_timeout(Duration::from_secs(5)).unwrap();
    let outcome = client
        .upload_and_verify(&format!("http://{}/ok", addr), &png("cv.png"))
        .await;
    match outcome {
        UploadOutcome::Failed(err @ UploadError::Transport { .. }) => {
            assert_eq!(err.kind(), "transport");
            assert_eq!(err.file(), "cv.png");
        }
        other => panic!("expected transport error, got {:?}", other),
    }
}

// =============================================================================
// END TO END
// =============================================================================

struct Service {
    _temp: TempDir,
    base: String,
    jwt: JwtManager,
    http: reqwest::Client,
}

async fn start_service() -> Service {
    let temp = TempDir::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base = format!("http://{}", addr);

    let config = AppConfig::from_json(
        &json!({
            "data_dir": temp.path().display().to_string(),
            "auth": { "secret": "e2e-test-secret-000001" },
            "storage": {
                "public_base_url": &base,
                "signing_secret": "e2e-test-signing-00001",
                "allowed_mime_types": ["image/*"]
            }
        })
        .to_string(),
    )
    .unwrap();

    let db = Database::open(config.database_path()).unwrap();
    let state = Arc::new(AppState::from_config(&config, db).unwrap());
    let router = HttpServer::new(HttpServerConfig::default(), state).router();
    serve_on(listener, router).await;

    Service {
        _temp: temp,
        base,
        jwt: JwtManager::new(config.jwt_config()),
        http: reqwest::Client::new(),
    }
}

impl Service {
    async fn request_grant(&self, role: Role, body: &Value) -> reqwest::Response {
        let token = self.jwt.issue("caller-1", role).unwrap();
        self.http
            .post(format!("{}/media/signed-url", self.base))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .unwrap()
    }

    async fn open_applications(&self) {
        let token = self.jwt.issue("admin-1", Role::Admin).unwrap();
        let response = self
            .http
            .put(format!("{}/settings/applications_open", self.base))
            .bearer_auth(token)
            .json(&json!({ "value": "true" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }
}

fn grant_body(file: &UploadFile) -> Value {
    json!({
        "filename": file.name,
        "type": file.content_type,
        "size": file.bytes.len(),
        "checksum": format!("{:x}", Sha256::digest(&file.bytes)),
    })
}

#[tokio::test]
async fn test_grant_then_upload_once() {
    let service = start_service().await;
    service.open_applications().await;

    let file = png("team photo.png");
    let response = service.request_grant(Role::Applicant, &grant_body(&file)).await;
    assert_eq!(response.status().as_u16(), 200);
    let grant: Value = response.json().await.unwrap();
    let url = grant["url"].as_str().unwrap();
    assert!(grant["key"].as_str().unwrap().starts_with("uploads/"));
    assert!(grant["expires_at"].is_string());

    let client = UploadClient::new().unwrap();
    let first = client.upload_and_verify(url, &file).await;
    assert_eq!(first, UploadOutcome::Succeeded { status: 201 });

    // The grant authorizes one write; the object now exists.
    let second = client.upload_and_verify(url, &file).await;
    assert_eq!(
        second,
        UploadOutcome::Failed(UploadError::Status {
            file: "team photo.png".into(),
            status: 409
        })
    );
}

#[tokio::test]
async fn test_upload_must_match_grant() {
    let service = start_service().await;
    service.open_applications().await;

    let file = png("logo.png");
    let grant: Value = service
        .request_grant(Role::Applicant, &grant_body(&file))
        .await
        .json()
        .await
        .unwrap();
    let url = grant["url"].as_str().unwrap();
    let client = UploadClient::new().unwrap();

    let wrong_type = UploadFile::new("logo.png", "image/gif", file.bytes.clone());
    let outcome = client.upload_and_verify(url, &wrong_type).await;
    assert_eq!(outcome.into_result().unwrap_err().kind(), "status");

    let tampered = UploadFile::new("logo.png", "image/png", b"\x89PNG fake imagX".to_vec());
    assert_eq!(
        client.upload_and_verify(url, &tampered).await,
        UploadOutcome::Failed(UploadError::Status {
            file: "logo.png".into(),
            status: 422
        })
    );

    let forged = url.replace("token=", "token=x");
    assert_eq!(
        client.upload_and_verify(&forged, &file).await,
        UploadOutcome::Failed(UploadError::Status {
            file: "logo.png".into(),
            status: 403
        })
    );
}

#[tokio::test]
async fn test_grant_requires_open_applications() {
    let service = start_service().await;
    let file = png("logo.png");

    let closed = service.request_grant(Role::Applicant, &grant_body(&file)).await;
    assert_eq!(closed.status().as_u16(), 403);

    // Administrators are not gated.
    let admin = service.request_grant(Role::Admin, &grant_body(&file)).await;
    assert_eq!(admin.status().as_u16(), 200);
}

#[tokio::test]
async fn test_grant_requires_bearer_token() {
    let service = start_service().await;
    let response = service
        .http
        .post(format!("{}/media/signed-url", service.base))
        .json(&grant_body(&png("logo.png")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn test_grant_rejects_disallowed_type() {
    let service = start_service().await;
    let pdf = UploadFile::new("cv.pdf", "application/pdf", b"%PDF".to_vec());
    let response = service.request_grant(Role::Admin, &grant_body(&pdf)).await;
    assert_eq!(response.status().as_u16(), 400);
}
