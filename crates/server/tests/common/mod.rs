//! Common test utilities for in-process API testing with mocks.
//!
//! This module provides a test fixture that builds the router with a
//! [`MockConverter`] injected, enabling end-to-end request tests without
//! FFmpeg installed.

#![allow(dead_code)]

use std::io::{Cursor, Read};
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use mediacut_core::{testing::MockConverter, Config, Converter};
use mediacut_server::{api::create_router, state::AppState};

const BOUNDARY: &str = "mediacut-test-boundary";

/// Test fixture with a mock converter behind the real router.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_single_clip() {
///     let fixture = TestFixture::new();
///
///     let response = fixture
///         .post_form("/clip", &[
///             FormPart::file("file", "sample.mp4", b"video"),
///             FormPart::text("clips", r#"[{"start": 5, "end": 15}]"#),
///         ])
///         .await;
///
///     assert_eq!(response.status, StatusCode::OK);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock converter - configure duration and failures
    pub converter: Arc<MockConverter>,
    /// Root under which request workspaces are created
    pub workspace_root: TempDir,
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Duration reported by the mock probe, in seconds
    pub duration_secs: f64,
    pub max_upload_mb: u64,
    pub require_video_content_type: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            duration_secs: 100.0,
            max_upload_mb: 16,
            require_video_content_type: false,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: header::HeaderName) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    /// Entry names and contents of a ZIP body, in archive order.
    pub fn zip_entries(&self) -> Vec<(String, Vec<u8>)> {
        let mut archive =
            zip::ZipArchive::new(Cursor::new(self.body.to_vec())).expect("Body is not a ZIP");
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut contents = Vec::new();
                file.read_to_end(&mut contents).unwrap();
                (file.name().to_string(), contents)
            })
            .collect()
    }

    pub fn zip_names(&self) -> Vec<String> {
        self.zip_entries().into_iter().map(|(name, _)| name).collect()
    }
}

/// One part of a multipart form.
#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl FormPart {
    pub fn file(name: &str, filename: &str, data: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            filename: Some(filename.to_string()),
            content_type: Some("video/mp4".to_string()),
            data: data.to_vec(),
        }
    }

    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            filename: None,
            content_type: None,
            data: value.as_bytes().to_vec(),
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }
}

/// Encode parts as a `multipart/form-data` body.
pub fn multipart_body(parts: &[FormPart]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(filename) = &part.filename {
            disposition.push_str(&format!("; filename=\"{}\"", filename));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = &part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    /// Create a test fixture with custom configuration.
    pub fn with_config(test_config: TestConfig) -> Self {
        let workspace_root = TempDir::new().expect("Failed to create temp dir");
        let converter = Arc::new(MockConverter::with_duration(test_config.duration_secs));

        let mut config = Config::default();
        config.workspace.root_dir = workspace_root.path().to_path_buf();
        config.upload.max_upload_mb = test_config.max_upload_mb;
        config.upload.require_video_content_type = test_config.require_video_content_type;

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&converter) as Arc<dyn Converter>,
        ));
        let router = create_router(state);

        Self {
            router,
            converter,
            workspace_root,
        }
    }

    /// Whether every request workspace has been removed.
    pub fn workspace_is_empty(&self) -> bool {
        std::fs::read_dir(self.workspace_root.path())
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a POST request with a multipart form body.
    pub async fn post_form(&self, path: &str, parts: &[FormPart]) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send(request).await
    }

    /// Send a POST request with raw body and content type.
    pub async fn post_raw(&self, path: &str, body: &str, content_type: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status,
            $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            $response.text()
        );
    };
}
