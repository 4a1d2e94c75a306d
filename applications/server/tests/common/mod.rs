//! Common test utilities and fixtures
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
    Router,
};
use std::path::PathBuf;
use tempfile::TempDir;
use tower::util::ServiceExt;
use trackvault_server::{api, config::ServerConfig, state::AppState};

pub const BOUNDARY: &str = "trackvault-test-boundary";
pub const BASE_URL: &str = "http://music.test";

/// A running application backed by a temporary data directory
pub struct TestApp {
    pub state: AppState,
    pub config: ServerConfig,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut ServerConfig)) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let mut config = ServerConfig::default();
        config.storage.data_dir = temp_dir.path().to_path_buf();
        config.server.public_base_url = BASE_URL.to_string();
        customize(&mut config);

        let (state, _worker) = AppState::initialize(config.clone()).await.unwrap();
        Self {
            state,
            config,
            _temp_dir: temp_dir,
        }
    }

    pub fn router(&self) -> Router {
        api::router(self.state.clone())
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_with_range(&self, uri: &str, range: &str) -> Response {
        self.request(
            Request::builder()
                .uri(uri)
                .header(header::RANGE, range)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        self.request(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// POST a multipart upload to /api/ingest
    pub async fn upload(&self, form: &Upload<'_>) -> Response {
        self.request(
            Request::builder()
                .method("POST")
                .uri("/api/ingest")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(form.encode()))
                .unwrap(),
        )
        .await
    }

    /// Upload a small track and return its id
    pub async fn add_track(&self, title: &str, performer: &str, external_ref: &str) -> String {
        let response = self
            .upload(
                &Upload::audio(b"ID3 fake audio payload")
                    .field("title", title)
                    .field("performer", performer)
                    .field("external_ref", external_ref),
            )
            .await;
        assert_eq!(response.status(), axum::http::StatusCode::CREATED);
        let receipt = body_json(response).await;
        receipt["id"].as_str().unwrap().to_string()
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.config.storage.snapshot_path()
    }

    pub fn blob_path(&self) -> PathBuf {
        self.config.storage.blob_path()
    }

    /// Number of stored blobs
    pub fn blob_count(&self) -> usize {
        std::fs::read_dir(self.blob_path()).unwrap().count()
    }
}

/// Multipart form builder for upload requests
pub struct Upload<'a> {
    fields: Vec<(&'a str, String)>,
    files: Vec<(&'a str, &'a str, &'a [u8])>,
}

impl<'a> Upload<'a> {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Form with an MP3 file part
    pub fn audio(data: &'a [u8]) -> Self {
        Self::new().file("track.mp3", "audio/mpeg", data)
    }

    /// Add a `file` part; calling it twice sends two file parts
    pub fn file(mut self, filename: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        self.files.push((filename, content_type, data));
        self
    }

    pub fn field(mut self, name: &'a str, value: impl Into<String>) -> Self {
        self.fields.push((name, value.into()));
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in &self.fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        for (filename, content_type, data) in &self.files {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    BOUNDARY, filename, content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
