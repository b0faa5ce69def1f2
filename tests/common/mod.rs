#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, Response, header},
};
use ephemeral_uploads::config::AppConfig;
use ephemeral_uploads::infrastructure::storage::setup_storage;
use ephemeral_uploads::{AppState, create_app};
use http_body_util::BodyExt;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

pub const API_KEY: &str = "test-api-key";
pub const BOUNDARY: &str = "------------------------ephemeraluploads7MA4YWxk";

pub struct TestApp {
    pub app: Router,
    pub config: AppConfig,
    // Keeps the upload directory alive for the duration of the test.
    pub dir: TempDir,
}

impl TestApp {
    pub fn upload_dir(&self) -> &Path {
        &self.config.upload_dir
    }
}

pub fn test_config(upload_dir: &Path) -> AppConfig {
    AppConfig {
        api_key: API_KEY.to_string(),
        upload_dir: upload_dir.to_path_buf(),
        ..AppConfig::default()
    }
}

pub async fn setup() -> TestApp {
    setup_with(|_| {}).await
}

pub async fn setup_with(customize: impl FnOnce(&mut AppConfig)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir.path().join("uploads"));
    customize(&mut config);

    let storage = setup_storage(&config).await.unwrap();
    let app = create_app(AppState::new(config.clone(), storage));

    TestApp { app, config, dir }
}

/// Builds a multipart/form-data body with a single file field.
pub fn multipart_body(
    field: &str,
    filename: Option<&str>,
    content_type: Option<&str>,
    data: &[u8],
) -> Vec<u8> {
    let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", field);
    if let Some(filename) = filename {
        disposition.push_str(&format!("; filename=\"{}\"", filename));
    }

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n{}\r\n", BOUNDARY, disposition).as_bytes());
    if let Some(content_type) = content_type {
        body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// `POST /upload` with a multipart content type and a matching Content-Length.
pub fn upload_request(authorization: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::CONTENT_LENGTH, body.len());

    if let Some(authorization) = authorization {
        builder = builder.header(header::AUTHORIZATION, authorization);
    }

    builder.body(Body::from(body)).unwrap()
}

pub fn bearer() -> String {
    format!("Bearer {}", API_KEY)
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Deterministic payload of `len` bytes starting with the JPEG magic.
pub fn jpeg_bytes(len: usize) -> Vec<u8> {
    let mut data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    let magic = [0xFF, 0xD8, 0xFF, 0xE0];
    let n = magic.len().min(len);
    data[..n].copy_from_slice(&magic[..n]);
    data
}

pub fn png_bytes() -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(b"not really a png after the header");
    data
}

/// Rewinds a file's modification time by `age`.
pub fn age_file(path: &Path, age: Duration) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}

/// Entries in the upload directory other than the sentinel.
pub fn stored_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|name| name != ".keep")
        .collect();
    names.sort();
    names
}
