//! Axum router and listener for the upload endpoint.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::constants::{defaults, env, routes};
use crate::error::{Result, UploadError};

/// Where uploads are stored and which port to listen on.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadConfig {
    pub upload_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(defaults::UPLOAD_DIR),
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
        }
    }
}

impl UploadConfig {
    /// Read `PORT` and `UPLOAD_DIR`, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(port) = std::env::var(env::PORT) {
            match port.trim().parse() {
                Ok(port) => config.port = port,
                Err(_) => log::warn!("Ignoring invalid {}={:?}", env::PORT, port),
            }
        }
        if let Ok(dir) = std::env::var(env::UPLOAD_DIR) {
            if !dir.trim().is_empty() {
                config.upload_dir = PathBuf::from(dir);
            }
        }
        config
    }
}

/// Metadata returned for a stored upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    pub originalname: String,
    pub filename: String,
    pub mimetype: String,
    pub size: u64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub file: StoredFile,
}

type ServerState = Arc<UploadConfig>;

/// Build the router: upload, static file serving and health check
pub fn router(config: UploadConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let files = ServeDir::new(&config.upload_dir);

    Router::new()
        .route(routes::UPLOAD, post(upload_handler))
        .route(routes::HEALTH, get(health_handler))
        .nest_service(routes::FILES, files)
        .layer(DefaultBodyLimit::max(defaults::MAX_BODY_BYTES))
        .layer(cors)
        .with_state(Arc::new(config))
}

/// Bind the listener and serve in a background task.
///
/// Port `0` picks a free port; the bound address is returned.
pub async fn serve(config: UploadConfig) -> Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let addr = listener.local_addr()?;
    log::info!(
        "Upload server listening on http://{} (storing in {:?})",
        addr,
        config.upload_dir
    );

    let app = router(config);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("Upload server error: {}", e);
        }
    });

    Ok((addr, handle))
}

// --- Axum Handlers ---

async fn health_handler() -> &'static str {
    "OK"
}

async fn upload_handler(
    State(config): State<ServerState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(routes::FILE_FIELD) {
            continue;
        }

        let originalname = field.file_name().unwrap_or_default().to_string();
        let mimetype = field
            .content_type()
            .unwrap_or(defaults::MIME_TYPE)
            .to_string();
        let bytes = field.bytes().await?;

        let filename = uuid::Uuid::new_v4().simple().to_string();
        tokio::fs::create_dir_all(&config.upload_dir).await?;
        tokio::fs::write(config.upload_dir.join(&filename), &bytes).await?;

        log::info!(
            "Stored upload '{}' as {} ({} bytes)",
            originalname,
            filename,
            bytes.len()
        );

        return Ok(Json(UploadResponse {
            message: "File uploaded successfully".to_string(),
            file: StoredFile {
                url: format!("{}/{}", routes::FILES, filename),
                originalname,
                filename,
                mimetype,
                size: bytes.len() as u64,
            },
        }));
    }

    Err(UploadError::NoFile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::multipart::{Form, Part};
    use tempfile::TempDir;

    async fn start(temp_dir: &TempDir) -> String {
        let config = UploadConfig {
            upload_dir: temp_dir.path().join("uploads"),
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let (addr, _handle) = serve(config).await.unwrap();
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health() {
        let temp_dir = TempDir::new().unwrap();
        let base = start(&temp_dir).await;

        let body = reqwest::get(format!("{}/api/health", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_upload_and_fetch() {
        let temp_dir = TempDir::new().unwrap();
        let base = start(&temp_dir).await;
        let client = reqwest::Client::new();

        let part = Part::bytes(b"hello studio".to_vec())
            .file_name("notes.txt")
            .mime_str("text/plain")
            .unwrap();
        let response = client
            .post(format!("{}/api/upload", base))
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());

        let body: UploadResponse = response.json().await.unwrap();
        assert_eq!(body.message, "File uploaded successfully");
        assert_eq!(body.file.originalname, "notes.txt");
        assert_eq!(body.file.mimetype, "text/plain");
        assert_eq!(body.file.size, 12);
        assert_eq!(body.file.url, format!("/uploads/{}", body.file.filename));

        let stored = temp_dir.path().join("uploads").join(&body.file.filename);
        assert_eq!(std::fs::read(stored).unwrap(), b"hello studio");

        let served = client
            .get(format!("{}{}", base, body.file.url))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(served, "hello studio");
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let temp_dir = TempDir::new().unwrap();
        let base = start(&temp_dir).await;

        let response = reqwest::Client::new()
            .post(format!("{}/api/upload", base))
            .multipart(Form::new().text("note", "no file here"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "No file uploaded");
    }
}
