//! Network seam between the widget and the document reader endpoint.

use crate::config::DOCUMENT_FIELD;
use crate::error::UploadError;
use crate::file::SelectedFile;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use tracing::debug;

/// Sends one staged file and hands back the response body as JSON.
/// Bodies that do not parse come back as a JSON string.
#[async_trait::async_trait]
pub trait UploadTransport: Send + Sync {
    async fn post_document(&self, file: &SelectedFile) -> Result<serde_json::Value, UploadError>;
}

/// Multipart POST over `reqwest`, client defaults for timeouts.
pub struct HttpTransport {
    url: Url,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { url, client }
    }
}

#[async_trait::async_trait]
impl UploadTransport for HttpTransport {
    async fn post_document(&self, file: &SelectedFile) -> Result<serde_json::Value, UploadError> {
        let part = Part::stream_with_length(file.bytes(), file.size() as u64)
            .file_name(file.filename().to_string())
            .mime_str(file.mime())?;

        let form = Form::new().part(DOCUMENT_FIELD, part);

        debug!("POST {} ({} bytes)", self.url, file.size());

        let response = self
            .client
            .post(self.url.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Status { status, body });
        }

        let body = response.bytes().await?;
        debug!("Endpoint replied {} ({} bytes)", status, body.len());

        // A body that is not JSON is shown as a JSON string, empty bodies included.
        Ok(serde_json::from_slice(&body).unwrap_or_else(|_| {
            debug!("Endpoint body is not JSON, keeping it as text");
            serde_json::Value::String(String::from_utf8_lossy(&body).into_owned())
        }))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::extract::{Multipart, State};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;
    use std::sync::{Arc, Mutex};

    /// One multipart part as the stub endpoint saw it.
    #[derive(Debug, Clone)]
    pub struct CapturedPart {
        pub name: String,
        pub file_name: Option<String>,
        pub content_type: Option<String>,
        pub data: Vec<u8>,
    }

    #[derive(Clone)]
    struct Stub {
        status: StatusCode,
        body: String,
        requests: Arc<Mutex<Vec<Vec<CapturedPart>>>>,
    }

    async fn capture(State(stub): State<Stub>, mut multipart: Multipart) -> (StatusCode, String) {
        let mut parts = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.unwrap().to_vec();
            parts.push(CapturedPart {
                name,
                file_name,
                content_type,
                data,
            });
        }
        stub.requests.lock().unwrap().push(parts);
        (stub.status, stub.body.clone())
    }

    /// Serve a stub upload endpoint on an ephemeral port.
    /// Returns its URL and every request's captured parts.
    pub async fn spawn_stub(
        status: StatusCode,
        body: &str,
    ) -> (Url, Arc<Mutex<Vec<Vec<CapturedPart>>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let stub = Stub {
            status,
            body: body.to_string(),
            requests: requests.clone(),
        };
        let app = Router::new()
            .route("/upload", post(capture))
            .with_state(stub);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let url = Url::parse(&format!("http://{}/upload", addr)).unwrap();
        (url, requests)
    }

    #[tokio::test]
    async fn test_sends_document_field() {
        let (url, requests) = spawn_stub(StatusCode::OK, r#"{"status":"ok"}"#).await;
        let transport = HttpTransport::new(reqwest::Client::new(), url);
        let file = SelectedFile::from_bytes("license.png", b"front side".to_vec());

        let value = transport.post_document(&file).await.unwrap();
        assert_eq!(value, serde_json::json!({"status": "ok"}));

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let parts = &requests[0];
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].name, "document");
        assert_eq!(parts[0].file_name.as_deref(), Some("license.png"));
        assert_eq!(parts[0].content_type.as_deref(), Some("image/png"));
        assert_eq!(parts[0].data, b"front side");
    }

    #[tokio::test]
    async fn test_server_error_carries_status_and_body() {
        let (url, _) = spawn_stub(StatusCode::INTERNAL_SERVER_ERROR, "tesseract crashed").await;
        let transport = HttpTransport::new(reqwest::Client::new(), url);
        let file = SelectedFile::from_bytes("id.jpg", b"jpeg".to_vec());

        match transport.post_document(&file).await {
            Err(UploadError::Status { status, body }) => {
                assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "tesseract crashed");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_becomes_string() {
        let (url, _) = spawn_stub(StatusCode::OK, "<html>not json</html>").await;
        let transport = HttpTransport::new(reqwest::Client::new(), url);
        let file = SelectedFile::from_bytes("id.jpg", b"jpeg".to_vec());

        let value = transport.post_document(&file).await.unwrap();
        assert_eq!(value, serde_json::json!("<html>not json</html>"));
    }

    #[tokio::test]
    async fn test_empty_body_becomes_empty_string() {
        let (url, _) = spawn_stub(StatusCode::NO_CONTENT, "").await;
        let transport = HttpTransport::new(reqwest::Client::new(), url);
        let file = SelectedFile::from_bytes("id.jpg", b"jpeg".to_vec());

        let value = transport.post_document(&file).await.unwrap();
        assert_eq!(value, serde_json::json!(""));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{}/upload", addr)).unwrap();
        let transport = HttpTransport::new(reqwest::Client::new(), url);
        let file = SelectedFile::from_bytes("id.jpg", b"jpeg".to_vec());

        let err = transport.post_document(&file).await.unwrap_err();
        assert!(matches!(err, UploadError::Transport(_)));
    }
}
