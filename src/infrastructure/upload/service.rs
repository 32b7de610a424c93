//! Upload service adapter
//!
//! MP4 recordings are `PUT` straight to object storage through a presigned
//! URL handed out by the service. Everything else is posted to the service
//! as a multipart form. Uploaded files are fetched back by key.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info};

use crate::application::ports::{UploadError, Uploader};
use crate::domain::recording::RecordingArtifact;
use crate::domain::upload::{upload_route, UploadReceipt, UploadRoute};

const UPLOAD_URL_PATH: &str = "get-upload-url";
const UPLOAD_PATH: &str = "upload";
const DOWNLOAD_PATH: &str = "download";

/// Multipart field carrying the file
const FILE_FIELD: &str = "file";

/// Response from the presign endpoint
#[derive(Debug, Deserialize)]
struct UploadUrlResponse {
    upload_url: String,
    bucket: String,
    key: String,
}

/// Response from the multipart upload endpoint
#[derive(Debug, Deserialize)]
struct UploadResponse {
    file_name: String,
    bucket: String,
    key: String,
}

/// Client for the upload service
pub struct UploadServiceClient {
    endpoint: Option<String>,
    client: reqwest::Client,
}

impl UploadServiceClient {
    /// Create a client for the given service base URL
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint: endpoint.filter(|e| !e.trim().is_empty()),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> Result<&str, UploadError> {
        self.endpoint.as_deref().ok_or(UploadError::NotConfigured)
    }

    /// Join a service path onto the base URL
    fn url(endpoint: &str, path: &str) -> String {
        format!("{}/{}", endpoint.trim_end_matches('/'), path)
    }

    async fn presigned(
        &self,
        endpoint: &str,
        artifact: &RecordingArtifact,
    ) -> Result<UploadReceipt, UploadError> {
        let response = self
            .client
            .get(Self::url(endpoint, UPLOAD_URL_PATH))
            .send()
            .await
            .map_err(network_error)?;
        let presigned: UploadUrlResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;
        debug!(bucket = %presigned.bucket, key = %presigned.key, "got presigned upload url");

        let response = self
            .client
            .put(&presigned.upload_url)
            .header(reqwest::header::CONTENT_TYPE, artifact.mime_type())
            .body(artifact.data().to_vec())
            .send()
            .await
            .map_err(network_error)?;
        check(response).await?;

        Ok(UploadReceipt {
            bucket: presigned.bucket,
            key: presigned.key,
        })
    }

    async fn multipart(
        &self,
        endpoint: &str,
        artifact: &RecordingArtifact,
    ) -> Result<UploadReceipt, UploadError> {
        let part = Part::bytes(artifact.data().to_vec())
            .file_name(format!("recording.{}", artifact.container().extension()))
            .mime_str(artifact.mime_type())
            .map_err(|e| UploadError::NetworkError(e.to_string()))?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .client
            .post(Self::url(endpoint, UPLOAD_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(network_error)?;
        let uploaded: UploadResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;
        debug!(file_name = %uploaded.file_name, "service stored upload");

        Ok(UploadReceipt {
            bucket: uploaded.bucket,
            key: uploaded.key,
        })
    }
}

#[async_trait]
impl Uploader for UploadServiceClient {
    async fn upload(&self, artifact: &RecordingArtifact) -> Result<UploadReceipt, UploadError> {
        let endpoint = self.endpoint()?;

        let route = upload_route(artifact.mime_type());
        let receipt = match route {
            UploadRoute::Presigned => self.presigned(endpoint, artifact).await?,
            UploadRoute::Multipart => self.multipart(endpoint, artifact).await?,
        };

        info!(
            key = %receipt.key,
            route = ?route,
            size = %artifact.human_readable_size(),
            "upload complete"
        );
        Ok(receipt)
    }

    async fn fetch(&self, key: &str) -> Result<Vec<u8>, UploadError> {
        let endpoint = self.endpoint()?;

        let response = self
            .client
            .get(Self::url(endpoint, DOWNLOAD_PATH))
            .query(&[("file_name", key)])
            .send()
            .await
            .map_err(network_error)?;
        let bytes = check(response)
            .await?
            .bytes()
            .await
            .map_err(network_error)?;

        debug!(key, size = bytes.len(), "fetched upload");
        Ok(bytes.to_vec())
    }
}

fn network_error(e: reqwest::Error) -> UploadError {
    UploadError::NetworkError(e.to_string())
}

/// Turn a non-success status into an API error carrying the body
async fn check(response: reqwest::Response) -> Result<reqwest::Response, UploadError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(UploadError::ApiError {
        status: status.as_u16(),
        message,
    })
}
