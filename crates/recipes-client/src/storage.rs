//! Image storage over HTTP

use async_trait::async_trait;
use recipes_forms::{ImageFile, ImageStorage, UploadError};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;

/// Multipart upload to `upload_url`; the response names the stored URL
pub struct HttpImageStorage {
    upload_url: String,
    client: reqwest::Client,
}

impl HttpImageStorage {
    pub fn new(upload_url: &str) -> Self {
        Self {
            upload_url: upload_url.to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn read(resp: reqwest::Response) -> Result<Value, UploadError> {
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| UploadError::Unreachable(e.to_string()))?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        if status.is_success() {
            Ok(body)
        } else {
            Err(UploadError::Rejected(ApiError::from_status(status, &body).to_string()))
        }
    }
}

#[async_trait]
impl ImageStorage for HttpImageStorage {
    async fn upload(&self, file: &ImageFile, path: &str) -> Result<String, UploadError> {
        debug!(%path, file = %file.file_name, "uploading image");
        let part = Part::bytes(file.data.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| UploadError::Rejected(e.to_string()))?;
        let form = Form::new().text("path", path.to_string()).part("file", part);

        let resp = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Unreachable(e.to_string()))?;

        let body = Self::read(resp).await?;
        body.get("url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(UploadError::MissingUrl)
    }

    async fn delete(&self, url: &str) -> Result<(), UploadError> {
        debug!(%url, "deleting image");
        let resp = self
            .client
            .delete(&self.upload_url)
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| UploadError::Unreachable(e.to_string()))?;
        Self::read(resp).await.map(|_| ())
    }
}
