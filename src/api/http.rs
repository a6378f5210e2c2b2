//! reqwest-backed [`ResourceApi`].
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::path::Path;
use std::time::Duration;

use super::{ListEnvelope, Payload, RecordEnvelope, ResourceApi, UploadResponse};
use crate::error::{ApiError, Result};
use crate::model::{Page, PhotoRef, Record, RecordId, ResourceKind};
use crate::search::QueryState;

pub struct HttpApi {
    http: Client,
    base_url: String,
    upload_endpoint: String,
    token: Option<String>,
}

impl HttpApi {
    /// Client for the API rooted at `base_url` (a trailing `/` is added if missing).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, http))
    }

    /// Same as [`HttpApi::new`] but over a caller-configured client
    /// (proxy settings or TLS roots).
    pub fn with_client(base_url: &str, http: Client) -> Self {
        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            http,
            base_url,
            upload_endpoint: "auth/upload".to_string(),
            token: None,
        }
    }

    pub fn with_upload_endpoint(mut self, endpoint: &str) -> Self {
        self.upload_endpoint = endpoint.trim_start_matches('/').to_string();
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn record_url(&self, kind: ResourceKind, id: &RecordId) -> String {
        self.url(&format!("{}/{}", kind.endpoint(), id))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Turn a non-2xx answer into an [`ApiError`], keeping the body for the log.
    async fn check(resp: Response, id: Option<&RecordId>) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::from_status(status.as_u16(), body, id))
    }
}

#[async_trait]
impl ResourceApi for HttpApi {
    async fn list(&self, kind: ResourceKind, query: &QueryState) -> Result<Page> {
        let req = self.http.get(self.url(kind.endpoint())).query(&[
            ("page", query.page().to_string()),
            ("limit", query.page_size().to_string()),
            ("search", query.search().to_string()),
        ]);
        let resp = Self::check(self.authorize(req).send().await?, None).await?;
        let bytes = resp.bytes().await?;
        let envelope: ListEnvelope = serde_json::from_slice(&bytes)?;
        Ok(envelope.into_page())
    }

    async fn get(&self, kind: ResourceKind, id: &RecordId) -> Result<Record> {
        let req = self.http.get(self.record_url(kind, id));
        let resp = Self::check(self.authorize(req).send().await?, Some(id)).await?;
        let bytes = resp.bytes().await?;
        let envelope: RecordEnvelope = serde_json::from_slice(&bytes)?;
        Ok(envelope.data)
    }

    async fn create(&self, kind: ResourceKind, payload: Payload) -> Result<()> {
        let req = self.http.post(self.url(kind.endpoint())).json(&payload);
        let resp = Self::check(self.authorize(req).send().await?, None).await?;
        if resp.status().as_u16() != 201 {
            tracing::debug!(status = %resp.status(), kind = kind.endpoint(), "create answered without 201");
        }
        Ok(())
    }

    async fn update(&self, kind: ResourceKind, id: &RecordId, payload: Payload) -> Result<()> {
        let req = self.http.put(self.record_url(kind, id)).json(&payload);
        Self::check(self.authorize(req).send().await?, Some(id)).await?;
        Ok(())
    }

    async fn delete(&self, kind: ResourceKind, id: &RecordId) -> Result<()> {
        let req = self.http.delete(self.record_url(kind, id));
        Self::check(self.authorize(req).send().await?, Some(id)).await?;
        Ok(())
    }

    async fn upload_photo(&self, path: &Path) -> Result<PhotoRef> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);
        let req = self.http.post(self.url(&self.upload_endpoint)).multipart(form);
        let resp = Self::check(self.authorize(req).send().await?, None).await?;
        let bytes = resp.bytes().await?;
        let uploaded: UploadResponse = serde_json::from_slice(&bytes)?;
        Ok(uploaded.photo)
    }
}
