//! HTTP client for the document insight API
//!
//! A thin request/response mapping layer. Every call issues exactly one
//! request, is bounded by a client-side timeout, and maps whatever comes
//! back onto [`ClientError`]. Nothing is retried.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::document::{UploadRequest, PDF_MIME};
use crate::error::{ClientError, Result};
use crate::types::{AiProbe, ErrorPayload, Insight, InsightList};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";
pub const UPLOAD_FIELD: &str = "file";

/// Connection settings for [`InsightClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
  /// Base URL of the analysis API (e.g., "http://localhost:8001")
  pub base_url: String,
  /// Upload and AI probe timeout in seconds
  pub upload_timeout_secs: u64,
  /// History and single-document timeout in seconds
  pub list_timeout_secs: u64,
  /// Health check timeout in seconds
  pub probe_timeout_secs: u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
      upload_timeout_secs: 60,
      list_timeout_secs: 30,
      probe_timeout_secs: 5,
    }
  }
}

impl ClientConfig {
  pub fn with_base_url(base_url: impl Into<String>) -> Self {
    Self { base_url: base_url.into(), ..Self::default() }
  }
}

/// Operations the rest of the crate needs from the analysis API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InsightApi: Send + Sync {
  async fn submit_document(&self, document: &UploadRequest) -> Result<Insight>;
  async fn list_insights(&self) -> Result<Vec<Insight>>;
}

/// HTTP client for the analysis API
pub struct InsightClient {
  client: Client,
  config: ClientConfig,
}

impl InsightClient {
  pub fn new() -> Result<Self> {
    Self::with_config(ClientConfig::default())
  }

  pub fn with_config(mut config: ClientConfig) -> Result<Self> {
    config.base_url = config.base_url.trim_end_matches('/').to_string();

    let client = Client::builder()
      .user_agent(concat!("docsight/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| ClientError::network(format!("Failed to create HTTP client: {e}")))?;

    Ok(Self { client, config })
  }

  pub fn config(&self) -> &ClientConfig {
    &self.config
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.config.base_url)
  }

  /// Upload a PDF and wait for its insight.
  ///
  /// Non-PDF input is rejected before anything touches the network.
  pub async fn submit_document(&self, document: &UploadRequest) -> Result<Insight> {
    document.ensure_pdf()?;

    let part = Part::bytes(document.bytes.clone())
      .file_name(document.filename.clone())
      .mime_str(PDF_MIME)?;
    let form = Form::new().part(UPLOAD_FIELD, part);

    tracing::debug!(filename = %document.filename, size = document.size(), "uploading document");
    let request = self.client.post(self.url("/upload-resume")).multipart(form);
    let (status, body) =
      self.exchange(request, Duration::from_secs(self.config.upload_timeout_secs)).await?;
    decode(status, &body)
  }

  /// Fetch every stored insight. A body without `documents` is an empty history.
  pub async fn list_insights(&self) -> Result<Vec<Insight>> {
    let request = self.client.get(self.url("/insights"));
    let list: InsightList = self
      .exchange(request, Duration::from_secs(self.config.list_timeout_secs))
      .await
      .and_then(|(status, body)| decode(status, &body))
      .map_err(ClientError::fetch)?;
    Ok(list.into_documents())
  }

  /// Fetch a single insight by id
  pub async fn get_insight(&self, id: i64) -> Result<Insight> {
    if id < 1 {
      return Err(ClientError::validation(format!("Invalid document id: {id}")));
    }
    let request = self.client.get(self.url("/insights")).query(&[("document_id", id)]);
    let (status, body) =
      self.exchange(request, Duration::from_secs(self.config.list_timeout_secs)).await?;
    decode(status, &body)
  }

  /// Check that the API answers on its root endpoint
  pub async fn health_check(&self) -> Result<serde_json::Value> {
    let request = self.client.get(self.url("/"));
    let (status, body) =
      self.exchange(request, Duration::from_secs(self.config.probe_timeout_secs)).await?;
    decode(status, &body)
  }

  /// Ask the API to summarize a canned text, reporting whether AI or the fallback answered
  pub async fn probe_ai(&self) -> Result<AiProbe> {
    let request = self.client.get(self.url("/test-ai"));
    let (status, body) =
      self.exchange(request, Duration::from_secs(self.config.upload_timeout_secs)).await?;
    decode(status, &body)
  }

  async fn exchange(
    &self,
    request: RequestBuilder,
    limit: Duration,
  ) -> Result<(StatusCode, Vec<u8>)> {
    let started = Instant::now();
    let round_trip = async {
      let response = request.send().await?;
      let status = response.status();
      let body = response.bytes().await?;
      Ok::<_, reqwest::Error>((status, body.to_vec()))
    };

    match timeout(limit, round_trip).await {
      Err(_) => {
        tracing::debug!(limit_secs = limit.as_secs(), "request timed out");
        Err(ClientError::Timeout { after: limit })
      }
      Ok(Err(e)) if e.is_timeout() => Err(ClientError::Timeout { after: limit }),
      Ok(Err(e)) => {
        tracing::debug!(error = %e, "request failed");
        Err(e.into())
      }
      Ok(Ok((status, body))) => {
        tracing::debug!(
          status = status.as_u16(),
          elapsed_ms = started.elapsed().as_millis() as u64,
          "response received"
        );
        Ok((status, body))
      }
    }
  }
}

#[async_trait]
impl InsightApi for InsightClient {
  async fn submit_document(&self, document: &UploadRequest) -> Result<Insight> {
    InsightClient::submit_document(self, document).await
  }

  async fn list_insights(&self) -> Result<Vec<Insight>> {
    InsightClient::list_insights(self).await
  }
}

fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T> {
  if !status.is_success() {
    let detail = serde_json::from_slice::<ErrorPayload>(body).ok().and_then(|p| p.message());
    return Err(match detail {
      Some(detail) => ClientError::Server { status: status.as_u16(), detail },
      None => ClientError::network(format!("HTTP {status}")),
    });
  }

  serde_json::from_slice(body)
    .map_err(|e| ClientError::network(format!("malformed response body: {e}")))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::ErrorKind;

  #[test]
  fn test_default_config() {
    let config = ClientConfig::default();
    assert_eq!(config.base_url, "http://localhost:8001");
    assert_eq!(config.upload_timeout_secs, 60);
    assert_eq!(config.list_timeout_secs, 30);
  }

  #[test]
  fn test_trailing_slash_trimmed() {
    let client = InsightClient::with_config(ClientConfig::with_base_url("http://api.test/")).unwrap();
    assert_eq!(client.url("/insights"), "http://api.test/insights");
  }

  #[test]
  fn test_decode_error_with_detail() {
    let err = decode::<Insight>(StatusCode::NOT_FOUND, br#"{"detail":"Document not found"}"#)
      .unwrap_err();
    match err {
      ClientError::Server { status, detail } => {
        assert_eq!(status, 404);
        assert_eq!(detail, "Document not found");
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn test_decode_error_without_detail() {
    let err = decode::<Insight>(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.to_string(), "Request failed: HTTP 502 Bad Gateway");
  }

  #[test]
  fn test_decode_malformed_success_body() {
    let err = decode::<Insight>(StatusCode::OK, br#"{"id":"seven"}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
  }

  #[tokio::test]
  async fn test_non_pdf_rejected_before_request() {
    // Nothing listens on this port; reaching the network would surface as Network, not Validation.
    let client = InsightClient::with_config(ClientConfig::with_base_url("http://127.0.0.1:9")).unwrap();
    let doc = UploadRequest::new("notes.txt", b"plain".to_vec());
    let err = client.submit_document(&doc).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
  }
}
