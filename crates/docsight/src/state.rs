//! Upload and history lifecycles as closed sets of states

use crate::client::InsightApi;
use crate::document::UploadRequest;
use crate::error::{ClientError, ErrorKind};
use crate::types::Insight;

pub const NO_FILE_MESSAGE: &str = "Please select a file first";
pub const HISTORY_ERROR_MESSAGE: &str = "Failed to load document history";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadState {
  #[default]
  Idle,
  Submitting,
  Succeeded(Insight),
  Failed { kind: ErrorKind, message: String },
}

impl UploadState {
  fn failed(err: &ClientError) -> Self {
    Self::Failed { kind: err.kind(), message: err.upload_message() }
  }

  pub fn is_submitting(&self) -> bool {
    matches!(self, Self::Submitting)
  }
}

/// Drives one upload at a time against an [`InsightApi`]
pub struct UploadFlow<A> {
  api: A,
  selected: Option<UploadRequest>,
  state: UploadState,
}

impl<A: InsightApi> UploadFlow<A> {
  pub fn new(api: A) -> Self {
    Self { api, selected: None, state: UploadState::Idle }
  }

  pub fn state(&self) -> &UploadState {
    &self.state
  }

  pub fn selected(&self) -> Option<&UploadRequest> {
    self.selected.as_ref()
  }

  /// Stage a document. Non-PDFs leave the previous selection in place.
  pub fn select(&mut self, document: UploadRequest) {
    match document.ensure_pdf() {
      Ok(()) => {
        self.selected = Some(document);
        if matches!(self.state, UploadState::Failed { .. }) {
          self.state = UploadState::Idle;
        }
      }
      Err(err) => self.state = UploadState::failed(&err),
    }
  }

  pub fn clear(&mut self) {
    self.selected = None;
    self.state = UploadState::Idle;
  }

  /// Submit the staged document and settle into `Succeeded` or `Failed`.
  ///
  /// A flow whose previous submit was dropped mid-flight is left in `Submitting`;
  /// calling this again starts a fresh request.
  pub async fn submit(&mut self) -> &UploadState {
    let Some(document) = self.selected.as_ref() else {
      self.state = UploadState::Failed {
        kind: ErrorKind::Validation,
        message: NO_FILE_MESSAGE.to_string(),
      };
      return &self.state;
    };

    self.state = UploadState::Submitting;
    let outcome = self.api.submit_document(document).await;
    self.state = match outcome {
      Ok(insight) => {
        self.selected = None;
        UploadState::Succeeded(insight)
      }
      Err(err) => {
        tracing::debug!(error = %err, "upload failed");
        UploadState::failed(&err)
      }
    };
    &self.state
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryState {
  Loading,
  Loaded(Vec<Insight>),
  Errored { message: String },
}

/// Insight history with a stale-is-acceptable refresh policy
pub struct HistoryView<A> {
  api: A,
  state: HistoryState,
  last_good: Vec<Insight>,
}

impl<A: InsightApi> HistoryView<A> {
  pub fn new(api: A) -> Self {
    Self { api, state: HistoryState::Loading, last_good: Vec::new() }
  }

  pub fn state(&self) -> &HistoryState {
    &self.state
  }

  /// Documents to display: the latest successful fetch, even after a failed refresh
  pub fn documents(&self) -> &[Insight] {
    &self.last_good
  }

  pub async fn refresh(&mut self) -> &HistoryState {
    self.state = HistoryState::Loading;
    let outcome = self.api.list_insights().await;
    self.state = match outcome {
      Ok(documents) => {
        self.last_good = documents.clone();
        HistoryState::Loaded(documents)
      }
      Err(err) => {
        tracing::debug!(error = %err, "history refresh failed");
        HistoryState::Errored { message: HISTORY_ERROR_MESSAGE.to_string() }
      }
    };
    &self.state
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::client::MockInsightApi;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::time::Duration;

  fn insight(id: i64) -> Insight {
    Insight {
      id,
      filename: format!("doc-{id}.pdf"),
      upload_date: "2024-01-01T00:00:00Z".to_string(),
      word_count: 100,
      is_ai_generated: true,
      summary: "A short summary.".to_string(),
    }
  }

  fn pdf() -> UploadRequest {
    UploadRequest::new("report.pdf", b"%PDF-1.7".to_vec())
  }

  #[tokio::test]
  async fn test_submit_without_selection_makes_no_call() {
    let mut api = MockInsightApi::new();
    api.expect_submit_document().times(0);

    let mut flow = UploadFlow::new(api);
    let state = flow.submit().await.clone();
    assert_eq!(
      state,
      UploadState::Failed { kind: ErrorKind::Validation, message: NO_FILE_MESSAGE.to_string() }
    );
  }

  #[tokio::test]
  async fn test_non_pdf_selection_is_rejected() {
    let mut api = MockInsightApi::new();
    api.expect_submit_document().times(0);

    let mut flow = UploadFlow::new(api);
    flow.select(pdf());
    flow.select(UploadRequest::new("notes.txt", b"hi".to_vec()));

    assert_eq!(
      flow.state(),
      &UploadState::Failed {
        kind: ErrorKind::Validation,
        message: "Please select a PDF file".to_string()
      }
    );
    assert_eq!(flow.selected().map(|d| d.filename.as_str()), Some("report.pdf"));

    flow.select(pdf());
    assert_eq!(flow.state(), &UploadState::Idle);
  }

  #[tokio::test]
  async fn test_successful_submit_clears_selection() {
    let mut api = MockInsightApi::new();
    api
      .expect_submit_document()
      .withf(|doc| doc.filename == "report.pdf")
      .times(1)
      .returning(|_| Ok(insight(7)));

    let mut flow = UploadFlow::new(api);
    flow.select(pdf());
    let state = flow.submit().await.clone();

    assert_eq!(state, UploadState::Succeeded(insight(7)));
    assert!(flow.selected().is_none());
  }

  #[tokio::test]
  async fn test_failed_submit_keeps_selection_for_retry() {
    let mut api = MockInsightApi::new();
    let mut calls = 0;
    api.expect_submit_document().times(2).returning(move |_| {
      calls += 1;
      if calls == 1 {
        Err(ClientError::Timeout { after: Duration::from_secs(60) })
      } else {
        Ok(insight(8))
      }
    });

    let mut flow = UploadFlow::new(api);
    flow.select(pdf());

    let first = flow.submit().await.clone();
    assert_eq!(
      first,
      UploadState::Failed {
        kind: ErrorKind::Timeout,
        message: "Upload timeout. Please try again.".to_string()
      }
    );
    assert!(flow.selected().is_some());

    let second = flow.submit().await.clone();
    assert_eq!(second, UploadState::Succeeded(insight(8)));
  }

  #[tokio::test]
  async fn test_server_detail_surfaces_verbatim() {
    let mut api = MockInsightApi::new();
    api.expect_submit_document().times(1).returning(|_| {
      Err(ClientError::Server { status: 400, detail: "Could not extract text from PDF".to_string() })
    });

    let mut flow = UploadFlow::new(api);
    flow.select(pdf());
    let state = flow.submit().await.clone();
    assert_eq!(
      state,
      UploadState::Failed {
        kind: ErrorKind::Server,
        message: "Could not extract text from PDF".to_string()
      }
    );
  }

  #[tokio::test]
  async fn test_history_keeps_stale_list_on_error() {
    let mut api = MockInsightApi::new();
    let mut calls = 0;
    api.expect_list_insights().times(2).returning(move || {
      calls += 1;
      if calls == 1 {
        Ok(vec![insight(1), insight(2)])
      } else {
        Err(ClientError::fetch(ClientError::network("connection reset")))
      }
    });

    let mut view = HistoryView::new(api);
    assert_eq!(view.state(), &HistoryState::Loading);

    let loaded = view.refresh().await.clone();
    assert_eq!(loaded, HistoryState::Loaded(vec![insight(1), insight(2)]));

    let errored = view.refresh().await.clone();
    assert_eq!(errored, HistoryState::Errored { message: HISTORY_ERROR_MESSAGE.to_string() });
    assert_eq!(view.documents().len(), 2);
  }

  #[tokio::test]
  async fn test_empty_history_is_loaded_not_errored() {
    let mut api = MockInsightApi::new();
    api.expect_list_insights().times(1).returning(|| Ok(Vec::new()));

    let mut view = HistoryView::new(api);
    assert_eq!(view.refresh().await, &HistoryState::Loaded(Vec::new()));
    assert!(view.documents().is_empty());
  }

  /// Hangs on its first upload, answers immediately afterwards
  struct StallFirstUpload {
    calls: AtomicUsize,
  }

  #[async_trait::async_trait]
  impl InsightApi for StallFirstUpload {
    async fn submit_document(&self, document: &UploadRequest) -> crate::error::Result<Insight> {
      if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_secs(3600)).await;
      }
      Ok(Insight { filename: document.filename.clone(), ..insight(5) })
    }

    async fn list_insights(&self) -> crate::error::Result<Vec<Insight>> {
      Ok(Vec::new())
    }
  }

  #[tokio::test]
  async fn test_abandoned_submit_can_be_retried() {
    let mut flow = UploadFlow::new(StallFirstUpload { calls: AtomicUsize::new(0) });
    flow.select(pdf());

    let abandoned = tokio::time::timeout(Duration::from_millis(50), flow.submit()).await;
    assert!(abandoned.is_err());
    assert!(flow.state().is_submitting());

    let state = flow.submit().await.clone();
    assert_eq!(flow.api.calls.load(Ordering::SeqCst), 2);
    assert!(matches!(state, UploadState::Succeeded(ref insight) if insight.filename == "report.pdf"));
    assert!(flow.selected().is_none());
  }
}
