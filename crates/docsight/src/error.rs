use std::time::Duration;
use thiserror::Error;

/// Which bucket of the failure taxonomy an error falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  Timeout,
  Server,
  Network,
  Fetch,
}

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("{message}")]
  Validation { message: String },

  #[error("No response within {}s", .after.as_secs())]
  Timeout { after: Duration },

  #[error("{detail}")]
  Server { status: u16, detail: String },

  #[error("Request failed: {message}")]
  Network { message: String },

  #[error("Failed to load document history: {source}")]
  Fetch {
    #[source]
    source: Box<ClientError>,
  },
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation { message: message.into() }
  }

  pub fn network(message: impl Into<String>) -> Self {
    Self::Network { message: message.into() }
  }

  pub fn fetch(source: ClientError) -> Self {
    match source {
      already @ Self::Fetch { .. } => already,
      other => Self::Fetch { source: Box::new(other) },
    }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation { .. } => ErrorKind::Validation,
      Self::Timeout { .. } => ErrorKind::Timeout,
      Self::Server { .. } => ErrorKind::Server,
      Self::Network { .. } => ErrorKind::Network,
      Self::Fetch { .. } => ErrorKind::Fetch,
    }
  }

  /// Message shown to the user after a failed upload
  pub fn upload_message(&self) -> String {
    match self {
      Self::Validation { message } => message.clone(),
      Self::Timeout { .. } => "Upload timeout. Please try again.".to_string(),
      Self::Server { detail, .. } => detail.clone(),
      Self::Network { .. } | Self::Fetch { .. } => {
        "Failed to upload file. Please try again.".to_string()
      }
    }
  }
}

impl From<reqwest::Error> for ClientError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      Self::network(format!("malformed response body: {err}"))
    } else {
      Self::network(err.to_string())
    }
  }
}
