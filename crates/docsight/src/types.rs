//! Wire types exchanged with the document insight API

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Server-produced record summarizing one uploaded document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
  pub id: i64,
  pub filename: String,
  /// Upload timestamp exactly as the server sent it
  pub upload_date: String,
  pub word_count: u64,
  #[serde(deserialize_with = "bool_or_int")]
  pub is_ai_generated: bool,
  pub summary: String,
}

/// How an insight's summary should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
  /// Prose produced by the upstream summarizer
  Ai,
  /// Word-frequency report produced when the summarizer is unavailable
  WordFrequency,
}

impl Insight {
  pub fn kind(&self) -> SummaryKind {
    if self.is_ai_generated {
      SummaryKind::Ai
    } else {
      SummaryKind::WordFrequency
    }
  }

  /// Parse `upload_date`, accepting RFC 3339 as well as the naive ISO-8601
  /// form the server writes for freshly stored documents.
  pub fn uploaded_at(&self) -> Option<NaiveDateTime> {
    parse_upload_date(&self.upload_date)
  }

  /// Word counts from a fallback report, most frequent first.
  ///
  /// Empty for AI summaries and for reports that don't follow the
  /// `Top N most frequent words: word (n), ...` layout.
  pub fn word_frequencies(&self) -> Vec<(String, u64)> {
    match self.kind() {
      SummaryKind::Ai => Vec::new(),
      SummaryKind::WordFrequency => parse_word_frequencies(&self.summary),
    }
  }
}

pub fn parse_upload_date(raw: &str) -> Option<NaiveDateTime> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.naive_utc());
  }
  NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

pub fn parse_word_frequencies(summary: &str) -> Vec<(String, u64)> {
  let Some((_, list)) = summary.split_once(':') else {
    return Vec::new();
  };

  let mut words = Vec::new();
  for entry in list.split(',') {
    let entry = entry.trim();
    let Some((word, rest)) = entry.split_once(" (") else {
      return Vec::new();
    };
    let Some(count) = rest.strip_suffix(')').and_then(|n| n.parse().ok()) else {
      return Vec::new();
    };
    words.push((word.to_string(), count));
  }
  words
}

/// Response body of `GET /insights`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsightList {
  #[serde(default)]
  pub documents: Option<Vec<Insight>>,
}

impl InsightList {
  pub fn into_documents(self) -> Vec<Insight> {
    self.documents.unwrap_or_default()
  }
}

/// Error body the API attaches to non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
  #[serde(default)]
  pub detail: Option<serde_json::Value>,
}

impl ErrorPayload {
  /// Human-readable message, if the payload carries one.
  ///
  /// Plain string details are returned verbatim; request-validation
  /// arrays (`[{ "msg": ... }]`) are flattened into one line.
  pub fn message(&self) -> Option<String> {
    match self.detail.as_ref()? {
      serde_json::Value::String(detail) => Some(detail.clone()),
      serde_json::Value::Array(items) => {
        let msgs: Vec<&str> =
          items.iter().filter_map(|item| item.get("msg").and_then(|m| m.as_str())).collect();
        if msgs.is_empty() {
          None
        } else {
          Some(msgs.join("; "))
        }
      }
      _ => None,
    }
  }
}

/// Response body of `GET /test-ai`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiProbe {
  pub status: String,
  #[serde(default)]
  pub summary: Option<String>,
  #[serde(default)]
  pub is_ai_generated: Option<bool>,
  #[serde(default)]
  pub error: Option<String>,
}

impl AiProbe {
  pub fn succeeded(&self) -> bool {
    self.status == "success"
  }
}

// SQLite hands booleans back as 0/1, and the history endpoint passes them through.
fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Flag {
    Bool(bool),
    Int(i64),
  }

  match Flag::deserialize(deserializer)? {
    Flag::Bool(b) => Ok(b),
    Flag::Int(0) => Ok(false),
    Flag::Int(1) => Ok(true),
    Flag::Int(other) => {
      Err(serde::de::Error::custom(format!("expected boolean or 0/1, got {other}")))
    }
  }
}
