use anyhow::{anyhow, Context, Result};
use colored::*;
use std::path::Path;

use crate::client::InsightClient;
use crate::display::{render_history, render_insight};
use crate::document::UploadRequest;
use crate::state::{HistoryState, HistoryView, UploadFlow, UploadState};

/// How command results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
  Pretty,
  Json,
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
  Ok(())
}

/// Upload a PDF and print the resulting insight
pub async fn upload(client: InsightClient, path: &Path, output: OutputMode) -> Result<()> {
  let document = UploadRequest::from_path(path)?;
  let mut flow = UploadFlow::new(client);
  flow.select(document);

  if let UploadState::Failed { message, .. } = flow.state() {
    return Err(anyhow!("{message}"));
  }
  if let Some(selected) = flow.selected() {
    eprintln!(
      "{} Uploading {} ({})...",
      "⏳".cyan(),
      selected.filename.yellow(),
      selected.size_mb()
    );
  }

  match flow.submit().await {
    UploadState::Succeeded(insight) => {
      match output {
        OutputMode::Json => print_json(insight)?,
        OutputMode::Pretty => {
          eprintln!("{} Analysis complete", "✓".green());
          print!("{}", render_insight(insight));
        }
      }
      Ok(())
    }
    UploadState::Failed { message, .. } => Err(anyhow!("{message}")),
    UploadState::Idle | UploadState::Submitting => Err(anyhow!("Upload did not complete")),
  }
}

/// List previously analysed documents
pub async fn history(client: InsightClient, output: OutputMode) -> Result<()> {
  let mut view = HistoryView::new(client);

  match view.refresh().await {
    HistoryState::Loaded(documents) => {
      match output {
        OutputMode::Json => print_json(documents)?,
        OutputMode::Pretty => print!("{}", render_history(documents)),
      }
      Ok(())
    }
    HistoryState::Errored { message } => Err(anyhow!("{message}")),
    HistoryState::Loading => Err(anyhow!("History did not load")),
  }
}

/// Show one stored insight in full
pub async fn show(client: InsightClient, id: i64, output: OutputMode) -> Result<()> {
  let insight = client.get_insight(id).await.with_context(|| format!("Could not load document #{id}"))?;

  match output {
    OutputMode::Json => print_json(&insight),
    OutputMode::Pretty => {
      print!("{}", render_insight(&insight));
      Ok(())
    }
  }
}

/// Check that the API is reachable
pub async fn ping(client: InsightClient, output: OutputMode) -> Result<()> {
  let base_url = client.config().base_url.clone();
  let body = client.health_check().await.with_context(|| format!("API at {base_url} is unreachable"))?;

  match output {
    OutputMode::Json => print_json(&body)?,
    OutputMode::Pretty => {
      let message = body.get("message").and_then(|m| m.as_str()).unwrap_or("ok");
      println!("{} API reachable at {}: {}", "✓".green(), base_url.cyan(), message);
    }
  }
  Ok(())
}

/// Ask the API whether its AI summarizer is live
pub async fn probe_ai(client: InsightClient, output: OutputMode) -> Result<()> {
  let probe = client.probe_ai().await.context("AI probe request failed")?;

  if output == OutputMode::Json {
    return print_json(&probe);
  }

  if !probe.succeeded() {
    let reason = probe.error.as_deref().unwrap_or("unknown error");
    return Err(anyhow!("AI probe failed: {reason}"));
  }

  if probe.is_ai_generated.unwrap_or(false) {
    println!("{} AI summarization is available", "✓".green());
  } else {
    println!("{} AI summarization is unavailable; uploads will get word frequency analysis", "⚠".yellow());
  }
  if let Some(summary) = &probe.summary {
    println!("  {}", summary.dimmed());
  }
  Ok(())
}
