//! Display formatting utilities for CLI output

use colored::*;

use crate::types::{Insight, SummaryKind};

pub const SUMMARY_PREVIEW_CHARS: usize = 150;
const WRAP_WIDTH: usize = 80;

/// Short badge for list rows
pub fn kind_label(kind: SummaryKind) -> &'static str {
  match kind {
    SummaryKind::Ai => "AI Summary",
    SummaryKind::WordFrequency => "Word Analysis",
  }
}

/// `Jan 5, 2024, 09:30 AM`, or the raw value if it can't be parsed
pub fn format_date_short(insight: &Insight) -> String {
  match insight.uploaded_at() {
    Some(dt) => dt.format("%b %-d, %Y, %I:%M %p").to_string(),
    None => insight.upload_date.clone(),
  }
}

/// `January 5, 2024, 09:30 AM`, or the raw value if it can't be parsed
pub fn format_date_long(insight: &Insight) -> String {
  match insight.uploaded_at() {
    Some(dt) => dt.format("%B %-d, %Y, %I:%M %p").to_string(),
    None => insight.upload_date.clone(),
  }
}

/// Cut a summary to `max_chars` characters, marking the cut with `...`
pub fn truncate_summary(summary: &str, max_chars: usize) -> String {
  if summary.chars().count() <= max_chars {
    return summary.to_string();
  }
  let cut: String = summary.chars().take(max_chars).collect();
  format!("{cut}...")
}

/// Wrap text to fit within a specified width
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let mut current_line = String::new();
    for word in paragraph.split_whitespace() {
      if current_line.is_empty() {
        current_line = word.to_string();
      } else if current_line.chars().count() + 1 + word.chars().count() <= width {
        current_line.push(' ');
        current_line.push_str(word);
      } else {
        lines.push(std::mem::take(&mut current_line));
        current_line = word.to_string();
      }
    }

    if !current_line.is_empty() {
      lines.push(current_line);
    }
  }

  lines
}

fn badge(kind: SummaryKind) -> ColoredString {
  match kind {
    SummaryKind::Ai => kind_label(kind).green().bold(),
    SummaryKind::WordFrequency => kind_label(kind).yellow().bold(),
  }
}

/// One row of the history listing
pub fn render_history_entry(insight: &Insight) -> String {
  let mut out = format!(
    "{} {} {}\n",
    "📄".cyan(),
    insight.filename.bold(),
    format!("#{}", insight.id).dimmed()
  );
  out.push_str(&format!(
    "   {} · {} · {} words\n",
    format_date_short(insight).cyan(),
    badge(insight.kind()),
    insight.word_count
  ));
  for line in wrap_text(&truncate_summary(&insight.summary, SUMMARY_PREVIEW_CHARS), WRAP_WIDTH - 3) {
    out.push_str(&format!("   {line}\n"));
  }
  out
}

pub fn render_history(documents: &[Insight]) -> String {
  if documents.is_empty() {
    return format!(
      "{}\nUpload your first PDF document to see it appear here.\n",
      "No documents yet.".bold()
    );
  }

  let mut out = format!("{} Document history ({})\n\n", "📚".cyan(), documents.len());
  for insight in documents {
    out.push_str(&render_history_entry(insight));
    out.push('\n');
  }
  out
}

/// Full view of a single insight
pub fn render_insight(insight: &Insight) -> String {
  let kind = insight.kind();
  let mut out = format!("=== {} ===\n", insight.filename.blue().bold());
  out.push_str(&format!("Uploaded on {}\n", format_date_long(insight).cyan()));
  out.push_str(&format!(
    "Document #{} · {} words · {}\n\n",
    insight.id,
    insight.word_count,
    badge(kind)
  ));

  match kind {
    SummaryKind::Ai => {
      out.push_str(&format!("{}\n", "AI Summary".green().bold()));
      for line in wrap_text(&insight.summary, WRAP_WIDTH) {
        out.push_str(&format!("{line}\n"));
      }
    }
    SummaryKind::WordFrequency => {
      out.push_str(&format!("{}\n", "Word Frequency Analysis".yellow().bold()));
      out.push_str(&format!(
        "{}\n",
        "AI service was unavailable, so this is a word frequency analysis instead.".dimmed()
      ));
      let words = insight.word_frequencies();
      if words.is_empty() {
        for line in wrap_text(&insight.summary, WRAP_WIDTH) {
          out.push_str(&format!("{line}\n"));
        }
      } else {
        out.push_str(&render_word_table(&words));
      }
    }
  }
  out
}

fn render_word_table(words: &[(String, u64)]) -> String {
  let width = words.iter().map(|(w, _)| w.chars().count()).max().unwrap_or(0);
  let top = words.iter().map(|(_, n)| *n).max().unwrap_or(1).max(1);

  let mut out = String::new();
  for (word, count) in words {
    let bar_len = ((*count as f64 / top as f64) * 30.0).ceil() as usize;
    out.push_str(&format!(
      "  {word:<width$}  {:>5}  {}\n",
      count,
      "█".repeat(bar_len).yellow()
    ));
  }
  out
}
