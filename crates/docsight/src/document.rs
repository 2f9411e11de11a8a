//! Local documents staged for upload

use std::path::Path;

use crate::error::{ClientError, Result};

pub const PDF_MIME: &str = "application/pdf";

/// A file read into memory, ready to be sent as a multipart part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
  pub filename: String,
  pub mime_type: String,
  pub bytes: Vec<u8>,
}

impl UploadRequest {
  /// Wrap in-memory bytes, guessing the MIME type from the file name.
  pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
    let filename = filename.into();
    let mime_type = sniff_mime(&filename);
    Self { filename, mime_type, bytes }
  }

  /// Wrap bytes with an explicitly supplied MIME type.
  pub fn with_mime(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
    Self { filename: filename.into(), mime_type: mime_type.into(), bytes }
  }

  pub fn from_path(path: &Path) -> Result<Self> {
    let filename = path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .ok_or_else(|| ClientError::validation(format!("Not a file: {}", path.display())))?;

    let bytes = std::fs::read(path)
      .map_err(|e| ClientError::validation(format!("Cannot read {}: {e}", path.display())))?;

    Ok(Self::new(filename, bytes))
  }

  pub fn size(&self) -> u64 {
    self.bytes.len() as u64
  }

  /// Size in megabytes, rendered with two decimals
  pub fn size_mb(&self) -> String {
    format!("{:.2} MB", self.size() as f64 / 1024.0 / 1024.0)
  }

  pub fn is_pdf(&self) -> bool {
    self.mime_type == PDF_MIME
  }

  /// Fail unless this is a PDF.
  pub fn ensure_pdf(&self) -> Result<()> {
    if self.is_pdf() {
      Ok(())
    } else {
      Err(ClientError::validation("Please select a PDF file"))
    }
  }
}

/// MIME type inferred from the file extension, `application/octet-stream` when unknown
pub fn sniff_mime(filename: &str) -> String {
  mime_guess::from_path(filename).first_or_octet_stream().essence_str().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_sniff_by_extension() {
    assert_eq!(sniff_mime("report.pdf"), PDF_MIME);
    assert_eq!(sniff_mime("REPORT.PDF"), PDF_MIME);
    assert_eq!(sniff_mime("notes.txt"), "text/plain");
    assert_eq!(sniff_mime("no_extension"), "application/octet-stream");
  }

  #[test]
  fn test_ensure_pdf() {
    assert!(UploadRequest::new("cv.pdf", b"%PDF-1.7".to_vec()).ensure_pdf().is_ok());

    let err = UploadRequest::new("cv.txt", b"hello".to_vec()).ensure_pdf().unwrap_err();
    assert_eq!(err.to_string(), "Please select a PDF file");
  }

  #[test]
  fn test_explicit_mime_wins() {
    let doc = UploadRequest::with_mime("scan", PDF_MIME, vec![0; 4]);
    assert!(doc.is_pdf());
  }

  #[test]
  fn test_size_mb() {
    let doc = UploadRequest::new("big.pdf", vec![0; 2 * 1024 * 1024]);
    assert_eq!(doc.size(), 2_097_152);
    assert_eq!(doc.size_mb(), "2.00 MB");
  }

  #[test]
  fn test_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resume.pdf");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"%PDF-1.4 body").unwrap();

    let doc = UploadRequest::from_path(&path).unwrap();
    assert_eq!(doc.filename, "resume.pdf");
    assert_eq!(doc.bytes, b"%PDF-1.4 body");
    assert!(doc.is_pdf());

    assert!(UploadRequest::from_path(&dir.path().join("missing.pdf")).is_err());
  }
}
