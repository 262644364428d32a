//! # Direct Upload Client
//!
//! The client half of the presigned flow: PUT the file bytes to the signed
//! URL and classify what came back.
//!
//! Success means a status in 200..300 and nothing else. Redirects are not
//! followed, so a 3xx is reported as a failure rather than chased. The wait
//! is bounded by a deadline that is reported separately from transport
//! errors. No retries happen here; callers decide whether to request a new
//! grant.

use std::path::Path;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;

use super::errors::{MediaError, MediaResult, UploadError};
use crate::observability::{Event, Logger, Severity};

/// Deadline for the whole PUT exchange
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Bytes to upload plus the metadata the grant was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk. Without an explicit type, one is guessed from the extension.
    pub async fn from_path(path: &Path, content_type: Option<&str>) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let content_type = content_type
            .map(str::to_string)
            .unwrap_or_else(|| guess_content_type(path).to_string());

        Ok(Self::new(name, content_type, bytes))
    }
}

/// Result of one upload attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Succeeded { status: u16 },
    Failed(UploadError),
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Succeeded { .. })
    }

    /// Failed uploads are logged at WARN
    pub fn severity(&self) -> Severity {
        match self {
            UploadOutcome::Succeeded { .. } => Severity::Info,
            UploadOutcome::Failed(_) => Severity::Warn,
        }
    }

    pub fn into_result(self) -> Result<u16, UploadError> {
        match self {
            UploadOutcome::Succeeded { status } => Ok(status),
            UploadOutcome::Failed(e) => Err(e),
        }
    }
}

/// Map a response status to an outcome
pub fn classify_status(file: &str, status: u16) -> UploadOutcome {
    if (200..300).contains(&status) {
        UploadOutcome::Succeeded { status }
    } else {
        UploadOutcome::Failed(UploadError::Status {
            file: file.to_string(),
            status,
        })
    }
}

/// HTTP client for direct-to-storage uploads
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl UploadClient {
    /// Client with the default 60 second deadline
    pub fn new() -> MediaResult<Self> {
        Self::with_timeout(DEFAULT_UPLOAD_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> MediaResult<Self> {
        let http = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(|e| MediaError::Client(e.to_string()))?;
        Ok(Self { http, timeout })
    }

    /// PUT `file` to `url` and report how it went
    pub async fn upload_and_verify(&self, url: &str, file: &UploadFile) -> UploadOutcome {
        let request = self
            .http
            .put(url)
            .header(CONTENT_TYPE, file.content_type.as_str())
            .body(file.bytes.clone())
            .send();

        let outcome = match tokio::time::timeout(self.timeout, request).await {
            Err(_) => UploadOutcome::Failed(UploadError::Timeout {
                file: file.name.clone(),
                after: self.timeout,
            }),
            Ok(Err(e)) if e.is_timeout() => UploadOutcome::Failed(UploadError::Timeout {
                file: file.name.clone(),
                after: self.timeout,
            }),
            Ok(Err(e)) => UploadOutcome::Failed(UploadError::Transport {
                file: file.name.clone(),
                cause: error_chain(&e),
            }),
            Ok(Ok(response)) => classify_status(&file.name, response.status().as_u16()),
        };

        let severity = outcome.severity();
        match &outcome {
            UploadOutcome::Succeeded { status } => Logger::log(
                severity,
                Event::UploadFinished.as_str(),
                &[("file", &file.name), ("status", &status.to_string())],
            ),
            UploadOutcome::Failed(e) => Logger::log(
                severity,
                Event::UploadFinished.as_str(),
                &[("error", &e.to_string()), ("file", &file.name), ("kind", e.kind())],
            ),
        }
        outcome
    }
}

/// Join an error and its sources into one readable line
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn guess_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        Some("mp4") => "video/mp4",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_boundaries() {
        assert!(classify_status("a", 200).is_success());
        assert!(classify_status("a", 204).is_success());
        assert!(classify_status("a", 299).is_success());
        assert!(!classify_status("a", 199).is_success());
        assert!(!classify_status("a", 300).is_success());
        assert!(!classify_status("a", 301).is_success());
        assert!(!classify_status("a", 404).is_success());
        assert!(!classify_status("a", 500).is_success());
    }

    #[test]
    fn test_failed_status_carries_code() {
        let outcome = classify_status("cv.pdf", 403);
        assert_eq!(
            outcome.into_result(),
            Err(UploadError::Status {
                file: "cv.pdf".into(),
                status: 403
            })
        );
    }

    #[test]
    fn test_failed_upload_logs_at_warn() {
        assert_eq!(classify_status("a", 201).severity(), Severity::Info);
        assert_eq!(classify_status("a", 302).severity(), Severity::Warn);
        assert_eq!(classify_status("a", 500).severity(), Severity::Warn);

        let line = Logger::format_line(
            classify_status("a", 500).severity(),
            Event::UploadFinished.as_str(),
            &[("file", "a")],
        );
        assert!(line.contains("WARN"));
        assert!(line.contains("UPLOAD_FINISHED"));
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("a/b/photo.JPG")), "image/jpeg");
        assert_eq!(guess_content_type(Path::new("cv.pdf")), "application/pdf");
        assert_eq!(guess_content_type(Path::new("blob")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_from_path_reads_bytes() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("logo.png");
        tokio::fs::write(&path, b"png-bytes").await.unwrap();

        let file = UploadFile::from_path(&path, None).await.unwrap();
        assert_eq!(file.name, "logo.png");
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.bytes, b"png-bytes");

        let forced = UploadFile::from_path(&path, Some("application/octet-stream"))
            .await
            .unwrap();
        assert_eq!(forced.content_type, "application/octet-stream");
    }
}
