//! # Presigned Upload Coordinator
//!
//! Issues upload grants: a derived object key plus a short-lived signed
//! write URL. The server keeps no record of issued grants; the URL's
//! signature and expiry are the whole authorization.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{MediaError, MediaResult};
use crate::auth::Identity;
use crate::file_storage::{UrlSigner, WriteUrlRequest};
use crate::observability::{log_event, Event};

/// Longest filename segment kept in an object key
const MAX_FILENAME_LEN: usize = 100;

/// Limits applied to every grant
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub grant_ttl: Duration,
    pub max_upload_bytes: u64,
    /// Exact types or `type/*` wildcards. Empty allows any type.
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            grant_ttl: Duration::minutes(15),
            max_upload_bytes: 50 * 1024 * 1024,
            allowed_mime_types: Vec::new(),
        }
    }
}

/// Body of `POST /media/signed-url`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadGrantRequest {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub checksum: Option<String>,
}

impl UploadGrantRequest {
    pub fn new(filename: &str, mime_type: &str, size: u64, checksum: &str) -> Self {
        Self {
            filename: Some(filename.to_string()),
            mime_type: Some(mime_type.to_string()),
            size: Some(size),
            checksum: Some(checksum.to_string()),
        }
    }
}

/// An issued grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadGrant {
    pub url: String,
    pub key: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip)]
    pub issued_to: String,
}

/// Brokers write access between untrusted clients and the object store
#[derive(Debug, Clone)]
pub struct PresignedUploadCoordinator {
    signer: Arc<dyn UrlSigner>,
    policy: UploadPolicy,
}

impl PresignedUploadCoordinator {
    pub fn new(signer: Arc<dyn UrlSigner>, policy: UploadPolicy) -> Self {
        Self { signer, policy }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Validate the request and issue a grant to `identity`
    pub fn request_upload_grant(
        &self,
        identity: &Identity,
        request: &UploadGrantRequest,
    ) -> MediaResult<UploadGrant> {
        let (filename, mime_type, size, checksum) = required_fields(request)?;
        let mime_type = mime_type.to_ascii_lowercase();

        if !is_media_type(&mime_type) {
            return Err(MediaError::Validation(format!("invalid type: {}", mime_type)));
        }
        if !self.mime_allowed(&mime_type) {
            return Err(MediaError::Validation(format!("type not allowed: {}", mime_type)));
        }
        if size > self.policy.max_upload_bytes {
            return Err(MediaError::Validation(format!(
                "size {} exceeds limit of {} bytes",
                size, self.policy.max_upload_bytes
            )));
        }

        let key = derive_object_key(filename);
        let signed = self.signer.issue_signed_write_url(
            &WriteUrlRequest {
                key: &key,
                content_type: &mime_type,
                size,
                checksum,
            },
            self.policy.grant_ttl,
        )?;

        log_event(
            Event::UploadGrantIssued,
            &[
                ("expires_at", &signed.expires_at.to_rfc3339()),
                ("issued_to", &identity.subject),
                ("key", &key),
                ("size", &size.to_string()),
            ],
        );

        Ok(UploadGrant {
            url: signed.url,
            key,
            expires_at: signed.expires_at,
            issued_to: identity.subject.clone(),
        })
    }

    fn mime_allowed(&self, mime_type: &str) -> bool {
        if self.policy.allowed_mime_types.is_empty() {
            return true;
        }
        self.policy.allowed_mime_types.iter().any(|allowed| {
            let allowed = allowed.to_ascii_lowercase();
            match allowed.strip_suffix("/*") {
                Some(major) => mime_type
                    .split_once('/')
                    .map(|(m, _)| m == major)
                    .unwrap_or(false),
                None => allowed == mime_type,
            }
        })
    }
}

fn required_fields(request: &UploadGrantRequest) -> MediaResult<(&str, &str, u64, &str)> {
    let filename = present(&request.filename);
    let mime_type = present(&request.mime_type);
    let size = request.size.filter(|s| *s > 0);
    let checksum = present(&request.checksum);

    match (filename, mime_type, size, checksum) {
        (Some(f), Some(m), Some(s), Some(c)) => Ok((f, m, s, c)),
        _ => {
            let mut missing = Vec::new();
            if filename.is_none() {
                missing.push("filename");
            }
            if mime_type.is_none() {
                missing.push("type");
            }
            if size.is_none() {
                missing.push("size");
            }
            if checksum.is_none() {
                missing.push("checksum");
            }
            Err(MediaError::Validation(format!(
                "missing or empty: {}",
                missing.join(", ")
            )))
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn is_media_type(value: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^[a-z0-9][a-z0-9!#$&^_.+-]*/[a-z0-9][a-z0-9!#$&^_.+-]*$")
                .expect("media type pattern is valid")
        })
        .is_match(value)
}

/// `uploads/<uuid>/<sanitized filename>`
pub fn derive_object_key(filename: &str) -> String {
    format!("uploads/{}/{}", Uuid::new_v4(), sanitize_filename(filename))
}

fn sanitize_filename(filename: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars =
        UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("filename pattern is valid"));

    // Drop any client-side directory part.
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let replaced = unsafe_chars.replace_all(base, "_");
    let trimmed: String = replaced
        .trim_start_matches('.')
        .chars()
        .take(MAX_FILENAME_LEN)
        .collect();

    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed
    }
}
