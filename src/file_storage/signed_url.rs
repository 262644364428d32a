//! # Signed URL Generation
//!
//! Presigned write URLs for the object endpoint. The URL carries every
//! term of the grant (key, content type, size, checksum, expiry) plus a
//! signature over them, so the endpoint can verify a write without any
//! record of the grant having been issued.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use url::Url;

use super::errors::{ObjectStoreError, ObjectStoreResult};

/// Path prefix of the object endpoint, relative to the public base URL
pub const OBJECT_ROUTE_PREFIX: &str = "storage/object";

/// What a write URL must authorize
#[derive(Debug, Clone, Copy)]
pub struct WriteUrlRequest<'a> {
    pub key: &'a str,
    pub content_type: &'a str,
    pub size: u64,
    pub checksum: &'a str,
}

/// A presigned write URL and its expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedWriteUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Storage-side collaborator that hands out short-lived write URLs
pub trait UrlSigner: Send + Sync + std::fmt::Debug {
    fn issue_signed_write_url(
        &self,
        request: &WriteUrlRequest<'_>,
        ttl: Duration,
    ) -> ObjectStoreResult<SignedWriteUrl>;
}

/// Grant terms as they travel in the URL query string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSignature {
    pub content_type: String,
    pub size: u64,
    pub checksum: String,
    /// Unix seconds
    pub expires: i64,
    pub token: String,
}

impl WriteSignature {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.expires, 0).single()
    }
}

/// Signs and verifies object write URLs with a shared secret
pub struct SignedUrlGenerator {
    secret: Vec<u8>,
    base_url: Url,
}

impl std::fmt::Debug for SignedUrlGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedUrlGenerator")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl SignedUrlGenerator {
    /// Create a generator for URLs rooted at `base_url`
    pub fn new(secret: &[u8], base_url: &str) -> ObjectStoreResult<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| ObjectStoreError::InvalidBaseUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ObjectStoreError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            secret: secret.to_vec(),
            base_url,
        })
    }

    /// Sign the terms of a write expiring at `expires_at`
    pub fn sign_write(
        &self,
        request: &WriteUrlRequest<'_>,
        expires_at: DateTime<Utc>,
    ) -> WriteSignature {
        let expires = expires_at.timestamp();
        let token = self.sign(&canonical_message(
            request.key,
            request.content_type,
            request.size,
            request.checksum,
            expires,
        ));

        WriteSignature {
            content_type: request.content_type.to_string(),
            size: request.size,
            checksum: request.checksum.to_string(),
            expires,
            token,
        }
    }

    /// Check a write against its signature and expiry
    pub fn verify_write(
        &self,
        key: &str,
        signature: &WriteSignature,
        now: DateTime<Utc>,
    ) -> ObjectStoreResult<()> {
        let expected = self.sign(&canonical_message(
            key,
            &signature.content_type,
            signature.size,
            &signature.checksum,
            signature.expires,
        ));

        let matches: bool = expected.as_bytes().ct_eq(signature.token.as_bytes()).into();
        if !matches {
            return Err(ObjectStoreError::InvalidSignature);
        }

        if now.timestamp() > signature.expires {
            return Err(ObjectStoreError::UrlExpired);
        }

        Ok(())
    }

    /// Render the full URL for a signed write
    pub fn to_url(&self, key: &str, signature: &WriteSignature) -> ObjectStoreResult<String> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ObjectStoreError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(OBJECT_ROUTE_PREFIX.split('/'))
            .extend(key.split('/'));

        url.query_pairs_mut()
            .append_pair("content_type", &signature.content_type)
            .append_pair("size", &signature.size.to_string())
            .append_pair("checksum", &signature.checksum)
            .append_pair("expires", &signature.expires.to_string())
            .append_pair("token", &signature.token);

        Ok(url.into())
    }

    fn sign(&self, message: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(message.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

impl UrlSigner for SignedUrlGenerator {
    fn issue_signed_write_url(
        &self,
        request: &WriteUrlRequest<'_>,
        ttl: Duration,
    ) -> ObjectStoreResult<SignedWriteUrl> {
        let signature = self.sign_write(request, Utc::now() + ttl);
        let expires_at = signature
            .expires_at()
            .ok_or_else(|| ObjectStoreError::IoError("expiry out of range".into()))?;

        Ok(SignedWriteUrl {
            url: self.to_url(request.key, &signature)?,
            expires_at,
        })
    }
}

fn canonical_message(
    key: &str,
    content_type: &str,
    size: u64,
    checksum: &str,
    expires: i64,
) -> String {
    format!("PUT\n{key}\n{content_type}\n{size}\n{checksum}\n{expires}")
}
