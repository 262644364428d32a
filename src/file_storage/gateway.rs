//! # Signed Write Gateway
//!
//! Accepts the direct-to-storage PUT that a presigned URL authorizes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use super::backend::ObjectBackend;
use super::errors::{ObjectStoreError, ObjectStoreResult};
use super::signed_url::{SignedUrlGenerator, WriteSignature};
use crate::observability::{log_event, Event};

/// Metadata of a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub content_type: String,
    pub sha256: String,
}

/// Verifies signed writes and hands accepted bytes to the backend
#[derive(Debug, Clone)]
pub struct ObjectGateway {
    signer: Arc<SignedUrlGenerator>,
    backend: Arc<dyn ObjectBackend>,
}

impl ObjectGateway {
    pub fn new(signer: Arc<SignedUrlGenerator>, backend: Arc<dyn ObjectBackend>) -> Self {
        Self { signer, backend }
    }

    pub fn backend(&self) -> &dyn ObjectBackend {
        self.backend.as_ref()
    }

    /// Store `body` at `key` if the signature authorizes exactly this write
    pub fn put_signed(
        &self,
        key: &str,
        signature: &WriteSignature,
        content_type: Option<&str>,
        body: &[u8],
    ) -> ObjectStoreResult<StoredObject> {
        self.put_signed_at(key, signature, content_type, body, Utc::now())
    }

    pub(crate) fn put_signed_at(
        &self,
        key: &str,
        signature: &WriteSignature,
        content_type: Option<&str>,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> ObjectStoreResult<StoredObject> {
        let result = self.check_and_write(key, signature, content_type, body, now);

        match &result {
            Ok(object) => log_event(
                Event::ObjectStored,
                &[("key", key), ("size", &object.size.to_string())],
            ),
            Err(e) => log_event(
                Event::UploadRejected,
                &[("key", key), ("reason", &e.to_string())],
            ),
        }
        result
    }

    fn check_and_write(
        &self,
        key: &str,
        signature: &WriteSignature,
        content_type: Option<&str>,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> ObjectStoreResult<StoredObject> {
        self.signer.verify_write(key, signature, now)?;

        let sent = content_type.unwrap_or("");
        if !same_media_type(sent, &signature.content_type) {
            return Err(ObjectStoreError::ContentTypeMismatch {
                granted: signature.content_type.clone(),
                sent: sent.to_string(),
            });
        }

        let size = body.len() as u64;
        if size > signature.size {
            return Err(ObjectStoreError::ObjectTooLarge(size, signature.size));
        }

        let digest = format!("{:x}", Sha256::digest(body));
        if is_sha256_hex(&signature.checksum) && !digest.eq_ignore_ascii_case(&signature.checksum) {
            return Err(ObjectStoreError::ChecksumMismatch);
        }

        self.backend.write_new(key, body)?;

        Ok(StoredObject {
            key: key.to_string(),
            size,
            content_type: signature.content_type.clone(),
            sha256: digest,
        })
    }
}

/// Compare media types ignoring parameters such as `; charset=utf-8`
fn same_media_type(sent: &str, granted: &str) -> bool {
    let essence = |value: &str| -> String {
        value
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase()
    };
    essence(sent) == essence(granted)
}

/// Checksums in this shape are verified; anything else is only bound into the signature.
fn is_sha256_hex(checksum: &str) -> bool {
    checksum.len() == 64 && checksum.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_storage::local::LocalBackend;
    use crate::file_storage::signed_url::WriteUrlRequest;
    use chrono::Duration;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Arc<SignedUrlGenerator>, ObjectGateway) {
        let temp = TempDir::new().unwrap();
        let signer = Arc::new(SignedUrlGenerator::new(b"secret", "http://localhost:4000").unwrap());
        let backend: Arc<dyn ObjectBackend> = Arc::new(LocalBackend::new(temp.path()));
        let gateway = ObjectGateway::new(signer.clone(), backend);
        (temp, signer, gateway)
    }

    fn sign(signer: &SignedUrlGenerator, key: &str, size: u64, checksum: &str) -> WriteSignature {
        signer.sign_write(
            &WriteUrlRequest {
                key,
                content_type: "image/png",
                size,
                checksum,
            },
            Utc::now() + Duration::minutes(5),
        )
    }

    #[test]
    fn test_accepts_exact_write_once() {
        let (_temp, signer, gateway) = setup();
        let body = b"not really a png";
        let checksum = format!("{:x}", Sha256::digest(body));
        let signature = sign(&signer, "uploads/a/logo.png", body.len() as u64, &checksum);

        let stored = gateway
            .put_signed("uploads/a/logo.png", &signature, Some("image/png"), body)
            .unwrap();
        assert_eq!(stored.sha256, checksum);
        assert_eq!(gateway.backend().read("uploads/a/logo.png").unwrap(), body);

        // The same grant cannot write twice.
        let again = gateway.put_signed("uploads/a/logo.png", &signature, Some("image/png"), body);
        assert!(matches!(again, Err(ObjectStoreError::ObjectAlreadyExists(_))));
    }

    #[test]
    fn test_content_type_must_match() {
        let (_temp, signer, gateway) = setup();
        let signature = sign(&signer, "k.png", 10, "opaque");

        let result = gateway.put_signed("k.png", &signature, Some("text/html"), b"x");
        assert!(matches!(result, Err(ObjectStoreError::ContentTypeMismatch { .. })));
        let missing = gateway.put_signed("k.png", &signature, None, b"x");
        assert!(matches!(missing, Err(ObjectStoreError::ContentTypeMismatch { .. })));
    }

    #[test]
    fn test_body_larger_than_grant() {
        let (_temp, signer, gateway) = setup();
        let signature = sign(&signer, "k.png", 2, "opaque");
        let result = gateway.put_signed("k.png", &signature, Some("image/png"), b"xyz");
        assert!(matches!(result, Err(ObjectStoreError::ObjectTooLarge(3, 2))));
    }

    #[test]
    fn test_sha256_checksum_enforced() {
        let (_temp, signer, gateway) = setup();
        let wrong = "0".repeat(64);
        let signature = sign(&signer, "k.png", 10, &wrong);
        let result = gateway.put_signed("k.png", &signature, Some("image/png"), b"data");
        assert!(matches!(result, Err(ObjectStoreError::ChecksumMismatch)));
    }

    #[test]
    fn test_expired_grant() {
        let (_temp, signer, gateway) = setup();
        let signature = sign(&signer, "k.png", 10, "opaque");
        let later = Utc::now() + Duration::minutes(10);
        let result = gateway.put_signed_at("k.png", &signature, Some("image/png"), b"x", later);
        assert!(matches!(result, Err(ObjectStoreError::UrlExpired)));
    }

    #[test]
    fn test_media_type_parameters_ignored() {
        assert!(same_media_type("image/PNG; charset=binary", "image/png"));
        assert!(!same_media_type("image/jpeg", "image/png"));
    }
}
