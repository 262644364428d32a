//! # Media Uploads
//!
//! Presigned upload flow: the server issues a scoped, time-limited write
//! grant; the client uploads directly to storage and validates the outcome.

pub mod client;
pub mod coordinator;
pub mod errors;

pub use client::{classify_status, UploadClient, UploadFile, UploadOutcome, DEFAULT_UPLOAD_TIMEOUT};
pub use coordinator::{
    derive_object_key, PresignedUploadCoordinator, UploadGrant, UploadGrantRequest, UploadPolicy,
};
pub use errors::{MediaError, MediaResult, UploadError};
