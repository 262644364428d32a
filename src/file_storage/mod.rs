//! # File Storage Module
//!
//! Object storage behind presigned write URLs: URL signing, the signed
//! write gateway, and the backend that keeps the bytes.

pub mod backend;
pub mod errors;
pub mod gateway;
pub mod local;
pub mod signed_url;

pub use backend::ObjectBackend;
pub use errors::{ObjectStoreError, ObjectStoreResult};
pub use gateway::{ObjectGateway, StoredObject};
pub use local::LocalBackend;
pub use signed_url::{
    SignedUrlGenerator, SignedWriteUrl, UrlSigner, WriteSignature, WriteUrlRequest,
    OBJECT_ROUTE_PREFIX,
};
