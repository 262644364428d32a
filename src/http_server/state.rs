//! Shared handler state

use std::sync::Arc;

use super::errors::{ApiError, ApiResult};
use crate::auth::JwtManager;
use crate::config::AppConfig;
use crate::db::Database;
use crate::file_storage::{
    LocalBackend, ObjectBackend, ObjectGateway, ObjectStoreResult, SignedUrlGenerator, UrlSigner,
};
use crate::form_schema::ActiveVersionStore;
use crate::media::PresignedUploadCoordinator;
use crate::settings::SettingsStore;

/// Services shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub jwt: JwtManager,
    pub form_schemas: ActiveVersionStore,
    pub settings: SettingsStore,
    pub uploads: PresignedUploadCoordinator,
    pub objects: ObjectGateway,
}

impl AppState {
    /// Wire every service from the loaded configuration
    pub fn from_config(config: &AppConfig, db: Database) -> ObjectStoreResult<Self> {
        let signer = Arc::new(SignedUrlGenerator::new(
            config.storage.signing_secret.as_bytes(),
            &config.storage.public_base_url,
        )?);
        let url_signer: Arc<dyn UrlSigner> = signer.clone();
        let backend: Arc<dyn ObjectBackend> = Arc::new(LocalBackend::new(config.object_root()));

        Ok(Self {
            jwt: JwtManager::new(config.jwt_config()),
            form_schemas: ActiveVersionStore::new(db.clone()),
            settings: SettingsStore::new(db),
            uploads: PresignedUploadCoordinator::new(url_signer, config.upload_policy()),
            objects: ObjectGateway::new(signer, backend),
        })
    }

    /// Largest request body the object endpoint accepts
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.uploads.policy().max_upload_bytes).unwrap_or(usize::MAX)
    }
}

/// Run synchronous store work off the async executor
pub(crate) async fn blocking<T, E, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::new(500, format!("Worker task failed: {}", e)))?
        .map_err(Into::into)
}
