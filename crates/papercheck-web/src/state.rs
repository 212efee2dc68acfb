use std::sync::Arc;

use tokio::sync::OnceCell;

use papercheck_core::{PdfBackend, StorageConfig};
use papercheck_scoring::GrammarCorrector;
use papercheck_storage::{StorageError, UploadSigner};

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub backend: Arc<dyn PdfBackend>,
    pub corrector: Arc<dyn GrammarCorrector>,
    storage: StorageConfig,
    signer: OnceCell<UploadSigner>,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn PdfBackend>,
        corrector: Arc<dyn GrammarCorrector>,
        storage: StorageConfig,
    ) -> Self {
        Self {
            backend,
            corrector,
            storage,
            signer: OnceCell::new(),
        }
    }

    /// Use an already-built signer instead of building one from config.
    #[cfg(test)]
    pub fn with_signer(mut self, signer: UploadSigner) -> Self {
        self.signer = OnceCell::from(signer);
        self
    }

    /// The upload signer, built on first use. A failed build is retried on
    /// the next request.
    pub async fn signer(&self) -> Result<&UploadSigner, StorageError> {
        self.signer
            .get_or_try_init(|| UploadSigner::from_config(&self.storage))
            .await
    }
}
