use std::sync::Arc;

use arc_swap::ArcSwapOption;
use storefront_core::{BearerToken, TokenStorage, TokenStorageError};

/// Token storage that lives as long as the process.
#[derive(Default, Clone)]
pub struct InMemoryTokenStorage {
    token: Arc<ArcSwapOption<BearerToken>>,
}

impl InMemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: BearerToken) -> Self {
        let storage = Self::new();
        storage.token.store(Some(Arc::new(token)));
        storage
    }
}

impl TokenStorage for InMemoryTokenStorage {
    fn load(&self) -> Result<Option<BearerToken>, TokenStorageError> {
        Ok(self.token.load_full().map(|token| (*token).clone()))
    }

    fn store(&self, token: &BearerToken) -> Result<(), TokenStorageError> {
        self.token.store(Some(Arc::new(token.clone())));
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStorageError> {
        self.token.store(None);
        Ok(())
    }
}
