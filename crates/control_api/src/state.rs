//! Shared handler state

use std::sync::Arc;

use credential_store::CredentialStore;
use dispatcher::JobControl;

/// State shared by every handler
pub struct AppState<S> {
    pub control: JobControl,
    pub sender: Arc<S>,
    pub store: Arc<CredentialStore>,
}

impl<S> AppState<S> {
    pub fn new(control: JobControl, sender: Arc<S>, store: CredentialStore) -> Self {
        Self {
            control,
            sender,
            store: Arc::new(store),
        }
    }
}

// Manual impl: `S` itself need not be Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            control: self.control.clone(),
            sender: Arc::clone(&self.sender),
            store: Arc::clone(&self.store),
        }
    }
}
