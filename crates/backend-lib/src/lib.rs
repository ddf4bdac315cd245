// ============================
// parley-backend-lib/src/lib.rs
// ============================
//! Core backend functionality for the Parley chat server.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod hub;
pub mod registry;
pub mod storage;
pub mod ws_router;

use crate::config::Settings;
use crate::hub::HubHandle;
use crate::storage::CredentialStore;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Credential store backend
    pub store: Arc<dyn CredentialStore>,
    /// Broadcast hub handle
    pub hub: HubHandle,
    /// Settings
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create a new application state, spawning the broadcast hub over the
    /// given store.
    pub fn new(store: Arc<dyn CredentialStore>, settings: Settings) -> Self {
        let hub = HubHandle::new(store.clone());

        Self {
            store,
            hub,
            settings: Arc::new(settings),
        }
    }
}
