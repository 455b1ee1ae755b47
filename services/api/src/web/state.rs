//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use crate::config::Config;
use bhasha_core::{IdentityStore, ProgressStore};

/// The shared application state, created once at startup and passed to all
/// handlers. All storage access goes through the injected port handles; there
/// is no other cross-request state in the process.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityStore>,
    pub progress: Arc<dyn ProgressStore>,
    pub config: Arc<Config>,
}
