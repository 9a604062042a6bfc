// src/context.rs

//! Process-wide application context.
//!
//! Built once at startup and shared by reference with the scheduler tasks
//! and the health handlers; there are no module-level singletons.

use crate::config::Config;
use crate::storage::SeenStore;

/// Shared application state.
pub struct AppContext {
    pub config: Config,
    pub store: SeenStore,
}
