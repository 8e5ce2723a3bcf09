//! Application state shared by all handlers.
//!
//! [`AppState`] holds the [`SessionStore`] behind an `Arc`. The store does its
//! own fine-grained locking (a `DashMap` plus one async mutex per session), so
//! there is no server-wide lock around it.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::executor::Executor;
use crate::store::SessionStore;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Registry of live trace sessions.
    pub store: Arc<SessionStore>,
}

impl AppState {
    /// Creates state backed by the simulator described in `config` and starts
    /// the idle-session sweep when eviction is enabled.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: &ServerConfig) -> Self {
        let state = AppState::with_executor(Arc::new(config.executor()));

        if let Some(idle_timeout) = config.idle_timeout() {
            state
                .store
                .start_idle_sweep(config.sweep_interval(), idle_timeout);
        }

        state
    }

    /// Creates state around an arbitrary executor, with no background sweep
    /// (for testing).
    pub fn with_executor(executor: Arc<dyn Executor>) -> Self {
        AppState {
            store: Arc::new(SessionStore::new(executor)),
        }
    }
}
