use std::{fmt, sync::Arc};

use sqlx::PgPool;

use colis_core::MissionLifecycleEngine;

use crate::infra::config::Config;

/// Shared handler state. The pool is opened and closed by the entry point;
/// everything here only borrows it.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MissionLifecycleEngine>,
    pub pool: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        Self {
            engine: Arc::new(MissionLifecycleEngine::new(pool.clone())),
            pool,
            config: Arc::new(config),
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
