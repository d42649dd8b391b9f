//! Application context shared by every downstream component
//!
//! Built once after configuration and pool bootstrap both succeed. Clones are
//! cheap and all point at the same configuration, pool, and collaborators.
//! The pool is closed once, by [`ApplicationContext::shutdown`], after all
//! tracked background work has finished.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use greenlight_core::{ResolvedConfig, VERSION};
use serde::Serialize;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::db::{PoolHandle, PoolStats};
use crate::error::ContextError;
use crate::mailer::Mailer;
use crate::models::Models;

/// Shared application context
#[derive(Clone)]
pub struct ApplicationContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    config: Arc<ResolvedConfig>,
    pool: PoolHandle,
    mailer: Mailer,
    models: Models,
    tracker: TaskTracker,
    shutdown: CancellationToken,
    // Flipped exactly once by shutdown; spawns check it under the same lock.
    accepting: Mutex<bool>,
}

/// Runtime snapshot: version, pool usage, background work, timestamp
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeStats {
    pub version: &'static str,
    pub database: PoolStats,
    pub background_tasks: usize,
    pub timestamp: i64,
}

impl ApplicationContext {
    pub fn new(config: ResolvedConfig, pool: PoolHandle, mailer: Mailer, models: Models) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                config: Arc::new(config),
                pool,
                mailer,
                models,
                tracker: TaskTracker::new(),
                shutdown: CancellationToken::new(),
                accepting: Mutex::new(true),
            }),
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.inner.config
    }

    /// Owned handle on the configuration for collaborators built elsewhere
    pub fn shared_config(&self) -> Arc<ResolvedConfig> {
        Arc::clone(&self.inner.config)
    }

    pub fn pool(&self) -> &PgPool {
        self.inner.pool.pool()
    }

    pub fn mailer(&self) -> &Mailer {
        &self.inner.mailer
    }

    pub fn models(&self) -> &Models {
        &self.inner.models
    }

    /// Cancelled when shutdown starts; background work should stop on it.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.inner.shutdown.child_token()
    }

    /// Run `task` as tracked background work. Shutdown waits for it before
    /// closing the pool.
    pub fn spawn_background<F>(&self, task: F) -> Result<JoinHandle<F::Output>, ContextError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let accepting = self
            .inner
            .accepting
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !*accepting {
            return Err(ContextError::ShuttingDown);
        }
        Ok(self.inner.tracker.spawn(task))
    }

    pub fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            version: VERSION,
            database: self.inner.pool.stats(),
            background_tasks: self.inner.tracker.len(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// Stop accepting work, wait for tracked tasks, then close the pool.
    ///
    /// Returns `false` if shutdown had already run.
    pub async fn shutdown(&self) -> bool {
        {
            let mut accepting = self
                .inner
                .accepting
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !*accepting {
                warn!("shutdown already in progress");
                return false;
            }
            *accepting = false;
        }

        info!(
            tasks = self.inner.tracker.len(),
            "waiting for background tasks to finish"
        );
        self.inner.shutdown.cancel();
        self.inner.tracker.close();
        self.inner.tracker.wait().await;

        info!("closing database connection pool");
        self.inner.pool.close().await;
        true
    }
}
