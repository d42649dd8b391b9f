//! Idle connection cap
//!
//! sqlx bounds open connections but not idle ones. [`IdleCap`] fills the gap
//! from an `after_release` hook: a connection coming back to a pool whose idle
//! set is already full is closed instead of parked.

use std::sync::{Arc, PoisonError, RwLock};

use sqlx::PgPool;

pub(crate) struct IdleCap {
    max_idle: u32,
    // Set after the pool is built; cleared on close to drop the pool -> hook -> pool cycle.
    pool: RwLock<Option<PgPool>>,
}

impl IdleCap {
    pub(crate) fn new(max_idle: u32) -> Arc<Self> {
        Arc::new(Self {
            max_idle,
            pool: RwLock::new(None),
        })
    }

    pub(crate) fn attach(&self, pool: &PgPool) {
        *self.pool.write().unwrap_or_else(PoisonError::into_inner) = Some(pool.clone());
    }

    pub(crate) fn detach(&self) {
        self.pool.write().unwrap_or_else(PoisonError::into_inner).take();
    }

    /// Whether a connection being released may stay idle.
    pub(crate) fn admits_release(&self) -> bool {
        let guard = self.pool.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            // The releasing connection is not counted yet.
            Some(pool) => pool.num_idle() < self.max_idle as usize,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn admits_while_below_cap() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://greenlight@127.0.0.1:1/greenlight")
            .unwrap();
        let cap = IdleCap::new(1);
        assert!(cap.admits_release());

        cap.attach(&pool);
        assert_eq!(pool.num_idle(), 0);
        assert!(cap.admits_release());

        cap.detach();
        assert!(cap.admits_release());
    }
}
