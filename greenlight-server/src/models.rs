//! Data-access handle
//!
//! Repositories hang off [`Models`]; each borrows connections from the shared
//! pool. Query logic belongs to them, not here.

use sqlx::PgPool;

#[derive(Debug, Clone)]
pub struct Models {
    pool: PgPool,
}

impl Models {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
