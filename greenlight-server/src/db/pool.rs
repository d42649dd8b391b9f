//! Database connection pool bootstrap
//!
//! Opens the shared PgPool from the resolved configuration in ordered steps,
//! each of which can fail on its own:
//!
//! 1. parse the DSN
//! 2. map the open/idle limits (`<= 0` means unlimited)
//! 3. parse the idle time
//! 4. build the pool lazily with those settings
//! 5. probe the store once under [`PROBE_DEADLINE`]
//!
//! A failed probe closes the pool before returning, so no handle escapes a
//! failed open.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use greenlight_core::config::redact_dsn;
use greenlight_core::DbConfig;
use serde::Serialize;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Connection, PgPool};
use tracing::{debug, info};

use super::idle::IdleCap;
use crate::error::{BootstrapError, BootstrapResult};

/// Deadline for the startup health probe. Fixed here so a slow or silent
/// store bounds startup latency regardless of pool timeouts.
pub const PROBE_DEADLINE: Duration = Duration::from_secs(5);

/// Pool size used for an unlimited open limit. sqlx allocates its idle queue
/// up front, so "unlimited" needs a finite ceiling; bounded limits above it
/// are clamped too.
pub const UNLIMITED_CONNECTIONS: u32 = u16::MAX as u32;

/// Connection limits after mapping; `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolLimits {
    pub max_open: Option<u32>,
    pub max_idle: Option<u32>,
}

impl PoolLimits {
    /// Map raw configured limits. A bounded idle limit never exceeds a
    /// bounded open limit.
    pub fn from_config(max_open: i64, max_idle: i64) -> BootstrapResult<Self> {
        let max_open = limit("max_open_conns", max_open)?;
        let mut max_idle = limit("max_idle_conns", max_idle)?;

        if let (Some(open), Some(idle)) = (max_open, max_idle) {
            max_idle = Some(idle.min(open));
        }

        Ok(Self { max_open, max_idle })
    }

    /// Pool size handed to sqlx, never above [`UNLIMITED_CONNECTIONS`]
    pub fn max_connections(&self) -> u32 {
        self.max_open
            .map_or(UNLIMITED_CONNECTIONS, |open| open.min(UNLIMITED_CONNECTIONS))
    }
}

fn limit(name: &'static str, value: i64) -> BootstrapResult<Option<u32>> {
    if value <= 0 {
        return Ok(None);
    }
    u32::try_from(value)
        .map(Some)
        .map_err(|_| BootstrapError::LimitOutOfRange { name, value })
}

/// Parse an idle time such as `15m`, `30s` or `1h 30m`. A bare number has no
/// unit and is rejected.
pub fn parse_idle_time(raw: &str) -> BootstrapResult<Duration> {
    humantime::parse_duration(raw).map_err(|source| BootstrapError::InvalidIdleTime {
        value: raw.to_string(),
        source,
    })
}

/// Snapshot of pool usage
#[derive(Debug, Clone, Serialize)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
    pub limits: PoolLimits,
    pub closed: bool,
}

/// The one live connection pool. Not `Clone`: exactly one owner closes it.
pub struct PoolHandle {
    pool: PgPool,
    limits: PoolLimits,
    idle_timeout: Option<Duration>,
    idle_cap: Option<Arc<IdleCap>>,
}

impl PoolHandle {
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn limits(&self) -> PoolLimits {
        self.limits
    }

    /// Idle timeout applied to the pool; `None` when configured as zero.
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
            limits: self.limits,
            closed: self.pool.is_closed(),
        }
    }

    /// Close every connection and wait for checked-out ones to come back.
    pub async fn close(&self) {
        if let Some(cap) = &self.idle_cap {
            cap.detach();
        }
        self.pool.close().await;
    }
}

impl std::fmt::Debug for PoolHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolHandle")
            .field("limits", &self.limits)
            .field("idle_timeout", &self.idle_timeout)
            .field("size", &self.pool.size())
            .finish()
    }
}

/// Open the pool and verify it with one bounded health probe.
///
/// # Errors
///
/// - `ResourceMisconfigured` kinds for a bad DSN, limit or idle time
/// - [`BootstrapError::ProbeTimedOut`] when the probe exceeds [`PROBE_DEADLINE`]
/// - [`BootstrapError::Unreachable`] for any other probe failure
///
/// # Example
///
/// ```ignore
/// let handle = open(&config.db).await?;
/// ```
pub async fn open(cfg: &DbConfig) -> BootstrapResult<PoolHandle> {
    let handle = build(cfg)?;

    info!(dsn = %redact_dsn(&cfg.dsn), "probing database");
    if let Err(err) = probe(handle.pool(), PROBE_DEADLINE).await {
        handle.close().await;
        return Err(err);
    }

    Ok(handle)
}

/// Steps 1-4: configure the pool without touching the network.
pub(crate) fn build(cfg: &DbConfig) -> BootstrapResult<PoolHandle> {
    let connect_options =
        PgConnectOptions::from_str(&cfg.dsn).map_err(BootstrapError::InvalidDsn)?;

    let limits = PoolLimits::from_config(cfg.max_open_conns, cfg.max_idle_conns)?;

    let idle_time = parse_idle_time(&cfg.max_idle_time)?;
    let idle_timeout = (!idle_time.is_zero()).then_some(idle_time);

    let mut options = PgPoolOptions::new()
        .max_connections(limits.max_connections())
        .idle_timeout(idle_timeout);

    let idle_cap = limits.max_idle.map(IdleCap::new);
    if let Some(cap) = &idle_cap {
        let cap = Arc::clone(cap);
        options = options.after_release(move |_conn, _meta| {
            let keep = cap.admits_release();
            Box::pin(async move { Ok(keep) })
        });
    }

    let pool = options.connect_lazy_with(connect_options);
    if let Some(cap) = &idle_cap {
        cap.attach(&pool);
    }

    debug!(
        max_open = ?limits.max_open,
        max_idle = ?limits.max_idle,
        idle_timeout = ?idle_timeout,
        "connection pool configured"
    );

    Ok(PoolHandle {
        pool,
        limits,
        idle_timeout,
        idle_cap,
    })
}

/// Step 5: borrow one connection and ping it, all within `deadline`.
async fn probe(pool: &PgPool, deadline: Duration) -> BootstrapResult<()> {
    let attempt = async {
        let mut conn = pool.acquire().await?;
        conn.ping().await?;
        Ok::<(), sqlx::Error>(())
    };

    match tokio::time::timeout(deadline, attempt).await {
        Ok(Ok(())) => {
            info!("database health probe succeeded");
            Ok(())
        }
        // sqlx retries refused connections until its own acquire deadline
        Ok(Err(sqlx::Error::PoolTimedOut)) | Err(_) => {
            Err(BootstrapError::ProbeTimedOut { deadline })
        }
        Ok(Err(err)) => Err(BootstrapError::Unreachable(err)),
    }
}
