//! Database layer - connection pool bootstrap
//!
//! # Design Principles
//!
//! - One pool per process, opened once at startup and closed once at shutdown
//! - `<= 0` limits mean unlimited, never zero capacity
//! - Startup probe is bounded by a fixed deadline; no retry here

mod idle;
pub mod pool;

pub use pool::{
    open, parse_idle_time, PoolHandle, PoolLimits, PoolStats, PROBE_DEADLINE,
    UNLIMITED_CONNECTIONS,
};
