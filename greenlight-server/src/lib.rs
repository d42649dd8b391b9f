//! greenlight-server: resource bootstrap for the greenlight API
//!
//! Opens and health-checks the shared PostgreSQL pool from a resolved
//! configuration, then assembles the application context handed to request
//! serving and background work.

pub mod db;
pub mod error;
pub mod mailer;
pub mod models;
pub mod state;

pub use db::{open, PoolHandle, PoolLimits, PROBE_DEADLINE, UNLIMITED_CONNECTIONS};
pub use error::{BootstrapError, BootstrapResult, ContextError};
pub use mailer::Mailer;
pub use models::Models;
pub use state::{ApplicationContext, RuntimeStats};
