//! greenlight - API server entry point
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Init tracing
//!   3. Resolve configuration (environment first, then overrides)
//!   4. Print version and exit, if asked
//!   5. Open and probe the database pool
//!   6. Assemble the application context
//!   7. Wait for a shutdown signal, drain background work, close the pool
//!
//! This is the only place that ends the process on error.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use greenlight_core::{resolve, ConfigError, ErrorKind, ProcessEnv, Resolution, VERSION};
use greenlight_server::{ApplicationContext, BootstrapError, Mailer, Models};
use tracing::{debug, error, info};

mod tracing_setup;

use tracing_setup::TracingConfig;

#[tokio::main]
async fn main() -> ExitCode {
    // Loaded before tracing so LOG_FORMAT / RUST_LOG may come from .env.
    let dotenv = dotenvy::dotenv();

    if let Err(err) = tracing_setup::init(&TracingConfig::from_env()) {
        eprintln!("error: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(dotenv).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fatal(&err),
    }
}

async fn run(dotenv: dotenvy::Result<PathBuf>) -> Result<()> {
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => debug!("no .env file; using process environment"),
        Err(err) => return Err(err).context("failed to load .env"),
    }

    let config = match resolve(&ProcessEnv, std::env::args_os())? {
        Resolution::ShowVersion => {
            println!("Version:\t{VERSION}");
            return Ok(());
        }
        Resolution::Ready(config) => config,
    };
    info!(env = %config.env, port = config.port, "configuration resolved");

    let pool = greenlight_server::open(&config.db).await?;
    info!("database connection pool established");

    let mailer = Mailer::new(&config.smtp);
    debug!(
        relay = %mailer.relay(),
        sender = mailer.sender(),
        authenticated = mailer.has_credentials(),
        "mailer configured"
    );
    let models = Models::new(pool.pool().clone());
    let ctx = ApplicationContext::new(config, pool, mailer, models);
    debug!(stats = ?ctx.stats(), "runtime stats");

    info!("ready; waiting for shutdown signal");
    shutdown_signal()
        .await
        .context("failed to install signal handlers")?;

    ctx.shutdown().await;
    info!("shutdown complete");
    Ok(())
}

/// Log one structured line for a fatal error and pick the exit code.
fn fatal(err: &anyhow::Error) -> ExitCode {
    if let Some(ConfigError::Override(clap_err)) = err.downcast_ref::<ConfigError>() {
        // Prints usage or help; exits 0 for --help, 2 for a bad flag.
        clap_err.exit();
    }

    let message = format!("{err:#}");
    match error_kind(err) {
        Some(kind) => error!(kind = %kind, error = %message, "fatal startup error"),
        None => error!(error = %message, "fatal error"),
    }
    ExitCode::FAILURE
}

fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    if let Some(err) = err.downcast_ref::<ConfigError>() {
        return Some(err.kind());
    }
    if let Some(err) = err.downcast_ref::<BootstrapError>() {
        return Some(err.kind());
    }
    err.downcast_ref::<dotenvy::Error>()
        .map(|_| ErrorKind::ConfigInvalid)
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())?.recv().await;
        Ok::<(), std::io::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<std::io::Result<()>>();

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res?;
            info!("received Ctrl+C, starting shutdown");
        }
        res = terminate => {
            res?;
            info!("received SIGTERM, starting shutdown");
        }
    }
    Ok(())
}
