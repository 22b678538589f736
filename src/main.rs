use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::{CommandFactory, Parser};
use tokio::signal;
use tracing::{error, info, warn};

use rtorrent_reaper::cli::Cli;
use rtorrent_reaper::config::ReaperConfig;
use rtorrent_reaper::logging::init_tracing;
use rtorrent_reaper::ratelimit::{HttpTransport, Throttled};
use rtorrent_reaper::rpc::RtorrentClient;
use rtorrent_reaper::sweep::{shutdown, ShutdownTrigger, Sweeper};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() { 1 } else { 0 };
            return Ok(ExitCode::from(code));
        }
    };

    let mut config = match ReaperConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(ExitCode::from(1));
        }
    };
    cli.apply(&mut config);

    init_tracing(&config.logging);

    if config.daemon.url.is_none() {
        Cli::command().print_help()?;
        return Ok(ExitCode::from(1));
    }

    let url = match config.validate() {
        Ok(url) => url,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Ok(ExitCode::from(1));
        }
    };

    info!(version = env!("CARGO_PKG_VERSION"), daemon = %url, "Starting rtorrent-reaper");

    let transport = Throttled::new(
        HttpTransport::new(config.daemon.timeout)?,
        config.throttle.requests,
        config.throttle.period,
    );
    let mut client = RtorrentClient::new(url, transport);
    if let Some(ref username) = config.daemon.username {
        let password = config.daemon.password.as_deref().unwrap_or_default();
        client = client.with_basic_auth(username, password)?;
    }

    let (trigger, listener) = shutdown::channel();
    let trigger = Arc::new(trigger);
    tokio::spawn(cancel_on_signal(trigger.clone()));
    if let Some(deadline) = config.deadline {
        tokio::spawn(cancel_after(deadline, trigger.clone()));
    }

    let sweeper = Sweeper::new(Arc::new(client), config.policy.to_policy())
        .with_view(config.daemon.view.clone())
        .with_shutdown(listener);

    // Failures are logged by the sweep and do not change the exit code.
    if let Ok(result) = sweeper.sweep(Utc::now()).await {
        if result.cancelled {
            warn!(processed = result.processed(), total = result.total, "Sweep stopped early");
        }
    }

    info!("rtorrent-reaper stopped");
    Ok(ExitCode::SUCCESS)
}

async fn cancel_after(deadline: Duration, trigger: Arc<ShutdownTrigger>) {
    tokio::time::sleep(deadline).await;
    info!(deadline = ?deadline, "Deadline reached, stopping sweep");
    trigger.trigger();
}

async fn cancel_on_signal(trigger: Arc<ShutdownTrigger>) {
    shutdown_signal().await;
    trigger.trigger();
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping sweep");
        }
        _ = terminate => {
            info!("Received SIGTERM, stopping sweep");
        }
    }
}
