//! Code execution server for the CodeLab learning platform.
//!
//! This binary wires the scratch workspace, language runners, and process
//! executor into an HTTP service. Everything else the platform does
//! (profiles, quests, the leaderboard) lives elsewhere and consumes this
//! service's JSON contract; the only jobs here are running untrusted
//! snippets within a bound and keeping the scratch area clean.

use anyhow::Result;
use clap::Parser;
use codelab_core::config::ConfigLoader;
use codelab_core::executors::LocalCodeExecutor;
use codelab_core::runners::{javascript::JS_CANDIDATES, python::PYTHON_CANDIDATES};
use codelab_core::workspace::{ScratchSpace, SweepTask};
use codelab_server::{build_router, shutdown_signal, AppState};
use log::LevelFilter;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[clap(author, version, about = "CodeLab Server - Run the code execution service")]
struct Cli {
    #[clap(long, short, default_value = "codelab.yaml", help = "Path to the service configuration file")]
    config: String,

    #[clap(long, help = "Override the bind address from the configuration")]
    bind_addr: Option<String>,

    #[clap(long, short, default_value = "info")]
    log_level: String,

    #[clap(long, help = "Run Python snippets without the standard-library deny-list")]
    unrestricted_python: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();

    let mut config = ConfigLoader::load_or_default(&cli.config).await?;
    if let Some(bind_addr) = cli.bind_addr {
        config.server.bind_addr = bind_addr;
    }
    if cli.unrestricted_python {
        log::warn!(
            "Python restricted mode is disabled; snippets run with full standard-library access"
        );
        config.execution.restricted_python = false;
    }
    config.validate()?;

    report_interpreters();

    let scratch = Arc::new(ScratchSpace::new(
        &config.scratch.dir,
        config.scratch.retention(),
    )?);
    log::info!("scratch directory ready at {}", scratch.root().display());

    // The sweep period equals the retention window, so no orphaned file
    // outlives roughly twice the window.
    let sweeper = SweepTask::spawn(scratch.clone(), config.scratch.retention());

    let executor = Arc::new(LocalCodeExecutor::new(scratch, &config.execution));
    let router = build_router(AppState { executor });

    let bind_addr: SocketAddr = config.server.bind_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    log::info!("code execution server listening on {}", bind_addr);
    log::info!("Health check: http://{}/api/health", bind_addr);
    log::info!("Run endpoint: http://{}/api/run", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;
    log::info!("code execution server shut down gracefully");
    Ok(())
}

/// Log which interpreter binaries are visible on the PATH. Purely a startup
/// diagnostic; at request time the executor still probes by spawning.
fn report_interpreters() {
    for (language, candidates) in [("javascript", JS_CANDIDATES), ("python", PYTHON_CANDIDATES)] {
        match candidates.iter().find_map(|c| which::which(c).ok()) {
            Some(path) => log::info!("{} interpreter available at {}", language, path.display()),
            None => log::warn!(
                "no {} interpreter found on PATH; {} submissions will fail until one is installed",
                language,
                language
            ),
        }
    }
}
