//! Peerline CLI and REST API entry point.
//!
//! Binary name: `peerline`
//!
//! Parses CLI arguments, loads configuration, opens the database, then
//! dispatches to the command handler or starts the REST API server.

mod cli;
mod http;
mod state;
mod sweep;

use clap::Parser;
use clap_complete::generate;
use tokio_util::sync::CancellationToken;

use cli::{AdvocateCommand, Cli, Commands, SessionCommand};
use peerline_infra::config::load_global_config;
use peerline_infra::filesystem::resolve_data_dir;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "peerline", &mut std::io::stdout());
        return Ok(());
    }

    let data_dir = resolve_data_dir();
    let config = load_global_config(&data_dir).await;

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,peerline=debug",
        _ => "trace",
    };
    peerline_observe::tracing_setup::init_tracing(filter, cli.otel || config.observability.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let state = AppState::init(data_dir, config).await?;

    let result = run(cli, state).await;
    peerline_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli, state: AppState) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            serve(state, &host, port).await?;
        }

        Commands::Advocate { action } => match action {
            AdvocateCommand::Add { id, name } => {
                cli::advocate::add_advocate(&state, &id, name.as_deref(), cli.json).await?;
            }
            AdvocateCommand::List => {
                cli::advocate::list_advocates(&state, cli.json).await?;
            }
            AdvocateCommand::Available { id } => {
                cli::advocate::set_availability(&state, &id, true, cli.json).await?;
            }
            AdvocateCommand::Away { id } => {
                cli::advocate::set_availability(&state, &id, false, cli.json).await?;
            }
        },

        Commands::Session { action } => match action {
            SessionCommand::Show { id } => {
                cli::session::show_session(&state, &id, cli.json).await?;
            }
            SessionCommand::Close { id } => {
                cli::session::close_session(&state, &id, cli.json).await?;
            }
            SessionCommand::Messages { id, after } => {
                cli::session::list_messages(&state, &id, after, cli.json).await?;
            }
        },

        Commands::Reconcile => {
            cli::session::reconcile(&state, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} Peerline API listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!(
        "  {}",
        console::style(format!("Data directory: {}", state.data_dir.display())).dim()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let cancel = CancellationToken::new();
    let sweep = sweep::spawn_reconcile_sweep(
        state.chat.clone(),
        state.config.chat.reconcile_interval_secs,
        cancel.clone(),
    );

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    if let Some(handle) = sweep {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Reconcile sweep task ended abnormally");
        }
    }

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
