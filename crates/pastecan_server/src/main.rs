//! Headless API server entrypoint.

use pastecan_core::DEFAULT_PORT;
use pastecan_server::{config::Config, db::Database, serve_router, sweep, AppState};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    sweep_once: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" => flags.help = true,
            "--sweep" => flags.sweep_once = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pastecan=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();
    let database = Database::new(&config.db_path)?;
    let state = AppState::new(config.clone(), database);

    if cli_flags.sweep_once {
        let removed = state.service.sweep(chrono::Utc::now())?;
        println!("Removed {} expired paste(s)", removed);
        return Ok(());
    }

    let sweeper = sweep::spawn_expiry_sweeper(
        state.service.clone(),
        Duration::from_secs(config.sweep_interval_secs),
    );

    let bind_addr = pastecan_server::resolve_bind_address(&config);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("pastecan running at http://{}", actual_addr);

    let serve_result = serve_router(listener, state, shutdown_signal()).await;

    sweeper.abort();
    serve_result?;

    Ok(())
}

fn print_help() {
    println!("pastecan server\n");
    println!("Usage: pastecan [OPTIONS]\n");
    println!("Options:");
    println!("  --sweep           Delete expired pastes once, then exit");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  DB_PATH           Database directory (default: ~/.cache/pastecan/db)");
    println!("  PORT              Server port (default: {})", DEFAULT_PORT);
    println!("  BIND              Override bind address (e.g. 0.0.0.0:{})", DEFAULT_PORT);
    println!("  MAX_PASTE_SIZE    Maximum paste size in bytes (default: 2 MiB)");
    println!("  DEFAULT_TTL       Default paste lifetime in seconds (default: 604800)");
    println!("  SWEEP_INTERVAL    Seconds between expiry sweeps (default: 300)");
    println!("  AUTH_MODE         'id' (capability ids) or 'secret' (slug + shared secret)");
    println!("  PUBLIC_URL        Base URL to advertise in responses (default: Host header)");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
