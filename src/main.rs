use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use dirshare::{browser, create_router, logging, AppState, Config, SharedRoot};

#[derive(Parser, Debug)]
#[command(name = "dirshare")]
#[command(about = "Share a local folder over HTTP: browse, download and upload files")]
#[command(version)]
struct Cli {
    /// IP address to bind the server
    #[arg(short, long, alias = "bind", env = "DIRSHARE_IP", default_value = "127.0.0.1")]
    ip: IpAddr,

    /// Port to bind the server
    #[arg(short, long, env = "DIRSHARE_PORT", default_value = "8085")]
    port: u16,

    /// Local folder to share
    #[arg(short, long, alias = "root", env = "DIRSHARE_FOLDER", default_value = "shared")]
    folder: PathBuf,

    /// Config file path (optional)
    #[arg(short, long, env = "DIRSHARE_CONFIG")]
    config: Option<PathBuf>,

    /// Log file path (defaults to server_<ip>_<port>.log)
    #[arg(long, env = "DIRSHARE_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Do not open a browser after startup
    #[arg(long, env = "DIRSHARE_NO_BROWSER")]
    no_browser: bool,

    /// Enable verbose logging
    #[arg(short, long, env = "DIRSHARE_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The folder is checked before anything touches the log file
    let root = SharedRoot::new(&cli.folder).with_context(|| {
        format!(
            "The directory {} does not exist. Please create it or specify a valid path.",
            cli.folder.display()
        )
    })?;

    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };
    if cli.no_browser {
        config.open_browser = false;
    }

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| config.log_file(cli.ip, cli.port));
    let _log_guard = logging::init(&log_file, cli.verbose)?;

    info!("Serving files from: {}", root.path().display());
    info!("Writing log to: {}", log_file.display());

    let open_browser = config.open_browser;
    let browser_delay = config.browser_delay();
    let app = create_router(AppState::with_config(root, config));

    let addr = SocketAddr::new(cli.ip, cli.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    let local_addr = listener.local_addr().context("reading bound address")?;
    info!("Starting dirshare on {}", local_addr);

    if open_browser {
        browser::open_after(browser::index_url(local_addr), browser_delay);
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("running server")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
