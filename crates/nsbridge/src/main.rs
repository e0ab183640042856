//! nsbridge: serves namespace content summaries as streamed XML over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use nsbridge_api::metrics::init_metrics;
use nsbridge_api::{create_router, AppState, IdentityResolver};
use nsbridge_core::client::{MemoryNamespace, WebHdfsClientFactory};
use nsbridge_core::config::{Config, LogFormat};
use nsbridge_core::ClientFactory;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;
mod fetch_cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Fails only if a provider is already installed.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => run_server(args).await,
        Commands::Fetch(args) => fetch_cli::handle_fetch(args).await,
        Commands::Version => {
            println!("nsbridge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_server(args: cli::ServeArgs) -> Result<()> {
    // Load configuration and apply CLI overrides
    let mut config = load_config(&args.config)?;

    if let Some(bind) = &args.bind {
        config.server.bind =
            bind.parse().with_context(|| format!("Invalid bind address: {bind}"))?;
    }
    if let Some(endpoint) = &args.metadata_endpoint {
        config.metadata.endpoint.clone_from(endpoint);
    }

    init_logging(&config)?;

    if config.metrics.enabled {
        init_metrics();

        // Start Prometheus exporter on separate port
        let metrics_addr: SocketAddr = format!("{}:{}", config.metrics.bind, config.metrics.port)
            .parse()
            .context("Invalid metrics bind address")?;

        PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()
            .context("Failed to install Prometheus exporter")?;

        info!("Metrics endpoint listening on http://{}/metrics", metrics_addr);
    }

    print_banner(&config, args.memory);

    let clients: Arc<dyn ClientFactory> = if args.memory {
        warn!("Serving from an in-memory namespace; summaries are not real");
        Arc::new(MemoryNamespace::with_root())
    } else {
        let factory = WebHdfsClientFactory::new(&config.metadata)
            .context("Failed to create metadata client")?;
        info!(endpoint = %factory.endpoint(), "Using WebHDFS metadata service");
        Arc::new(factory)
    };

    let identity =
        IdentityResolver::new(&config.identity).context("Invalid identity configuration")?;
    let app = create_router(AppState::new(clients, identity), config.logging.log_requests);

    let addr = config.server.bind;

    let tls_config = match (&config.server.tls_cert, &config.server.tls_key) {
        (Some(cert_path), Some(key_path)) => {
            let rustls_config =
                RustlsConfig::from_pem_file(cert_path, key_path).await.with_context(|| {
                    format!(
                        "Failed to load TLS certificates from {} and {}",
                        cert_path.display(),
                        key_path.display()
                    )
                })?;
            Some(rustls_config)
        }
        (Some(_), None) => {
            anyhow::bail!("TLS certificate specified but key is missing");
        }
        (None, Some(_)) => {
            anyhow::bail!("TLS key specified but certificate is missing");
        }
        (None, None) => None,
    };

    if let Some(tls_config) = tls_config {
        info!("Server listening on https://{} (TLS enabled)", addr);
        println!("\n  Ready to accept connections (HTTPS).\n");

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown_handle.graceful_shutdown(Some(std::time::Duration::from_secs(10)));
        });

        axum_server::bind_rustls(addr, tls_config)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("Server error")?;
    } else {
        let listener = TcpListener::bind(addr).await.context("Failed to bind to address")?;
        info!("Server listening on http://{}", addr);
        println!("\n  Ready to accept connections.\n");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;
    }

    info!("Server shutdown complete");
    Ok(())
}

fn load_config(path: &Option<PathBuf>) -> Result<Config> {
    Config::load(path.as_deref()).context("Failed to load configuration")
}

fn init_logging(config: &Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry().with(filter).with(fmt_layer.json()).try_init()?;
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry().with(filter).with(fmt_layer).try_init()?;
        }
    }

    Ok(())
}

fn print_banner(config: &Config, memory: bool) {
    let scheme = if config.server.tls_cert.is_some() { "https" } else { "http" };
    let metadata = if memory { "in-memory namespace" } else { config.metadata.endpoint.as_str() };

    println!(
        r#"
  nsbridge v{}
  Content summaries as XML

  Endpoint:    {}://{}/contentSummary/{{path}}
  Metadata:    {}
  Default UGI: {}
  Anonymous:   {}
  TLS:         {}

  Try:
    curl '{}://{}/contentSummary/?ugi={}'
"#,
        env!("CARGO_PKG_VERSION"),
        scheme,
        config.server.bind,
        metadata,
        config.identity.default_ugi,
        if config.identity.allow_anonymous { "allowed" } else { "rejected" },
        if config.server.tls_cert.is_some() { "enabled" } else { "disabled" },
        scheme,
        config.server.bind,
        config.identity.default_ugi,
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
    }
}
