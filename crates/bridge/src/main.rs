//! `openapi-mcp-bridge`: serve an `OpenAPI`-described HTTP API as MCP tools.
//!
//! - stdio transport for assistants that spawn the bridge as a child process
//! - streamable HTTP transport at `/mcp`

mod config;
mod refresh;
mod server;

use anyhow::Context as _;
use clap::Parser as _;
use config::{Args, LogFormat, Transport};
use openapi_mcp_tools::OpenApiToolSource;
use rmcp::ServiceExt as _;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use server::BridgeServer;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level, args.log_format);

    let source_config = args.source_config()?;
    let spec = source_config.spec.clone();
    let source = OpenApiToolSource::new(source_config);
    source
        .start()
        .await
        .with_context(|| format!("failed to load OpenAPI spec from '{spec}'"))?;

    let server = BridgeServer::new(source.clone());
    let cancel = CancellationToken::new();

    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("shutting down");
        cancel_for_signal.cancel();
    });

    if let Some(period) = args.refresh_interval() {
        tokio::spawn(refresh::run_spec_refresh(
            source,
            server.peers(),
            period,
            cancel.child_token(),
        ));
    }

    match args.transport {
        Transport::Stdio => run_stdio(server, cancel).await,
        Transport::Http => run_http(server, &args.bind, cancel).await,
    }
}

/// Logs always go to stderr; stdout carries the stdio transport.
fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run_stdio(server: BridgeServer, cancel: CancellationToken) -> anyhow::Result<()> {
    let running = server
        .serve_with_ct(rmcp::transport::stdio(), cancel.clone())
        .await
        .map_err(|e| anyhow::anyhow!("failed to initialize stdio transport: {e:?}"))?;

    tracing::info!("stdio transport ready");

    tokio::select! {
        result = running.waiting() => {
            let reason = result.context("stdio transport error")?;
            tracing::info!(?reason, "stdio transport closed");
        }
        () = cancel.cancelled() => {
            tracing::info!("stdio transport cancelled");
        }
    }

    Ok(())
}

async fn run_http(server: BridgeServer, bind: &str, cancel: CancellationToken) -> anyhow::Result<()> {
    let mcp_service = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            cancellation_token: cancel.child_token(),
            ..Default::default()
        },
    );
    let app = axum::Router::new().nest_service("/mcp", mcp_service);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind to {bind}"))?;
    let local_addr = listener.local_addr()?;
    tracing::info!(addr = %local_addr, "streamable HTTP transport listening at /mcp");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .context("HTTP server error")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
