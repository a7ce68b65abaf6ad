//! # QuantumFlow Runner
//!
//! Binary crate wiring the engine together: CLI parsing, tracing setup,
//! the ingress ring and bridge socket, the WebSocket telemetry server,
//! and the matching thread running the core loop.
//!
//! ## Threading
//! - **matching thread**: owns books, strategies, histories, converters
//!   and both ingress consumers; runs [`engine::Engine::run`].
//! - **tokio runtime**: serves telemetry WebSocket clients and waits for
//!   Ctrl-C; talks to the matching thread only through the shutdown flag
//!   and the broadcast channel.

pub mod engine;
pub mod latency;
pub mod telemetry;
pub mod ws;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quantumflow_ingress::{BridgeSocket, EventRing, DEFAULT_BRIDGE_SOCKET_PATH};
use quantumflow_strategy::StrategyEngine;

use crate::engine::{Engine, EngineConfig};
use crate::telemetry::{NullSink, TelemetrySink};
use crate::ws::WsSink;

#[derive(Parser, Debug)]
#[command(name = "quantumflow")]
#[command(about = "QuantumFlow - low-latency trading engine core")]
#[command(version)]
pub struct Cli {
    /// Run without the WebSocket telemetry server
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// Comma-separated instrument list
    #[arg(long, default_value = "BTC-USDT-SWAP,ETH-USDT-SWAP")]
    pub symbols: String,

    /// Telemetry WebSocket port
    #[arg(long, default_value_t = 9001)]
    pub ws_port: u16,

    /// Bridge datagram socket path
    #[arg(long, default_value = DEFAULT_BRIDGE_SOCKET_PATH)]
    pub bridge_socket: String,
}

impl Cli {
    pub fn symbol_list(&self) -> Vec<String> {
        self.symbols
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Default log filter: engine crates at info, dependencies at warn.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quantumflow=info,warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Entry point for the `quantumflow` binary.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let symbols = cli.symbol_list();
    info!("QuantumFlow trading engine");
    info!(
        symbols = ?symbols,
        mode = if cli.headless { "headless" } else { "webui" },
        "startup config"
    );

    // The producer handle is the in-process feed's attach point; embedders
    // push through it while the matching thread drains the consumer half.
    let (_ring_producer, ring_consumer) = EventRing::with_default_capacity();

    let socket = BridgeSocket::bind(&cli.bridge_socket)
        .with_context(|| format!("binding bridge socket at {}", cli.bridge_socket))?;
    info!("[BRIDGE] listening on {}", socket.path().display());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    let sink: Arc<dyn TelemetrySink> = if cli.headless {
        Arc::new(NullSink)
    } else {
        let ws_sink = WsSink::new();
        runtime.spawn(ws::start_server(ws_sink.sender(), cli.ws_port));
        Arc::new(ws_sink)
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        runtime.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown requested");
                shutdown.store(true, Ordering::Relaxed);
            }
        });
    }

    let config = EngineConfig {
        symbols,
        headless: cli.headless,
        ..Default::default()
    };
    let mut engine = Engine::new(
        config,
        StrategyEngine::with_builtins(),
        ring_consumer,
        Some(socket),
        sink,
    );

    let matching = std::thread::Builder::new()
        .name("matching".to_string())
        .spawn({
            let shutdown = shutdown.clone();
            move || engine.run(&shutdown)
        })
        .context("spawning matching thread")?;

    matching
        .join()
        .map_err(|_| anyhow::anyhow!("matching thread panicked"))?;

    info!("QuantumFlow shutdown complete");
    Ok(())
}
