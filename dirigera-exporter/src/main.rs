// DIRIGERA Exporter - Prometheus exporter for IKEA DIRIGERA hub devices
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # DIRIGERA Exporter
//!
//! Prometheus exporter for IKEA DIRIGERA devices, fed by a recorded hub
//! session.
//!
//! ## Usage
//!
//! ```bash
//! # Export the devices of a hub dump and replay its events
//! dirigera-exporter --hub-dump hub.json --events events.jsonl --speed 10.0
//!
//! # Run on custom port
//! dirigera-exporter --hub-dump hub.json --port 9090
//! ```

mod metrics;
mod replay;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use clap::Parser;
use dirigera_metrics::{
    CategoryRegistry, Collector, CollectorConfig, CollectorHandle, HealthReport, HealthStatus, Hub,
    HubIdentity, MetricSink, MetricsError, StatsSnapshot,
};
use metrics::{encode_metrics, update_dispatch_metrics, PrometheusSink};
use replay::{ReplayConfig, ReplayError, ReplayHub, ReplayState};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// DIRIGERA Prometheus Exporter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "9100", env = "DIRIGERA_EXPORTER_PORT")]
    port: u16,

    /// Hub dump (JSON) with the hub status and the device listing
    #[arg(long, env = "DIRIGERA_HUB_DUMP")]
    hub_dump: PathBuf,

    /// Recorded hub events (JSON lines) to replay
    #[arg(short, long, env = "DIRIGERA_EVENTS")]
    events: Option<PathBuf>,

    /// Replay speed multiplier (1.0 = real-time)
    #[arg(short, long, default_value = "1.0")]
    speed: f64,

    /// Loop the replay when it reaches the end
    #[arg(short, long)]
    loop_replay: bool,

    /// Metric name prefix
    #[arg(long, default_value = "ikea", env = "DIRIGERA_EXPORTER_NAMESPACE")]
    namespace: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn validate(&self) -> Result<(), MetricsError> {
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(MetricsError::Configuration(format!(
                "replay speed must be a positive number, got {}",
                self.speed
            )));
        }
        if !is_metric_prefix(&self.namespace) {
            return Err(MetricsError::Configuration(format!(
                "invalid metric namespace '{}'",
                self.namespace
            )));
        }
        Ok(())
    }
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`
fn is_metric_prefix(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Errors aborting the exporter.
#[derive(Debug, thiserror::Error)]
enum ExporterError {
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error("Failed to load hub session: {0}")]
    Replay(#[from] ReplayError),

    #[error("Failed to register metrics: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Collector task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Application state shared across handlers.
struct AppState {
    sink: Arc<PrometheusSink>,
    collector: CollectorHandle,
    replay_state: Arc<ReplayState>,
    event_count: usize,
    start_time: Instant,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("DIRIGERA Exporter v{}", env!("CARGO_PKG_VERSION"));

    match run(args).await {
        Ok(()) => {
            info!("Shutdown finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), ExporterError> {
    args.validate()?;

    let registry = CategoryRegistry::with_defaults();
    let sink = Arc::new(PrometheusSink::new(&args.namespace, &registry.gauge_specs())?);
    info!("Registered {} device gauges", sink.gauge_count());

    let hub = Arc::new(ReplayHub::from_files(ReplayConfig {
        hub_dump: args.hub_dump.clone(),
        events: args.events.clone(),
        speed: args.speed,
        loop_replay: args.loop_replay,
    })?);
    let replay_state = hub.state();
    let event_count = hub.event_count();

    // Startup talks to the hub synchronously
    let collector = {
        let hub: Arc<dyn Hub> = hub;
        let metric_sink: Arc<dyn MetricSink> = sink.clone();
        tokio::task::spawn_blocking(move || {
            Collector::connect(hub, metric_sink, registry, &CollectorConfig::default())
        })
        .await??
    };
    let summary = collector.load_summary();
    info!(
        "DIRIGERA collector created for hub {}: {} of {} devices exported",
        collector.hub_name(),
        summary.updated,
        summary.devices
    );

    let handle = collector.handle();
    let event_loop = tokio::task::spawn_blocking(move || collector.run());

    let state = Arc::new(AppState {
        sink,
        collector: handle.clone(),
        replay_state,
        event_count,
        start_time: Instant::now(),
    });

    // Build router
    let app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/status", get(status_handler))
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Starting server on http://{}", addr);
    info!("Metrics endpoint: http://{}/metrics", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown started...");
    match handle.stop() {
        Ok(()) => info!("Event listening stopped"),
        Err(e) => warn!("Error stopping event listening: {}", e),
    }
    settle_event_loop(event_loop.await?)?;
    Ok(())
}

/// Errors the event loop may end with that only warrant a warning.
fn settle_event_loop(result: Result<(), MetricsError>) -> Result<(), MetricsError> {
    match result {
        Err(e) if !e.is_fatal(false) => {
            warn!("Event loop ended with an error: {}", e);
            Ok(())
        }
        other => other,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = async {
        std::future::pending::<()>().await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Root handler - shows a simple HTML page.
async fn root_handler() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>DIRIGERA Exporter</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }
        h1 { color: #2c3e50; }
        a { color: #3498db; text-decoration: none; }
        a:hover { text-decoration: underline; }
        .endpoints { background: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0; }
        .endpoint { margin: 10px 0; }
        code { background: #e9ecef; padding: 2px 6px; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>DIRIGERA Exporter</h1>
    <p>Prometheus exporter for IKEA DIRIGERA hub devices.</p>

    <div class="endpoints">
        <h2>Endpoints</h2>
        <div class="endpoint"><a href="/metrics">/metrics</a> - Prometheus metrics</div>
        <div class="endpoint"><a href="/health">/health</a> - Health check</div>
        <div class="endpoint"><a href="/ready">/ready</a> - Readiness check</div>
        <div class="endpoint"><a href="/status">/status</a> - Status information (JSON)</div>
    </div>

    <h2>Metrics</h2>
    <ul>
        <li><code>*_device_reachable</code> - Device reachability</li>
        <li><code>*_device_last_seen_timestamp</code> - Last time a device was seen</li>
        <li><code>*_device_current_battery_level</code> - Battery level</li>
        <li><code>*_environment_sensor_*</code> - Temperature, humidity, PM2.5, VOC index</li>
        <li><code>*_outlet_*</code> - Outlet state, voltage, current, power, energy</li>
        <li><code>*_light_*</code> - Light state, level and color</li>
        <li><code>dirigera_exporter_*</code> - Exporter self-metrics</li>
    </ul>
</body>
</html>"#,
    )
}

/// Metrics handler - returns Prometheus text format.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let event_loop_up = state.collector.health().status.is_healthy();
    update_dispatch_metrics(&state.collector.stats(), event_loop_up);

    match encode_metrics(&state.sink) {
        Ok(metrics) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; charset=utf-8")],
            metrics,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}

/// Health check handler.
async fn health_handler(State(state): State<Arc<AppState>>) -> Response {
    let mut report = HealthReport::new();
    report.add_check(state.collector.health());

    if report.status().is_healthy() {
        (StatusCode::OK, "OK").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(report.failures())).into_response()
    }
}

/// Readiness check handler.
async fn ready_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.collector.health().status.is_healthy() {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
    }
}

/// Status information response.
#[derive(Serialize)]
struct StatusResponse {
    version: String,
    uptime_secs: u64,
    hub: HubIdentity,
    health: HealthStatus,
    dispatch: StatsSnapshot,
    replay: ReplayStatus,
}

/// Replay status information.
#[derive(Serialize)]
struct ReplayStatus {
    running: bool,
    position: usize,
    delivered: usize,
    skipped: usize,
    total_events: usize,
}

/// Status handler - returns JSON status information.
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let replay = ReplayStatus {
        running: state.replay_state.running.load(Ordering::SeqCst),
        position: state.replay_state.position.load(Ordering::SeqCst),
        delivered: state.replay_state.delivered.load(Ordering::SeqCst),
        skipped: state.replay_state.skipped.load(Ordering::SeqCst),
        total_events: state.event_count,
    };

    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        hub: state.collector.hub_identity().clone(),
        health: state.collector.health().status,
        dispatch: state.collector.stats(),
        replay,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirigera_metrics::HubError;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["dirigera-exporter", "--hub-dump", "hub.json"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_default_args() {
        let args = args(&[]);
        assert_eq!(args.namespace, "ikea");
        assert_eq!(args.speed, 1.0);
        assert!(!args.loop_replay);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_invalid_speed() {
        let err = args(&["--speed", "0"]).validate().unwrap_err();
        assert!(matches!(err, MetricsError::Configuration(_)));
        assert!(err.is_fatal(true));
    }

    #[test]
    fn test_invalid_namespace() {
        assert!(args(&["--namespace", "9lives"]).validate().is_err());
        assert!(args(&["--namespace", "ikea-home"]).validate().is_err());
        assert!(args(&["--namespace", "ikea_home"]).validate().is_ok());
    }

    #[test]
    fn test_event_loop_error_is_not_fatal() {
        let ended = MetricsError::EventLoop(HubError::EventLoopFailed("reset".to_string()));
        assert!(settle_event_loop(Err(ended)).is_ok());

        let worker = MetricsError::Worker("spawn failed".to_string());
        assert_eq!(settle_event_loop(Err(worker.clone())), Err(worker));
        assert!(settle_event_loop(Ok(())).is_ok());
    }

    #[test]
    fn test_is_metric_prefix() {
        assert!(is_metric_prefix("_x1"));
        assert!(!is_metric_prefix(""));
    }
}
