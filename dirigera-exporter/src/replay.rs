// DIRIGERA Exporter - Recorded hub session replay
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Hub implementation replaying a recorded DIRIGERA session.
//!
//! The hub dump is a JSON document holding the hub status and the device
//! listing. The optional event recording is a JSON-lines file, one hub event
//! per line, replayed in order with the recorded time gaps divided by the
//! replay speed.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dirigera_metrics::hub::EventHandler;
use dirigera_metrics::{DeviceSnapshot, Hub, HubError, HubEvent};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Stop flag polling interval while waiting between events
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for session replay.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Path to the hub dump (JSON).
    pub hub_dump: PathBuf,
    /// Path to the event recording (JSON lines).
    pub events: Option<PathBuf>,
    /// Replay speed multiplier (1.0 = real-time, 10.0 = 10x faster).
    pub speed: f64,
    /// Whether to restart the recording when it ends.
    pub loop_replay: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            hub_dump: PathBuf::new(),
            events: None,
            speed: 1.0,
            loop_replay: false,
        }
    }
}

/// Recorded hub state
#[derive(Debug, Clone, Deserialize)]
pub struct HubDump {
    pub status: DeviceSnapshot,
    #[serde(default)]
    pub devices: Vec<DeviceSnapshot>,
}

/// State of the replay loop.
#[derive(Debug, Default)]
pub struct ReplayState {
    /// Index of the next event line.
    pub position: AtomicUsize,
    /// Events delivered since start, loops included.
    pub delivered: AtomicUsize,
    /// Undecodable lines passed over.
    pub skipped: AtomicUsize,
    /// Whether the event loop is running.
    pub running: AtomicBool,
    /// Set by a stop request, even one arriving before the loop starts.
    stop_requested: AtomicBool,
    /// Error that terminated the loop, if any.
    failure: Mutex<Option<HubError>>,
}

impl ReplayState {
    fn fail(&self, error: HubError) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(error);
        }
    }

    fn failure(&self) -> Option<HubError> {
        self.failure.lock().ok().and_then(|f| f.clone())
    }
}

/// Hub answering from a recorded session
pub struct ReplayHub {
    config: ReplayConfig,
    dump: HubDump,
    lines: Vec<String>,
    handlers: Mutex<Vec<(String, EventHandler)>>,
    state: Arc<ReplayState>,
}

impl ReplayHub {
    /// Load the hub dump and, if configured, the event recording.
    pub fn from_files(config: ReplayConfig) -> Result<Self, ReplayError> {
        let dump = Self::load_dump(&config.hub_dump)?;
        let lines = match &config.events {
            Some(path) => Self::load_lines(path)?,
            None => Vec::new(),
        };

        info!(
            "Loaded hub dump: {} devices, {} recorded events",
            dump.devices.len(),
            lines.len()
        );

        Ok(Self::new(config, dump, lines))
    }

    /// Build a hub from an in-memory dump and raw event lines.
    pub fn new(config: ReplayConfig, dump: HubDump, lines: Vec<String>) -> Self {
        Self {
            config,
            dump,
            lines,
            handlers: Mutex::new(Vec::new()),
            state: Arc::new(ReplayState::default()),
        }
    }

    fn load_dump(path: &Path) -> Result<HubDump, ReplayError> {
        if !path.exists() {
            return Err(ReplayError::FileNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn load_lines(path: &Path) -> Result<Vec<String>, ReplayError> {
        if !path.exists() {
            return Err(ReplayError::FileNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let lines: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        if lines.is_empty() {
            return Err(ReplayError::EmptyRecording);
        }
        Ok(lines)
    }

    /// Get the replay state.
    pub fn state(&self) -> Arc<ReplayState> {
        Arc::clone(&self.state)
    }

    /// Number of recorded events
    pub fn event_count(&self) -> usize {
        self.lines.len()
    }

    fn dispatch(&self, event: HubEvent) -> Result<(), HubError> {
        let handlers = self
            .handlers
            .lock()
            .map_err(|_| HubError::EventLoopFailed("event handler list poisoned".to_string()))?;
        let mut matched = handlers
            .iter()
            .filter(|(event_type, _)| *event_type == event.event_type)
            .peekable();

        if matched.peek().is_none() {
            debug!("No handler for event type {}", event.event_type);
        }
        for (_, handler) in matched {
            handler(event.clone());
        }
        self.state.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Sleep for the recorded gap, waking early when stopped.
    fn wait(&self, gap: Duration) {
        let deadline = Instant::now().checked_add(gap);
        while self.state.running.load(Ordering::SeqCst) {
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => POLL_INTERVAL,
            };
            if remaining.is_zero() {
                break;
            }
            thread::sleep(remaining.min(POLL_INTERVAL));
        }
    }

    fn scaled_gap(&self, previous: Option<DateTime<Utc>>, current: Option<DateTime<Utc>>) -> Duration {
        let (Some(previous), Some(current)) = (previous, current) else {
            return Duration::ZERO;
        };
        let gap_ms = (current - previous).num_milliseconds().max(0) as f64;
        Duration::from_millis((gap_ms / self.config.speed) as u64)
    }

    fn replay(&self) -> Result<(), HubError> {
        let mut previous: Option<DateTime<Utc>> = None;

        loop {
            if !self.state.running.load(Ordering::SeqCst) {
                return Ok(());
            }

            let position = self.state.position.load(Ordering::SeqCst);
            if position >= self.lines.len() {
                if self.config.loop_replay && !self.lines.is_empty() {
                    info!("Recording complete, looping...");
                    self.state.position.store(0, Ordering::SeqCst);
                    previous = None;
                    continue;
                }
                info!("Recording complete, waiting for shutdown");
                self.wait(Duration::MAX);
                return Ok(());
            }

            let event: HubEvent = match serde_json::from_str(&self.lines[position]) {
                Ok(event) => event,
                Err(e) => {
                    warn!("Skipping undecodable event on line {}: {}", position + 1, e);
                    self.state.skipped.fetch_add(1, Ordering::SeqCst);
                    self.state.position.fetch_add(1, Ordering::SeqCst);
                    continue;
                }
            };

            self.wait(self.scaled_gap(previous, event.time));
            if !self.state.running.load(Ordering::SeqCst) {
                return Ok(());
            }
            previous = event.time;

            self.dispatch(event)?;
            self.state.position.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Hub for ReplayHub {
    fn get_status(&self) -> Result<DeviceSnapshot, HubError> {
        Ok(self.dump.status.clone())
    }

    fn list_devices(&self) -> Result<Vec<DeviceSnapshot>, HubError> {
        Ok(self.dump.devices.clone())
    }

    fn get_device(&self, id: &str) -> Result<DeviceSnapshot, HubError> {
        self.dump
            .devices
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| HubError::NotFound(id.to_string()))
    }

    fn register_event_handler(&self, handler: EventHandler, event_type: &str) {
        match self.handlers.lock() {
            Ok(mut handlers) => handlers.push((event_type.to_string(), handler)),
            Err(_) => warn!("Event handler list poisoned, handler for {} dropped", event_type),
        }
    }

    fn start_event_loop(&self) -> Result<(), HubError> {
        if self.state.running.swap(true, Ordering::SeqCst) {
            return Err(HubError::EventLoopFailed("event loop already running".to_string()));
        }
        if self.state.stop_requested.load(Ordering::SeqCst) {
            info!("Stop requested before replay started");
            self.state.running.store(false, Ordering::SeqCst);
            return Ok(());
        }
        info!(
            "Starting replay: speed={}, loop={}",
            self.config.speed, self.config.loop_replay
        );

        let result = self.replay();
        if let Err(ref e) = result {
            self.state.fail(e.clone());
        }
        self.state.running.store(false, Ordering::SeqCst);
        result
    }

    fn stop_event_loop(&self) -> Result<(), HubError> {
        self.state.stop_requested.store(true, Ordering::SeqCst);
        if !self.state.running.swap(false, Ordering::SeqCst) {
            return Err(HubError::EventLoopStopped);
        }
        Ok(())
    }

    fn event_loop_health(&self) -> Result<(), HubError> {
        if let Some(failure) = self.state.failure() {
            return Err(failure);
        }
        if self.state.running.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(HubError::EventLoopStopped)
        }
    }
}

/// Replay errors.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Event recording is empty")]
    EmptyRecording,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
