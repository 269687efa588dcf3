//! Collector: startup sequence and event pipeline
//!
//! Startup reads the hub identity, subscribes to state-change events and
//! pushes the full device listing through the dispatch engine. [`Collector::run`]
//! then moves the engine onto a dedicated worker thread fed by a channel, so
//! the metadata cache has a single owner and the startup load always
//! completes before the first live event is handled.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use log::{debug, error, info, warn};

use crate::config::CollectorConfig;
use crate::device::HubEvent;
use crate::dispatch::{DispatchEngine, DispatchStats, LoadSummary, StatsSnapshot};
use crate::error::{HubError, MetricsError, Result};
use crate::health::HealthCheck;
use crate::hub::Hub;
use crate::identity::normalize;
use crate::labels::HubIdentity;
use crate::registry::CategoryRegistry;
use crate::sink::MetricSink;

/// Component name used in health reports
pub const EVENT_LOOP_COMPONENT: &str = "DIRIGERA hub event loop";

enum Message {
    Event(HubEvent),
    Shutdown,
}

/// Connected collector, ready to run its event loop
pub struct Collector {
    hub: Arc<dyn Hub>,
    engine: DispatchEngine,
    events: Receiver<Message>,
    control: Sender<Message>,
    summary: LoadSummary,
}

impl Collector {
    /// Connect to the hub and export the initial state of every device.
    ///
    /// Errors here are fatal: the hub status, its name and the device
    /// listing are all required. Failures of individual devices are not.
    pub fn connect(
        hub: Arc<dyn Hub>,
        sink: Arc<dyn MetricSink>,
        registry: CategoryRegistry,
        config: &CollectorConfig,
    ) -> Result<Self> {
        let status = hub.get_status().map_err(|source| MetricsError::Startup {
            stage: "hub status",
            source,
        })?;
        let hub_name = status
            .attributes
            .text(&config.hub_name_attribute)
            .ok_or(MetricsError::MissingHubName)?;
        let (hub_id, _) = normalize(&status.id);
        let hub_identity = HubIdentity::new(hub_id, hub_name);
        info!("Connected to hub {} ({})", hub_identity.name, hub_identity.id);

        // Events queue up in the channel until the worker starts.
        let (control, events) = mpsc::channel();
        let forward = control.clone();
        hub.register_event_handler(
            Box::new(move |event| {
                if forward.send(Message::Event(event)).is_err() {
                    debug!("Dispatch worker stopped, dropping event");
                }
            }),
            &config.event_type,
        );

        let devices = hub.list_devices().map_err(|source| MetricsError::Startup {
            stage: "device listing",
            source,
        })?;
        let mut engine = DispatchEngine::new(hub_identity, Arc::clone(&hub), registry, sink);
        let summary = engine.load(&devices);

        Ok(Self {
            hub,
            engine,
            events,
            control,
            summary,
        })
    }

    /// Handle for health, stats and shutdown, usable while [`run`](Self::run) blocks
    pub fn handle(&self) -> CollectorHandle {
        CollectorHandle {
            hub: Arc::clone(&self.hub),
            hub_identity: self.engine.hub_identity().clone(),
            stats: self.engine.stats(),
        }
    }

    /// Result of the startup load
    pub fn load_summary(&self) -> LoadSummary {
        self.summary
    }

    pub fn hub_name(&self) -> &str {
        &self.engine.hub_identity().name
    }

    /// Run the hub event loop until it is stopped or fails.
    ///
    /// Blocks the calling thread. Events already queued when the loop
    /// returns are still dispatched before this returns.
    pub fn run(self) -> Result<()> {
        let Self {
            hub,
            mut engine,
            events,
            control,
            ..
        } = self;

        let worker = thread::Builder::new()
            .name("dirigera-dispatch".to_string())
            .spawn(move || {
                for message in events {
                    match message {
                        Message::Event(event) => {
                            engine.handle_event(&event);
                        }
                        Message::Shutdown => break,
                    }
                }
                engine
            })
            .map_err(|e| MetricsError::Worker(e.to_string()))?;

        info!("Listening for hub events");
        let result = hub.start_event_loop();

        if control.send(Message::Shutdown).is_err() {
            warn!("Dispatch worker already stopped");
        }
        match worker.join() {
            Ok(engine) => info!(
                "Dispatch worker stopped after {} snapshots",
                engine.stats().snapshot().snapshots
            ),
            Err(_) => error!("Dispatch worker panicked"),
        }

        result.map_err(MetricsError::EventLoop)
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("engine", &self.engine)
            .field("summary", &self.summary)
            .finish()
    }
}

/// Cloneable view of a running collector
#[derive(Clone)]
pub struct CollectorHandle {
    hub: Arc<dyn Hub>,
    hub_identity: HubIdentity,
    stats: Arc<DispatchStats>,
}

impl CollectorHandle {
    pub fn hub_identity(&self) -> &HubIdentity {
        &self.hub_identity
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Event loop liveness
    pub fn health(&self) -> HealthCheck {
        HealthCheck::from_hub(EVENT_LOOP_COMPONENT, self.hub.event_loop_health())
    }

    /// Ask the hub to stop its event loop; [`Collector::run`] then returns.
    pub fn stop(&self) -> std::result::Result<(), HubError> {
        self.hub.stop_event_loop()
    }
}

impl std::fmt::Debug for CollectorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorHandle")
            .field("hub_identity", &self.hub_identity)
            .finish()
    }
}
