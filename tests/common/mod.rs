// DIRIGERA Metrics - Shared integration test fixtures
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::thread::{self, ThreadId};

use dirigera_metrics::cache::NAME_ATTRIBUTE;
use dirigera_metrics::hub::EventHandler;
use dirigera_metrics::{DeviceSnapshot, GaugeSpec, Hub, HubError, HubEvent, LabelSet, MetricSink};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// In-memory hub counting the requests it serves
pub struct MockHub {
    pub status: DeviceSnapshot,
    pub devices: Vec<DeviceSnapshot>,
    /// Delivered in order by `start_event_loop`, which then returns
    pub events: Vec<HubEvent>,
    pub fail_status: bool,
    pub fail_listing: bool,
    pub fetches: AtomicUsize,
    handlers: Mutex<Vec<(String, EventHandler)>>,
    running: AtomicBool,
}

impl MockHub {
    pub fn new(devices: Vec<DeviceSnapshot>) -> Self {
        Self {
            status: DeviceSnapshot::new("hub_1", "gateway", "gateway")
                .with_attribute(NAME_ATTRIBUTE, "Home"),
            devices,
            events: Vec::new(),
            fail_status: false,
            fail_listing: false,
            fetches: AtomicUsize::new(0),
            handlers: Mutex::new(Vec::new()),
            running: AtomicBool::new(false),
        }
    }

    pub fn with_events(mut self, events: Vec<HubEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.lock().unwrap().len()
    }
}

impl Hub for MockHub {
    fn get_status(&self) -> Result<DeviceSnapshot, HubError> {
        if self.fail_status {
            return Err(HubError::Transport("connection refused".to_string()));
        }
        Ok(self.status.clone())
    }

    fn list_devices(&self) -> Result<Vec<DeviceSnapshot>, HubError> {
        if self.fail_listing {
            return Err(HubError::Timeout { timeout_ms: 5000 });
        }
        Ok(self.devices.clone())
    }

    fn get_device(&self, id: &str) -> Result<DeviceSnapshot, HubError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.devices
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| HubError::NotFound(id.to_string()))
    }

    fn register_event_handler(&self, handler: EventHandler, event_type: &str) {
        self.handlers
            .lock()
            .unwrap()
            .push((event_type.to_string(), handler));
    }

    fn start_event_loop(&self) -> Result<(), HubError> {
        self.running.store(true, Ordering::SeqCst);
        {
            let handlers = self.handlers.lock().unwrap();
            for event in &self.events {
                for (event_type, handler) in handlers.iter() {
                    if *event_type == event.event_type {
                        handler(event.clone());
                    }
                }
            }
        }
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn stop_event_loop(&self) -> Result<(), HubError> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn event_loop_health(&self) -> Result<(), HubError> {
        if self.running.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(HubError::EventLoopStopped)
        }
    }
}

/// Sink keeping the last value per (metric, labels), with a write counter
#[derive(Default)]
pub struct RecordingSink {
    values: Mutex<HashMap<(String, LabelSet), f64>>,
    writes: AtomicUsize,
}

impl RecordingSink {
    /// Last value of `metric` (`<subsystem>_<name>`) for a logical device id
    pub fn value(&self, metric: &str, device_id: &str) -> Option<f64> {
        self.values
            .lock()
            .unwrap()
            .iter()
            .find(|((name, labels), _)| name == metric && labels.device_id == device_id)
            .map(|(_, value)| *value)
    }

    /// Label sets written for a logical device id
    pub fn labels_for(&self, device_id: &str) -> Vec<LabelSet> {
        self.values
            .lock()
            .unwrap()
            .keys()
            .filter(|(_, labels)| labels.device_id == device_id)
            .map(|(_, labels)| labels.clone())
            .collect()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl MetricSink for RecordingSink {
    fn set(&self, gauge: &GaugeSpec, labels: &LabelSet, value: f64) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.values
            .lock()
            .unwrap()
            .insert((gauge.full_name(""), labels.clone()), value);
    }
}

pub fn named(id: &str, category: &str, subcategory: &str, name: &str, room: &str) -> DeviceSnapshot {
    DeviceSnapshot::new(id, category, subcategory)
        .with_attribute(NAME_ATTRIBUTE, name)
        .with_room(format!("{}-room", room.to_lowercase()), room)
}

pub fn state_changed(data: DeviceSnapshot) -> HubEvent {
    HubEvent::new("deviceStateChanged", data)
}

/// Logger keeping warnings per test thread
struct WarningLog;

static LOGGER: WarningLog = WarningLog;
static LOGGER_INIT: Once = Once::new();
static WARNINGS: Mutex<Vec<(ThreadId, String)>> = Mutex::new(Vec::new());

impl Log for WarningLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            WARNINGS
                .lock()
                .unwrap()
                .push((thread::current().id(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

/// Start recording warnings logged by the current thread
pub fn capture_warnings() {
    LOGGER_INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Warn);
    });
    let current = thread::current().id();
    WARNINGS.lock().unwrap().retain(|(id, _)| *id != current);
}

/// Warnings logged by the current thread since `capture_warnings`
pub fn warnings() -> Vec<String> {
    let current = thread::current().id();
    WARNINGS
        .lock()
        .unwrap()
        .iter()
        .filter(|(id, _)| *id == current)
        .map(|(_, message)| message.clone())
        .collect()
}
