//! Hub capability
//!
//! The transport (TLS session, authentication, event subscription,
//! reconnection) lives behind this trait. Implementations use interior
//! mutability; every method takes `&self` so the hub can be shared between
//! the event loop thread and the read-through path of the metadata cache.

use crate::device::{DeviceSnapshot, HubEvent};
use crate::error::HubError;

/// Callback invoked once per delivered event
pub type EventHandler = Box<dyn Fn(HubEvent) + Send + Sync>;

/// Event type carrying device state changes
pub const DEVICE_STATE_CHANGED: &str = "deviceStateChanged";

/// Authoritative source of device state
pub trait Hub: Send + Sync {
    /// Status of the hub itself (its id and `customName`)
    fn get_status(&self) -> Result<DeviceSnapshot, HubError>;

    /// All devices known to the hub
    fn list_devices(&self) -> Result<Vec<DeviceSnapshot>, HubError>;

    /// One device by raw id. May block for one round trip.
    fn get_device(&self, id: &str) -> Result<DeviceSnapshot, HubError>;

    /// Register `handler` for events of `event_type`.
    ///
    /// Handlers are invoked sequentially from the event loop thread.
    fn register_event_handler(&self, handler: EventHandler, event_type: &str);

    /// Run the event loop; blocks until stopped or failed.
    fn start_event_loop(&self) -> Result<(), HubError>;

    /// Ask a running event loop to return.
    fn stop_event_loop(&self) -> Result<(), HubError>;

    /// `Ok` while the event loop is delivering events
    fn event_loop_health(&self) -> Result<(), HubError>;
}
