//! Error types for dirigera-metrics
//!
//! This module defines all error types used throughout the library.

use std::fmt;

use thiserror::Error;

/// Result type alias for metric pipeline operations
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Main error type for the metric pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// Malformed connection or exporter parameters (startup only)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The hub could not answer a request
    #[error("Hub unavailable while resolving {device_id}: {source}")]
    HubUnavailable {
        device_id: String,
        #[source]
        source: HubError,
    },

    /// The resolved hub entry lacks a descriptive attribute
    #[error("Incomplete metadata for device {device_id}: missing {missing}")]
    IncompleteMetadata {
        device_id: String,
        missing: MissingField,
    },

    /// No updater is registered for this category pair
    #[error("No metric registered for {category}:{subcategory}")]
    UnknownCategory {
        category: String,
        subcategory: String,
    },

    /// The hub status carries no custom name
    #[error("Hub status has no custom name defined")]
    MissingHubName,

    /// A hub request made while starting up failed
    #[error("Error during startup ({stage}): {source}")]
    Startup {
        stage: &'static str,
        #[source]
        source: HubError,
    },

    /// The event loop returned with an error
    #[error("Event loop terminated: {0}")]
    EventLoop(HubError),

    /// The dispatch worker could not be started
    #[error("Dispatch worker error: {0}")]
    Worker(String),
}

impl MetricsError {
    /// Whether this error must abort process initialization.
    ///
    /// Per-device errors never are; a hub outage is only fatal while starting up.
    pub fn is_fatal(&self, during_startup: bool) -> bool {
        match self {
            Self::Configuration(_)
            | Self::MissingHubName
            | Self::Startup { .. }
            | Self::Worker(_) => true,
            Self::HubUnavailable { .. } => during_startup,
            Self::IncompleteMetadata { .. }
            | Self::UnknownCategory { .. }
            | Self::EventLoop(_) => false,
        }
    }
}

/// Descriptive field missing from a hub entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    /// `customName` attribute
    Name,
    /// Room name
    RoomName,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => f.write_str("device name"),
            Self::RoomName => f.write_str("room name"),
        }
    }
}

/// Errors raised by a [`Hub`](crate::hub::Hub) implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    /// Request timed out
    #[error("Hub request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Unknown device id
    #[error("Device not found: {0}")]
    NotFound(String),

    /// Transport or decoding failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Event loop is not running
    #[error("Event loop is not running")]
    EventLoopStopped,

    /// Event loop terminated with an error
    #[error("Event loop failed: {0}")]
    EventLoopFailed(String),
}
