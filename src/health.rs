//! Health reporting
//!
//! Aggregates per-component checks into the liveness surface exposed by the
//! exporter.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::HubError;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum HealthStatus {
    /// Component is healthy
    Healthy,
    /// Component is unhealthy
    Unhealthy,
    /// Component status is unknown
    #[default]
    Unknown,
}

impl HealthStatus {
    /// Check if the status is healthy
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Health check result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthCheck {
    /// Component name
    pub component: String,
    /// Status
    pub status: HealthStatus,
    /// Details message
    pub message: String,
}

impl HealthCheck {
    /// Create a healthy check result
    pub fn healthy(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Healthy,
            message: "OK".to_string(),
        }
    }

    /// Create an unhealthy check result
    pub fn unhealthy(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Unhealthy,
            message: message.into(),
        }
    }

    /// Map a hub health probe to a check
    pub fn from_hub(component: impl Into<String>, probe: Result<(), HubError>) -> Self {
        match probe {
            Ok(()) => Self::healthy(component),
            Err(err) => Self::unhealthy(component, err.to_string()),
        }
    }
}

/// Set of component checks
#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthReport {
    checks: Vec<HealthCheck>,
}

impl HealthReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a health check result, replacing an older one for the same component
    pub fn add_check(&mut self, check: HealthCheck) {
        self.checks.retain(|c| c.component != check.component);
        self.checks.push(check);
    }

    /// Overall status: unknown without checks, unhealthy if any check is
    pub fn status(&self) -> HealthStatus {
        if self.checks.is_empty() {
            HealthStatus::Unknown
        } else if self.checks.iter().all(|c| c.status.is_healthy()) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        }
    }

    /// Get all checks
    pub fn checks(&self) -> &[HealthCheck] {
        &self.checks
    }

    /// Component name to error message, for every failing check
    pub fn failures(&self) -> BTreeMap<String, String> {
        self.checks
            .iter()
            .filter(|c| !c.status.is_healthy())
            .map(|c| (c.component.clone(), c.message.clone()))
            .collect()
    }
}
