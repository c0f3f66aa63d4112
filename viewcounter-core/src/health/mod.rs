//! Health check payloads for the liveness endpoints

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// Health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    /// Convert to HTTP status code
    pub fn to_http_status(&self) -> u16 {
        match self {
            HealthStatus::Healthy => 200,
            HealthStatus::Unhealthy => 503,
        }
    }
}

/// Health check result served over HTTP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: HealthStatus,
    pub replica_id: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Tracks process liveness for the health endpoints
pub struct HealthChecker {
    start_time: SystemTime,
    replica_id: String,
    version: String,
}

impl HealthChecker {
    /// Create a new health checker for this replica
    pub fn new(replica_id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            start_time: SystemTime::now(),
            replica_id: replica_id.into(),
            version: version.into(),
        }
    }

    /// Current health status
    ///
    /// If this code runs at all the process is alive; counter state is
    /// in-memory, so there is no dependency that can degrade.
    pub fn check_health(&self) -> HealthCheck {
        let uptime = self
            .start_time
            .elapsed()
            .unwrap_or(Duration::from_secs(0))
            .as_secs();

        HealthCheck {
            status: HealthStatus::Healthy,
            replica_id: self.replica_id.clone(),
            version: self.version.clone(),
            uptime_seconds: uptime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check() {
        let checker = HealthChecker::new("replica-1", "1.0.0");
        let health = checker.check_health();

        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.replica_id, "replica-1");
        assert_eq!(health.version, "1.0.0");
    }

    #[test]
    fn test_status_to_http() {
        assert_eq!(HealthStatus::Healthy.to_http_status(), 200);
        assert_eq!(HealthStatus::Unhealthy.to_http_status(), 503);
    }
}
