use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::domain::metric::service::MetricService;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: BTreeMap<String, String>,
}

impl HealthStatus {
    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

/// Liveness only; never touches a backend.
pub fn health() -> HealthStatus {
    HealthStatus {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        checks: BTreeMap::from([
            ("server".to_string(), "ok".to_string()),
            ("api".to_string(), "ok".to_string()),
        ]),
    }
}

pub async fn readiness(metrics: &MetricService) -> HealthStatus {
    let (inventory, prometheus) = metrics.probe().await;

    let mut checks = BTreeMap::new();
    let mut ready = true;

    for (name, outcome) in [
        ("kubernetes", inventory.map_err(|e| e.to_string())),
        ("prometheus", prometheus.map_err(|e| e.to_string())),
    ] {
        let state = match outcome {
            Ok(()) => "ok".to_string(),
            Err(err) => {
                warn!("Readiness check '{}' failed: {}", name, err);
                ready = false;
                format!("unavailable: {}", err)
            }
        };
        checks.insert(name.to_string(), state);
    }

    HealthStatus {
        status: if ready { "ready" } else { "not ready" }.to_string(),
        timestamp: Utc::now(),
        checks,
    }
}
