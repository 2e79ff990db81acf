//! Cost API DTOs

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::cost::model::{NamespaceCost, NodeCost, PodCost};
use crate::domain::cost::service::history::HistoryWindow;
use crate::errors::AppError;

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_HISTORY_HOURS: i64 = 24;
pub const DEFAULT_HISTORY_STEP: Duration = Duration::from_secs(3600);

#[derive(Deserialize, Debug, Default, Validate)]
pub struct PodCostQuery {
    #[validate(length(min = 1, max = 63))]
    pub namespace: Option<String>,
}

impl PodCostQuery {
    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }
}

/// `hours` and `step` stay strings so malformed values surface as a JSON 400
/// rather than a plain-text extractor rejection.
#[derive(Deserialize, Debug, Default, Validate)]
pub struct CostHistoryQuery {
    pub hours: Option<String>,
    /// Any humantime duration, e.g. `30m`, `1h`.
    pub step: Option<String>,
    #[validate(length(max = 63))]
    pub namespace: Option<String>,
}

impl CostHistoryQuery {
    pub fn into_window(self) -> Result<HistoryWindow, AppError> {
        let hours = match self.hours.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_HISTORY_HOURS,
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::InvalidQuery(format!("invalid hours parameter: {:?}", raw)))?,
        };

        let step = match self.step.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_HISTORY_STEP,
            Some(raw) => humantime::parse_duration(raw).map_err(|e| {
                AppError::InvalidQuery(format!("invalid step parameter {:?}: {}", raw, e))
            })?,
        };

        Ok(HistoryWindow::new(hours, step, self.namespace)?)
    }
}

#[derive(Serialize, Debug)]
pub struct NamespaceCostsResponse {
    pub namespace_costs: Vec<NamespaceCost>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

impl From<Vec<NamespaceCost>> for NamespaceCostsResponse {
    fn from(namespace_costs: Vec<NamespaceCost>) -> Self {
        Self {
            count: namespace_costs.len(),
            namespace_costs,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct PodCostsResponse {
    pub namespace: String,
    pub pod_costs: Vec<PodCost>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

impl PodCostsResponse {
    pub fn new(namespace: &str, pod_costs: Vec<PodCost>) -> Self {
        Self {
            namespace: namespace.to_string(),
            count: pod_costs.len(),
            pod_costs,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct NodeCostsResponse {
    pub node_costs: Vec<NodeCost>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

impl From<Vec<NodeCost>> for NodeCostsResponse {
    fn from(node_costs: Vec<NodeCost>) -> Self {
        Self {
            count: node_costs.len(),
            node_costs,
            timestamp: Utc::now(),
        }
    }
}
