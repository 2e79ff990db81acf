//! Cost records produced by the engine. All of them are rebuilt per request.

mod rate_model;

pub use rate_model::RateModel;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Per-dimension cost figures. `total_cost` is always derived from the four
/// dimensions, never set on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub cpu_cost: f64,
    pub memory_cost: f64,
    pub storage_cost: f64,
    pub network_cost: f64,
    pub total_cost: f64,
}

impl CostBreakdown {
    pub fn new(cpu_cost: f64, memory_cost: f64, storage_cost: f64, network_cost: f64) -> Self {
        Self {
            cpu_cost,
            memory_cost,
            storage_cost,
            network_cost,
            total_cost: cpu_cost + memory_cost + storage_cost + network_cost,
        }
    }

    /// Sums each dimension independently, then derives the total from the
    /// dimension sums rather than from a running grand total.
    pub fn sum<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a CostBreakdown>,
    {
        let (cpu, memory, storage, network) = parts.into_iter().fold(
            (0.0, 0.0, 0.0, 0.0),
            |(cpu, memory, storage, network), c| {
                (
                    cpu + c.cpu_cost,
                    memory + c.memory_cost,
                    storage + c.storage_cost,
                    network + c.network_cost,
                )
            },
        );

        Self::new(cpu, memory, storage, network)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodCost {
    pub name: String,
    pub namespace: String,
    #[serde(flatten)]
    pub cost: CostBreakdown,
    /// Observed CPU in cores.
    pub cpu_usage: f64,
    /// Observed memory in bytes.
    pub memory_usage: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeCost {
    pub name: String,
    #[serde(flatten)]
    pub cost: CostBreakdown,
    pub cpu_usage: f64,
    pub memory_usage: u64,
    pub timestamp: DateTime<Utc>,
}

/// Roll-up of the pods in one namespace.
///
/// `pod_count` is the number of pods the inventory listed, while `pods` only
/// holds the pods whose cost could be computed. The two can differ; a gap
/// means some pods in the namespace have no cost estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamespaceCost {
    pub namespace: String,
    #[serde(flatten)]
    pub cost: CostBreakdown,
    pub pod_count: usize,
    pub pods: Vec<PodCost>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostOverview {
    pub total_cost: CostBreakdown,
    pub namespace_costs: Vec<NamespaceCost>,
    pub timestamp: DateTime<Utc>,
}

/// One reconciled bucket of the cost history. Costs are hourly rates at the
/// usage observed for that timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostHistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub cpu_cost: f64,
    pub memory_cost: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostHistory {
    pub period: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub data: Vec<CostHistoryPoint>,
}
