use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::core::client::metrics_source::MetricsSource;
use crate::core::util::cost_util::{CostUtil, STORAGE_COST_PER_POD};
use crate::domain::cost::model::{CostBreakdown, NodeCost, PodCost, RateModel};
use crate::domain::metric::service::usage::{observe_usage, ObservedUsage, UsageScope};
use crate::errors::CostError;

/// Prices one pod or node from its current usage. Nothing is cached; every
/// call queries the backend again.
pub struct EntityCostCalculator {
    metrics: Arc<dyn MetricsSource>,
    rates: Arc<RateModel>,
}

impl EntityCostCalculator {
    pub fn new(metrics: Arc<dyn MetricsSource>, rates: Arc<RateModel>) -> Self {
        Self { metrics, rates }
    }

    pub async fn compute_pod_cost(&self, namespace: &str, name: &str) -> Result<PodCost, CostError> {
        if namespace.is_empty() || name.is_empty() {
            return Err(CostError::InvalidScope(format!(
                "pod '{}' in namespace '{}'",
                name, namespace
            )));
        }

        let usage = observe_usage(self.metrics.as_ref(), &UsageScope::pod(namespace, name)).await;
        let cost = self.price(&usage, STORAGE_COST_PER_POD);
        debug!("Pod {}/{} costs {:.6}/h", namespace, name, cost.total_cost);

        Ok(PodCost {
            name: name.to_string(),
            namespace: namespace.to_string(),
            cost,
            cpu_usage: usage.cpu.value,
            memory_usage: usage.memory_bytes(),
            timestamp: Utc::now(),
        })
    }

    /// Nodes carry no storage placeholder.
    pub async fn compute_node_cost(&self, name: &str) -> Result<NodeCost, CostError> {
        if name.is_empty() {
            return Err(CostError::InvalidScope("node with empty name".to_string()));
        }

        let usage = observe_usage(self.metrics.as_ref(), &UsageScope::node(name)).await;
        let cost = self.price(&usage, 0.0);
        debug!("Node {} costs {:.6}/h", name, cost.total_cost);

        Ok(NodeCost {
            name: name.to_string(),
            cost,
            cpu_usage: usage.cpu.value,
            memory_usage: usage.memory_bytes(),
            timestamp: Utc::now(),
        })
    }

    fn price(&self, usage: &ObservedUsage, storage_cost: f64) -> CostBreakdown {
        let rates = self.rates.as_ref();
        CostBreakdown::new(
            CostUtil::cost_of(&usage.cpu, rates),
            CostUtil::cost_of(&usage.memory, rates),
            storage_cost,
            CostUtil::cost_of(&usage.network_rx, rates) + CostUtil::cost_of(&usage.network_tx, rates),
        )
    }
}
