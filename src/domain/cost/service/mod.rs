pub mod aggregation;
pub mod entity_cost;
pub mod history;

use std::sync::Arc;

use crate::core::client::inventory::InventorySource;
use crate::core::client::metrics_source::MetricsSource;
use crate::domain::cost::model::{CostHistory, CostOverview, NamespaceCost, NodeCost, PodCost, RateModel};
use crate::errors::CostError;

use self::aggregation::CostAggregator;
use self::entity_cost::EntityCostCalculator;
use self::history::{CostHistoryReader, HistoryWindow};

/// Entry point for every cost view served over HTTP.
pub struct CostService {
    aggregator: CostAggregator,
    history: CostHistoryReader,
}

impl CostService {
    pub fn new(
        inventory: Arc<dyn InventorySource>,
        metrics: Arc<dyn MetricsSource>,
        rates: RateModel,
    ) -> Self {
        let rates = Arc::new(rates);
        let calculator = Arc::new(EntityCostCalculator::new(metrics.clone(), rates.clone()));

        Self {
            aggregator: CostAggregator::new(inventory, calculator),
            history: CostHistoryReader::new(metrics, rates),
        }
    }

    pub async fn overview(&self) -> Result<CostOverview, CostError> {
        self.aggregator.aggregate_cluster().await
    }

    pub async fn namespace_costs(&self) -> Result<Vec<NamespaceCost>, CostError> {
        self.aggregator.namespace_costs().await
    }

    pub async fn pod_costs(&self, namespace: &str) -> Result<Vec<PodCost>, CostError> {
        self.aggregator.pod_costs(namespace).await
    }

    pub async fn node_costs(&self) -> Result<Vec<NodeCost>, CostError> {
        self.aggregator.node_costs().await
    }

    pub async fn cost_history(&self, window: &HistoryWindow) -> CostHistory {
        self.history.cost_history(window).await
    }
}
