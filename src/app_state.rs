use std::sync::Arc;

use crate::core::client::inventory::InventorySource;
use crate::core::client::metrics_source::MetricsSource;
use crate::domain::cost::model::RateModel;
use crate::domain::cost::service::CostService;
use crate::domain::metric::service::MetricService;

#[derive(Clone)]
pub struct AppState {
    pub cost_service: Arc<CostService>,
    pub metric_service: Arc<MetricService>,
}

pub fn build_app_state(
    inventory: Arc<dyn InventorySource>,
    metrics: Arc<dyn MetricsSource>,
    rates: RateModel,
) -> AppState {
    AppState {
        cost_service: Arc::new(CostService::new(inventory.clone(), metrics.clone(), rates)),
        metric_service: Arc::new(MetricService::new(inventory, metrics)),
    }
}
