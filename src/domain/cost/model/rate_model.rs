use serde::Serialize;

/// Billing rates applied to observed usage. Built once from configuration
/// and shared read-only by every calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateModel {
    pub cpu_cost_per_core_hour: f64,
    pub memory_cost_per_gb: f64,
    pub storage_cost_per_gb: f64,
}
