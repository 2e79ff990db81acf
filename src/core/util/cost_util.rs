use crate::domain::cost::model::RateModel;
use crate::domain::metric::model::{MetricKind, UsageSample};

pub const BYTES_PER_GB: f64 = 1_073_741_824.0;

/// Flat multiplier applied to network bytes; not part of the rate model.
pub const NETWORK_COST_PER_BYTE: f64 = 0.000_001;

/// Placeholder storage charge per pod, independent of actual volume usage.
pub const STORAGE_COST_PER_POD: f64 = 0.01;

pub struct CostUtil;

impl CostUtil {
    #[inline]
    pub fn bytes_to_gb(bytes: f64) -> f64 {
        bytes / BYTES_PER_GB
    }

    /// Cost per hour at the observed CPU rate. The rate comes from a 5m
    /// `rate()` query; no elapsed-time integration happens here.
    #[inline]
    pub fn compute_cpu_cost(cores: f64, prices: &RateModel) -> f64 {
        cores * prices.cpu_cost_per_core_hour
    }

    #[inline]
    pub fn compute_memory_cost(bytes: f64, prices: &RateModel) -> f64 {
        Self::bytes_to_gb(bytes) * prices.memory_cost_per_gb
    }

    /// Cost contribution of one usage sample. Non-finite values count as zero.
    pub fn cost_of(usage: &UsageSample, prices: &RateModel) -> f64 {
        let value = if usage.value.is_finite() { usage.value } else { 0.0 };

        match usage.metric_kind {
            MetricKind::Cpu => Self::compute_cpu_cost(value, prices),
            MetricKind::Memory => Self::compute_memory_cost(value, prices),
            MetricKind::NetworkRx | MetricKind::NetworkTx => value * NETWORK_COST_PER_BYTE,
        }
    }
}
