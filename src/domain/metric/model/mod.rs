use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Cpu,
    Memory,
    NetworkRx,
    NetworkTx,
}

impl MetricKind {
    pub fn unit(self) -> UsageUnit {
        match self {
            MetricKind::Cpu => UsageUnit::Cores,
            MetricKind::Memory | MetricKind::NetworkRx | MetricKind::NetworkTx => UsageUnit::Bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageUnit {
    Cores,
    Bytes,
}

/// A single observed usage value. CPU is a rate in cores, memory a byte count,
/// network a byte rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageSample {
    pub metric_kind: MetricKind,
    pub value: f64,
    pub unit: UsageUnit,
    pub as_of: DateTime<Utc>,
}

impl UsageSample {
    pub fn new(metric_kind: MetricKind, value: f64, as_of: DateTime<Utc>) -> Self {
        Self {
            metric_kind,
            value,
            unit: metric_kind.unit(),
            as_of,
        }
    }

    /// Stand-in for a signal that could not be observed.
    pub fn zero(metric_kind: MetricKind) -> Self {
        Self::new(metric_kind, 0.0, Utc::now())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceUsage {
    pub cpu_usage: f64,
    pub memory_usage: u64,
    pub network_rx_bytes: f64,
    pub network_tx_bytes: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterMetrics {
    pub total_nodes: usize,
    pub total_pods: usize,
    pub total_namespaces: usize,
    /// Percent of CPU time not spent idle, averaged over nodes.
    pub cpu_utilization: f64,
    /// Percent of node memory not available.
    pub memory_utilization: f64,
    pub resource_usage: ResourceUsage,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromMetrics {
    pub cpu_metrics: Vec<MetricPoint>,
    pub memory_metrics: Vec<MetricPoint>,
    pub network_metrics: Vec<MetricPoint>,
    pub timestamp: DateTime<Utc>,
}
