pub mod usage;

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::core::client::inventory::InventorySource;
use crate::core::client::metrics_source::{InstantSeries, MetricsSource};
use crate::core::client::promql;
use crate::domain::metric::model::{ClusterMetrics, MetricKind, MetricPoint, PromMetrics, ResourceUsage};
use crate::errors::{InventoryError, QueryError};

use self::usage::{observe_usage, UsageScope, FAN_OUT};

/// Live usage views over the metrics backend, without any cost applied.
pub struct MetricService {
    inventory: Arc<dyn InventorySource>,
    metrics: Arc<dyn MetricsSource>,
}

impl MetricService {
    pub fn new(inventory: Arc<dyn InventorySource>, metrics: Arc<dyn MetricsSource>) -> Self {
        Self { inventory, metrics }
    }

    pub async fn resource_usage(&self, namespace: Option<&str>, pod: Option<&str>) -> ResourceUsage {
        let scope = UsageScope::filter(namespace, pod);
        observe_usage(self.metrics.as_ref(), &scope).await.to_resource_usage()
    }

    /// Fails only when nodes or namespaces cannot be listed. Namespaces whose
    /// pods cannot be listed are left out of `total_pods`.
    pub async fn cluster_metrics(&self) -> Result<ClusterMetrics, InventoryError> {
        let nodes = self.inventory.list_nodes().await?;
        let namespaces = self.inventory.list_namespaces().await?;

        let total_nodes = nodes.len();
        let total_namespaces = namespaces.len();

        let inventory = self.inventory.as_ref();
        let total_pods: usize = stream::iter(namespaces)
            .map(|ns| async move {
                match inventory.list_pods(&ns).await {
                    Ok(pods) => pods.len(),
                    Err(err) => {
                        warn!("Skipping namespace '{}' in pod count: {}", ns, err);
                        0
                    }
                }
            })
            .buffered(FAN_OUT)
            .fold(0, |acc, n| async move { acc + n })
            .await;

        let (cpu_utilization, memory_utilization, usage) = tokio::join!(
            self.scalar(promql::CLUSTER_CPU_UTILIZATION),
            self.scalar(promql::CLUSTER_MEMORY_UTILIZATION),
            self.resource_usage(None, None),
        );

        Ok(ClusterMetrics {
            total_nodes,
            total_pods,
            total_namespaces,
            cpu_utilization,
            memory_utilization,
            resource_usage: usage,
            timestamp: Utc::now(),
        })
    }

    /// Raw per-series samples. CPU and memory failures are reported; network
    /// failures leave the network list empty.
    pub async fn prometheus_metrics(
        &self,
        namespace: Option<&str>,
        pod: Option<&str>,
    ) -> Result<PromMetrics, QueryError> {
        let scope = UsageScope::filter(namespace, pod);
        let metrics = self.metrics.as_ref();

        let cpu_expr = scope.series_expr(MetricKind::Cpu);
        let memory_expr = scope.series_expr(MetricKind::Memory);
        let rx_expr = scope.series_expr(MetricKind::NetworkRx);
        let tx_expr = scope.series_expr(MetricKind::NetworkTx);

        let (cpu, memory, rx, tx) = tokio::join!(
            metrics.instant_query(&cpu_expr),
            metrics.instant_query(&memory_expr),
            metrics.instant_query(&rx_expr),
            metrics.instant_query(&tx_expr),
        );

        let mut network_metrics = Vec::new();
        for (expr, result) in [(&rx_expr, rx), (&tx_expr, tx)] {
            match result {
                Ok(series) => network_metrics.extend(series.into_iter().map(to_point)),
                Err(err) => warn!("Network query failed ({}): {}", expr, err),
            }
        }

        Ok(PromMetrics {
            cpu_metrics: cpu?.into_iter().map(to_point).collect(),
            memory_metrics: memory?.into_iter().map(to_point).collect(),
            network_metrics,
            timestamp: Utc::now(),
        })
    }

    /// Readiness probe against both backends.
    pub async fn probe(&self) -> (Result<(), InventoryError>, Result<(), QueryError>) {
        let (inventory, metrics) = tokio::join!(
            self.inventory.list_namespaces(),
            self.metrics.instant_query(promql::PROBE),
        );
        (inventory.map(|_| ()), metrics.map(|_| ()))
    }

    async fn scalar(&self, expr: &str) -> f64 {
        match self.metrics.instant_query(expr).await {
            Ok(series) => series.first().map(|s| s.sample.value).unwrap_or(0.0),
            Err(err) => {
                debug!("Scalar query failed ({}): {}", expr, err);
                0.0
            }
        }
    }
}

fn to_point(series: InstantSeries) -> MetricPoint {
    MetricPoint {
        timestamp: series.sample.timestamp,
        value: series.sample.value,
        labels: series.labels,
    }
}
