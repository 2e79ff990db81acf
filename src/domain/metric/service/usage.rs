use tracing::warn;

use crate::core::client::metrics_source::MetricsSource;
use crate::core::client::promql::{self, LabelSelector};
use crate::domain::metric::model::{MetricKind, ResourceUsage, UsageSample};
use crate::errors::QueryError;

/// Upper bound on concurrent per-entity computations within one request.
pub const FAN_OUT: usize = 8;

/// Which slice of the cluster a usage query covers. Unset parts do not filter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageScope<'a> {
    pub namespace: Option<&'a str>,
    pub pod: Option<&'a str>,
    pub node: Option<&'a str>,
}

impl<'a> UsageScope<'a> {
    pub fn pod(namespace: &'a str, pod: &'a str) -> Self {
        Self {
            namespace: Some(namespace),
            pod: Some(pod),
            node: None,
        }
    }

    pub fn node(node: &'a str) -> Self {
        Self {
            node: Some(node),
            ..Default::default()
        }
    }

    pub fn filter(namespace: Option<&'a str>, pod: Option<&'a str>) -> Self {
        Self {
            namespace,
            pod,
            node: None,
        }
    }

    fn selector(&self) -> LabelSelector {
        LabelSelector::new()
            .eq_opt("namespace", self.namespace)
            .eq_opt("pod", self.pod)
            .eq_opt("node", self.node)
    }

    /// Container-level series only; the cgroup roll-up series (`container=""`)
    /// would otherwise be counted twice.
    fn container_selector(&self) -> LabelSelector {
        self.selector().ne("container", "")
    }

    /// Per-series expression, one result per container (or interface).
    pub fn series_expr(&self, kind: MetricKind) -> String {
        match kind {
            MetricKind::Cpu => promql::cpu_rate(&self.container_selector()),
            MetricKind::Memory => promql::memory_usage(&self.container_selector()),
            MetricKind::NetworkRx => promql::network_rx_rate(&self.selector()),
            MetricKind::NetworkTx => promql::network_tx_rate(&self.selector()),
        }
    }

    /// Scope total of one signal.
    pub fn expr(&self, kind: MetricKind) -> String {
        promql::sum(&self.series_expr(kind))
    }
}

/// Usage of every signal for one scope, already degraded to zero where a
/// signal could not be read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedUsage {
    pub cpu: UsageSample,
    pub memory: UsageSample,
    pub network_rx: UsageSample,
    pub network_tx: UsageSample,
}

impl ObservedUsage {
    pub fn memory_bytes(&self) -> u64 {
        self.memory.value as u64
    }

    pub fn to_resource_usage(&self) -> ResourceUsage {
        ResourceUsage {
            cpu_usage: self.cpu.value,
            memory_usage: self.memory_bytes(),
            network_rx_bytes: self.network_rx.value,
            network_tx_bytes: self.network_tx.value,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Reads one signal. An empty result or a non-finite value (`NaN`, `+Inf`)
/// is a zero reading, not an error.
pub async fn read_usage(
    metrics: &dyn MetricsSource,
    kind: MetricKind,
    expr: &str,
) -> Result<UsageSample, QueryError> {
    let series = metrics.instant_query(expr).await?;

    Ok(match series.first() {
        Some(s) if s.sample.value.is_finite() => {
            UsageSample::new(kind, s.sample.value, s.sample.timestamp)
        }
        Some(s) => {
            warn!("Non-finite {:?} usage {} from {}, assuming zero", kind, s.sample.value, expr);
            UsageSample::zero(kind)
        }
        None => UsageSample::zero(kind),
    })
}

/// Resolves a failed read to zero usage so one missing signal never blocks
/// the others.
pub fn resolve_usage(
    kind: MetricKind,
    expr: &str,
    result: Result<UsageSample, QueryError>,
) -> UsageSample {
    match result {
        Ok(sample) => sample,
        Err(err) => {
            warn!("Usage query failed, assuming zero {:?} usage ({}): {}", kind, expr, err);
            UsageSample::zero(kind)
        }
    }
}

/// Reads CPU, memory and network usage for a scope concurrently.
pub async fn observe_usage(metrics: &dyn MetricsSource, scope: &UsageScope<'_>) -> ObservedUsage {
    let cpu_expr = scope.expr(MetricKind::Cpu);
    let memory_expr = scope.expr(MetricKind::Memory);
    let rx_expr = scope.expr(MetricKind::NetworkRx);
    let tx_expr = scope.expr(MetricKind::NetworkTx);

    let (cpu, memory, rx, tx) = tokio::join!(
        read_usage(metrics, MetricKind::Cpu, &cpu_expr),
        read_usage(metrics, MetricKind::Memory, &memory_expr),
        read_usage(metrics, MetricKind::NetworkRx, &rx_expr),
        read_usage(metrics, MetricKind::NetworkTx, &tx_expr),
    );

    ObservedUsage {
        cpu: resolve_usage(MetricKind::Cpu, &cpu_expr, cpu),
        memory: resolve_usage(MetricKind::Memory, &memory_expr, memory),
        network_rx: resolve_usage(MetricKind::NetworkRx, &rx_expr, rx),
        network_tx: resolve_usage(MetricKind::NetworkTx, &tx_expr, tx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::testing::StaticMetrics;

    #[test]
    fn pod_scope_builds_summed_container_queries() {
        let scope = UsageScope::pod("shop", "api-0");
        assert_eq!(
            scope.expr(MetricKind::Cpu),
            r#"sum(rate(container_cpu_usage_seconds_total{namespace="shop",pod="api-0",container!=""}[5m]))"#
        );
        assert_eq!(
            scope.expr(MetricKind::NetworkRx),
            r#"sum(rate(container_network_receive_bytes_total{namespace="shop",pod="api-0"}[5m]))"#
        );
    }

    #[test]
    fn node_scope_filters_by_node() {
        assert_eq!(
            UsageScope::node("worker-1").expr(MetricKind::Memory),
            r#"sum(container_memory_usage_bytes{node="worker-1",container!=""})"#
        );
    }

    #[tokio::test]
    async fn empty_result_reads_as_zero() {
        let metrics = StaticMetrics::default();
        let sample = read_usage(&metrics, MetricKind::Cpu, "sum(x)").await.unwrap();
        assert_eq!(sample.value, 0.0);
        assert_eq!(sample.metric_kind, MetricKind::Cpu);
    }

    #[tokio::test]
    async fn first_series_value_is_used() {
        let metrics = StaticMetrics::default().instant("sum(x)", 2.5);
        let sample = read_usage(&metrics, MetricKind::Memory, "sum(x)").await.unwrap();
        assert_eq!(sample.value, 2.5);
    }

    #[tokio::test]
    async fn non_finite_value_reads_as_zero() {
        let metrics = StaticMetrics::default()
            .instant("sum(nan)", f64::NAN)
            .instant("sum(inf)", f64::INFINITY);

        let nan = read_usage(&metrics, MetricKind::Cpu, "sum(nan)").await.unwrap();
        let inf = read_usage(&metrics, MetricKind::Memory, "sum(inf)").await.unwrap();

        assert_eq!(nan.value, 0.0);
        assert_eq!(inf.value, 0.0);
        assert_eq!(inf.metric_kind, MetricKind::Memory);
    }

    #[test]
    fn failed_read_resolves_to_zero() {
        let sample = resolve_usage(MetricKind::Memory, "sum(x)", Err(QueryError::Status(500)));
        assert_eq!(sample.value, 0.0);
        assert_eq!(sample.metric_kind, MetricKind::Memory);
    }

    #[tokio::test]
    async fn one_failing_signal_does_not_block_the_others() {
        let scope = UsageScope::pod("shop", "api-0");
        let metrics = StaticMetrics::default()
            .instant(&scope.expr(MetricKind::Cpu), 0.5)
            .failing(&scope.expr(MetricKind::Memory))
            .instant(&scope.expr(MetricKind::NetworkTx), 10.0);

        let usage = observe_usage(&metrics, &scope).await;

        assert_eq!(usage.cpu.value, 0.5);
        assert_eq!(usage.memory.value, 0.0);
        assert_eq!(usage.network_rx.value, 0.0);
        assert_eq!(usage.network_tx.value, 10.0);
        assert_eq!(metrics.queried().len(), 4);
    }
}
