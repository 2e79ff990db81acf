use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use crate::core::client::metrics_source::{MetricsSource, RangeSeries};
use crate::core::util::cost_util::CostUtil;
use crate::domain::cost::model::{CostHistory, CostHistoryPoint, RateModel};
use crate::domain::metric::model::{MetricKind, UsageSample};
use crate::domain::metric::service::usage::UsageScope;
use crate::errors::CostError;

pub const MAX_HISTORY_HOURS: i64 = 24 * 30;

/// Prometheus refuses range queries resolving to more points per series.
pub const MAX_HISTORY_POINTS: u64 = 11_000;

/// Looking-back window of a history request.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryWindow {
    pub hours: i64,
    pub step: Duration,
    pub namespace: Option<String>,
}

impl HistoryWindow {
    pub fn new(hours: i64, step: Duration, namespace: Option<String>) -> Result<Self, CostError> {
        if !(1..=MAX_HISTORY_HOURS).contains(&hours) {
            return Err(CostError::InvalidScope(format!(
                "hours must be between 1 and {}, got {}",
                MAX_HISTORY_HOURS, hours
            )));
        }
        if step < Duration::from_secs(1) {
            return Err(CostError::InvalidScope(format!(
                "step must be at least 1s, got {:?}",
                step
            )));
        }
        let points = hours as u64 * 3600 / step.as_secs();
        if points > MAX_HISTORY_POINTS {
            return Err(CostError::InvalidScope(format!(
                "{}h at a {:?} step is {} points, at most {} allowed",
                hours, step, points, MAX_HISTORY_POINTS
            )));
        }

        Ok(Self {
            hours,
            step,
            namespace: namespace.filter(|ns| !ns.is_empty()),
        })
    }

    pub fn period(&self) -> String {
        format!("{}h", self.hours)
    }
}

/// Per-timestamp partial costs, keyed by Unix seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HistoryBucket {
    pub cpu_cost: f64,
    pub memory_cost: f64,
}

/// Folds every sample of every series into its second-truncated bucket.
/// Samples of several series landing on the same second are added up.
pub fn accumulate(
    buckets: &mut HashMap<i64, HistoryBucket>,
    series: &[RangeSeries],
    kind: MetricKind,
    rates: &RateModel,
) {
    for s in series {
        for sample in &s.samples {
            let usage = UsageSample::new(kind, sample.value, sample.timestamp);
            let cost = CostUtil::cost_of(&usage, rates);
            let bucket = buckets.entry(sample.timestamp.timestamp()).or_default();

            match kind {
                MetricKind::Cpu => bucket.cpu_cost += cost,
                MetricKind::Memory => bucket.memory_cost += cost,
                MetricKind::NetworkRx | MetricKind::NetworkTx => {}
            }
        }
    }
}

/// Emits one point per bucket in ascending time order.
pub fn finalize(buckets: HashMap<i64, HistoryBucket>) -> Vec<CostHistoryPoint> {
    let mut points: Vec<CostHistoryPoint> = buckets
        .into_iter()
        .filter_map(|(seconds, bucket)| {
            let timestamp = DateTime::<Utc>::from_timestamp(seconds, 0)?;
            Some(CostHistoryPoint {
                timestamp,
                cpu_cost: bucket.cpu_cost,
                memory_cost: bucket.memory_cost,
                total_cost: bucket.cpu_cost + bucket.memory_cost,
            })
        })
        .collect();

    points.sort_by_key(|p| p.timestamp);
    points
}

/// Merges CPU and memory series into one chronological cost history. A
/// timestamp seen in only one input keeps zero for the other dimension.
pub fn reconcile(
    cpu_series: &[RangeSeries],
    memory_series: &[RangeSeries],
    rates: &RateModel,
) -> Vec<CostHistoryPoint> {
    let mut buckets = HashMap::new();
    accumulate(&mut buckets, cpu_series, MetricKind::Cpu, rates);
    accumulate(&mut buckets, memory_series, MetricKind::Memory, rates);
    finalize(buckets)
}

pub struct CostHistoryReader {
    metrics: Arc<dyn MetricsSource>,
    rates: Arc<RateModel>,
}

impl CostHistoryReader {
    pub fn new(metrics: Arc<dyn MetricsSource>, rates: Arc<RateModel>) -> Self {
        Self { metrics, rates }
    }

    pub async fn cost_history(&self, window: &HistoryWindow) -> CostHistory {
        let end_time = Utc::now();
        let start_time = end_time - TimeDelta::hours(window.hours);

        let scope = UsageScope::filter(window.namespace.as_deref(), None);
        let cpu_expr = scope.series_expr(MetricKind::Cpu);
        let memory_expr = scope.series_expr(MetricKind::Memory);

        let (cpu, memory) = tokio::join!(
            self.range(&cpu_expr, start_time, end_time, window.step),
            self.range(&memory_expr, start_time, end_time, window.step),
        );

        let data = reconcile(&cpu, &memory, &self.rates);
        debug!("Cost history over {} has {} points", window.period(), data.len());

        CostHistory {
            period: window.period(),
            start_time,
            end_time,
            data,
        }
    }

    /// A failed range query contributes no samples.
    async fn range(
        &self,
        expr: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> Vec<RangeSeries> {
        match self.metrics.range_query(expr, start, end, step).await {
            Ok(series) => series,
            Err(err) => {
                warn!("History query failed, treating as empty ({}): {}", expr, err);
                Vec::new()
            }
        }
    }
}
