//! In-memory collaborators for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::client::inventory::InventorySource;
use crate::core::client::metrics_source::{
    InstantSeries, Labels, MetricsSource, RangeSeries, Sample,
};
use crate::errors::{InventoryError, QueryError};

/// Inventory with fixed listings. `None` entries fail as unavailable.
#[derive(Default)]
pub struct StaticInventory {
    pub namespaces: Option<Vec<String>>,
    pub pods: HashMap<String, Option<Vec<String>>>,
    pub nodes: Option<Vec<String>>,
}

impl StaticInventory {
    pub fn with_namespaces(names: &[&str]) -> Self {
        Self {
            namespaces: Some(names.iter().map(|s| s.to_string()).collect()),
            nodes: Some(Vec::new()),
            ..Default::default()
        }
    }

    pub fn pods(mut self, namespace: &str, pods: &[&str]) -> Self {
        self.pods.insert(
            namespace.to_string(),
            Some(pods.iter().map(|s| s.to_string()).collect()),
        );
        self
    }

    pub fn failing_pods(mut self, namespace: &str) -> Self {
        self.pods.insert(namespace.to_string(), None);
        self
    }

    pub fn nodes(mut self, nodes: &[&str]) -> Self {
        self.nodes = Some(nodes.iter().map(|s| s.to_string()).collect());
        self
    }
}

fn listing(what: &str, entry: Option<&Vec<String>>) -> Result<Vec<String>, InventoryError> {
    entry
        .cloned()
        .ok_or_else(|| InventoryError::Unavailable(format!("{} unavailable", what)))
}

#[async_trait]
impl InventorySource for StaticInventory {
    async fn list_namespaces(&self) -> Result<Vec<String>, InventoryError> {
        listing("namespaces", self.namespaces.as_ref())
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<String>, InventoryError> {
        match self.pods.get(namespace) {
            Some(entry) => listing(namespace, entry.as_ref()),
            None => Ok(Vec::new()),
        }
    }

    async fn list_nodes(&self) -> Result<Vec<String>, InventoryError> {
        listing("nodes", self.nodes.as_ref())
    }
}

/// Metrics keyed by exact expression. Unknown expressions return no series.
/// Delayed expressions answer only after their delay has elapsed.
#[derive(Default)]
pub struct StaticMetrics {
    pub instant: HashMap<String, Vec<InstantSeries>>,
    pub range: HashMap<String, Vec<RangeSeries>>,
    pub failing: HashSet<String>,
    pub delays: HashMap<String, Duration>,
    pub seen: Mutex<Vec<String>>,
}

pub fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap()
}

impl StaticMetrics {
    pub fn instant(mut self, expr: &str, value: f64) -> Self {
        self.instant.entry(expr.to_string()).or_default().push(InstantSeries {
            labels: Labels::new(),
            sample: Sample {
                timestamp: at(1_700_000_000),
                value,
            },
        });
        self
    }

    pub fn range(mut self, expr: &str, points: &[(i64, f64)]) -> Self {
        self.range.entry(expr.to_string()).or_default().push(RangeSeries {
            labels: Labels::new(),
            samples: points
                .iter()
                .map(|&(seconds, value)| Sample {
                    timestamp: at(seconds),
                    value,
                })
                .collect(),
        });
        self
    }

    pub fn failing(mut self, expr: &str) -> Self {
        self.failing.insert(expr.to_string());
        self
    }

    pub fn delayed(mut self, expr: &str, delay: Duration) -> Self {
        self.delays.insert(expr.to_string(), delay);
        self
    }

    pub fn queried(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    async fn check(&self, expr: &str) -> Result<(), QueryError> {
        self.seen.lock().unwrap().push(expr.to_string());
        if let Some(delay) = self.delays.get(expr) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(expr) {
            return Err(QueryError::Status(503));
        }
        Ok(())
    }
}

#[async_trait]
impl MetricsSource for StaticMetrics {
    async fn instant_query(&self, expr: &str) -> Result<Vec<InstantSeries>, QueryError> {
        self.check(expr).await?;
        Ok(self.instant.get(expr).cloned().unwrap_or_default())
    }

    async fn range_query(
        &self,
        expr: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _step: Duration,
    ) -> Result<Vec<RangeSeries>, QueryError> {
        self.check(expr).await?;
        Ok(self.range.get(expr).cloned().unwrap_or_default())
    }
}
