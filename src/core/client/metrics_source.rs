use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::QueryError;

pub type Labels = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// One labelled series of an instant query.
#[derive(Debug, Clone, PartialEq)]
pub struct InstantSeries {
    pub labels: Labels,
    pub sample: Sample,
}

/// One labelled series of a range query, samples in backend order.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSeries {
    pub labels: Labels,
    pub samples: Vec<Sample>,
}

/// Time-series backend answering PromQL-style expressions.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn instant_query(&self, expr: &str) -> Result<Vec<InstantSeries>, QueryError>;

    async fn range_query(
        &self,
        expr: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> Result<Vec<RangeSeries>, QueryError>;
}
