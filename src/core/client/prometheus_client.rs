use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::client::metrics_source::{InstantSeries, MetricsSource, RangeSeries};
use crate::core::client::prometheus_dto::{PromMatrixSeries, PromResponse, PromVectorSample};
use crate::errors::QueryError;

/// Thin client over the Prometheus HTTP query API. No retries; the request
/// timeout is the only bound on a call.
#[derive(Clone)]
pub struct PrometheusClient {
    base_url: String,
    client: Client,
}

impl PrometheusClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, QueryError> {
        let url = format!("{}{}", self.base_url, path);

        let resp = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(QueryError::Status(status.as_u16()));
        }

        let body: PromResponse<T> = resp
            .json()
            .await
            .map_err(|e| QueryError::Decode(e.to_string()))?;

        if body.status != "success" {
            return Err(QueryError::Backend(format!(
                "{}: {}",
                body.error_type.unwrap_or_else(|| body.status.clone()),
                body.error.unwrap_or_default()
            )));
        }

        Ok(body.data.map(|d| d.result).unwrap_or_default())
    }
}

#[async_trait]
impl MetricsSource for PrometheusClient {
    async fn instant_query(&self, expr: &str) -> Result<Vec<InstantSeries>, QueryError> {
        debug!("Prometheus query: {}", expr);
        let result: Vec<PromVectorSample> = self
            .get("/api/v1/query", &[("query", expr.to_string())])
            .await?;

        Ok(result.into_iter().filter_map(PromVectorSample::into_series).collect())
    }

    async fn range_query(
        &self,
        expr: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> Result<Vec<RangeSeries>, QueryError> {
        debug!("Prometheus range query: {} [{} .. {}, step {:?}]", expr, start, end, step);
        let params = [
            ("query", expr.to_string()),
            ("start", start.timestamp().to_string()),
            ("end", end.timestamp().to_string()),
            ("step", format!("{}s", step.as_secs().max(1))),
        ];
        let result: Vec<PromMatrixSeries> = self.get("/api/v1/query_range", &params).await?;

        Ok(result.into_iter().map(PromMatrixSeries::into_series).collect())
    }
}
