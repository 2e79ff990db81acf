//! Wire format of the Prometheus HTTP API (`/api/v1/query`, `/api/v1/query_range`).

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

use crate::core::client::metrics_source::{InstantSeries, Labels, RangeSeries, Sample};

#[derive(Debug, Deserialize)]
pub struct PromResponse<T> {
    pub status: String,
    pub data: Option<PromData<T>>,
    #[serde(rename = "errorType")]
    pub error_type: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromData<T> {
    pub result_type: String,
    pub result: Vec<T>,
}

/// Sample pairs arrive as `[<unix seconds>, "<value>"]`.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct PromVectorSample {
    #[serde(default)]
    pub metric: Labels,
    #[serde_as(as = "(_, DisplayFromStr)")]
    pub value: (f64, f64),
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub struct PromMatrixSeries {
    #[serde(default)]
    pub metric: Labels,
    #[serde_as(as = "Vec<(_, DisplayFromStr)>")]
    pub values: Vec<(f64, f64)>,
}

fn to_sample((seconds, value): (f64, f64)) -> Option<Sample> {
    let millis = (seconds * 1000.0).round() as i64;
    DateTime::<Utc>::from_timestamp_millis(millis).map(|timestamp| Sample { timestamp, value })
}

impl PromVectorSample {
    pub fn into_series(self) -> Option<InstantSeries> {
        let sample = to_sample(self.value)?;
        Some(InstantSeries {
            labels: self.metric,
            sample,
        })
    }
}

impl PromMatrixSeries {
    pub fn into_series(self) -> RangeSeries {
        RangeSeries {
            labels: self.metric,
            samples: self.values.into_iter().filter_map(to_sample).collect(),
        }
    }
}
