//! Benchmark result records as served by `GET api/get`.

use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Response envelope of the results endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResultsResponse {
    #[serde(default)]
    pub message: String,
    pub payload: Vec<BenchmarkRecord>,
}

/// One measurement row. Nullable numeric columns decode as `None`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BenchmarkRecord {
    pub target: String,
    pub target_displayed_name: String,
    #[serde(default)]
    pub displayed_order: Option<i64>,
    pub is_enable: bool,
    #[serde(rename = "type")]
    pub dataset_type: i64,
    pub metric: i64,
    /// ms
    #[serde(default)]
    pub ingest_time: Option<f64>,
    /// bytes
    #[serde(default)]
    pub compressed_size: Option<f64>,
    /// bytes
    #[serde(default)]
    pub avg_ingest_mem: Option<f64>,
    /// bytes
    #[serde(default)]
    pub avg_query_mem: Option<f64>,
    /// JSON-encoded array of per-query latencies in ms.
    #[serde(default)]
    pub query_times: Option<String>,
}

impl BenchmarkRecord {
    pub fn bucket(&self) -> Result<BucketKey, DecodeError> {
        Ok(BucketKey {
            dataset_type: DatasetType::try_from(self.dataset_type)?,
            run_metric: RunMetric::try_from(self.metric)?,
        })
    }

    /// Decode `query_times`. A missing or blank column is an empty list.
    pub fn query_latencies(&self) -> Result<Vec<f64>, DecodeError> {
        match self.query_times.as_deref().map(str::trim) {
            None | Some("") => Ok(Vec::new()),
            Some(raw) => serde_json::from_str::<Vec<Option<f64>>>(raw)
                .map(|times| times.into_iter().map(|t| t.unwrap_or(f64::NAN)).collect())
                .map_err(|e| DecodeError::QueryTimes(e.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatasetType {
    Unstructured,
    SemiStructured,
}

/// The dataset a dataset type was benchmarked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Workload {
    pub name: &'static str,
    pub size_bytes: u64,
}

impl DatasetType {
    pub const ALL: [DatasetType; 2] = [DatasetType::Unstructured, DatasetType::SemiStructured];

    pub fn label(&self) -> &'static str {
        match self {
            DatasetType::Unstructured => "Unstructured",
            DatasetType::SemiStructured => "Semi-Structured",
        }
    }

    pub fn workload(&self) -> Workload {
        match self {
            DatasetType::Unstructured => Workload {
                name: "Hadoop (258GB)",
                size_bytes: 276_224_164_352,
            },
            DatasetType::SemiStructured => Workload {
                name: "MongoDB (64GB)",
                size_bytes: 69_582_861_765,
            },
        }
    }
}

impl TryFrom<i64> for DatasetType {
    type Error = DecodeError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(DatasetType::Unstructured),
            2 => Ok(DatasetType::SemiStructured),
            other => Err(DecodeError::DatasetType(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunMetric {
    HotRun,
    ColdRun,
}

impl RunMetric {
    pub const ALL: [RunMetric; 2] = [RunMetric::HotRun, RunMetric::ColdRun];

    pub fn label(&self) -> &'static str {
        match self {
            RunMetric::HotRun => "Hot Run",
            RunMetric::ColdRun => "Cold Run",
        }
    }
}

impl TryFrom<i64> for RunMetric {
    type Error = DecodeError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(RunMetric::HotRun),
            2 => Ok(RunMetric::ColdRun),
            other => Err(DecodeError::RunMetric(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BucketKey {
    pub dataset_type: DatasetType,
    pub run_metric: RunMetric,
}

impl BucketKey {
    pub fn new(dataset_type: DatasetType, run_metric: RunMetric) -> Self {
        Self {
            dataset_type,
            run_metric,
        }
    }

    /// All four buckets in display order.
    pub fn all() -> impl Iterator<Item = BucketKey> {
        DatasetType::ALL
            .into_iter()
            .flat_map(|t| RunMetric::ALL.into_iter().map(move |m| BucketKey::new(t, m)))
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.dataset_type.label(), self.run_metric.label())
    }
}
