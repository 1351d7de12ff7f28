//! Classifies records into (dataset type, run metric) buckets and collects
//! one formatted cell per target for every metric row.
//!
//! A `DashboardState` is built from scratch for each payload; nothing is
//! carried over from a previous fetch.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::error::DecodeError;
use crate::logging::{log_record_dropped, v_num, ProfileScope};
use crate::record::{BenchmarkRecord, BucketKey};
use crate::targets::{TargetInfo, TargetRegistry};
use crate::units::{self, Measurement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RowKind {
    CompressedSize,
    IngestMemory,
    QueryMemory,
    IngestTime,
    IngestSpeed,
    AvgQueryLatency,
    /// Zero-based query index.
    Query(usize),
}

/// Rows present in every bucket, in display order. Query rows follow them.
pub const FIXED_ROWS: [RowKind; 6] = [
    RowKind::CompressedSize,
    RowKind::IngestMemory,
    RowKind::QueryMemory,
    RowKind::IngestTime,
    RowKind::IngestSpeed,
    RowKind::AvgQueryLatency,
];

impl RowKind {
    pub fn label(&self) -> String {
        match self {
            RowKind::CompressedSize => "Compressed size:".to_string(),
            RowKind::IngestMemory => "Mem usage (ingest):".to_string(),
            RowKind::QueryMemory => "Mem usage (query):".to_string(),
            RowKind::IngestTime => "Ingest time:".to_string(),
            RowKind::IngestSpeed => "Ingest speed:".to_string(),
            RowKind::AvgQueryLatency => "Avg query latency:".to_string(),
            RowKind::Query(i) => format!("Q{}:", i + 1),
        }
    }

    /// Position in the bucket's row list.
    fn slot(&self) -> usize {
        match self {
            RowKind::Query(i) => FIXED_ROWS.len() + i,
            fixed => FIXED_ROWS.iter().position(|k| k == fixed).unwrap_or(0),
        }
    }
}

/// One named measurement category: target id → cell.
#[derive(Debug, Clone)]
pub struct MetricRow {
    pub kind: RowKind,
    pub label: String,
    cells: HashMap<String, Measurement>,
}

impl MetricRow {
    fn new(kind: RowKind) -> Self {
        Self {
            kind,
            label: kind.label(),
            cells: HashMap::new(),
        }
    }

    pub fn get(&self, target: &str) -> Option<&Measurement> {
        self.cells.get(target)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn set(&mut self, target: &str, value: Measurement) {
        self.cells.insert(target.to_string(), value);
    }
}

/// Why a record contributed nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    Disabled,
    Decode(DecodeError),
    NoQueries,
    QueryCountMismatch { expected: usize, actual: usize },
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::Disabled => "disabled",
            DropReason::Decode(e) => e.reason(),
            DropReason::NoQueries => "no_queries",
            DropReason::QueryCountMismatch { .. } => "query_count_mismatch",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::Disabled => write!(f, "record is disabled"),
            DropReason::Decode(e) => write!(f, "{}", e),
            DropReason::NoQueries => write!(f, "record has no query latencies"),
            DropReason::QueryCountMismatch { expected, actual } => write!(
                f,
                "bucket expects {} queries, record has {}",
                expected, actual
            ),
        }
    }
}

/// Accumulated rows and targets for one bucket.
#[derive(Debug, Clone)]
pub struct BucketState {
    pub key: BucketKey,
    query_count: usize,
    rows: Vec<MetricRow>,
    pub targets: TargetRegistry,
}

impl BucketState {
    pub fn new(key: BucketKey) -> Self {
        Self {
            key,
            query_count: 0,
            rows: FIXED_ROWS.iter().map(|&k| MetricRow::new(k)).collect(),
            targets: TargetRegistry::new(),
        }
    }

    /// Number of per-query rows; 0 until a record has been accepted.
    pub fn query_count(&self) -> usize {
        self.query_count
    }

    /// Fixed rows followed by Q1..QN.
    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    pub fn row(&self, kind: RowKind) -> Option<&MetricRow> {
        self.rows.get(kind.slot()).filter(|r| r.kind == kind)
    }

    fn set(&mut self, kind: RowKind, target: &str, value: Measurement) {
        if let Some(row) = self.rows.get_mut(kind.slot()) {
            row.set(target, value);
        }
    }

    fn accept(&mut self, rec: &BenchmarkRecord, latencies: &[f64]) -> Result<(), DropReason> {
        if latencies.is_empty() {
            return Err(DropReason::NoQueries);
        }
        if self.query_count == 0 {
            self.query_count = latencies.len();
            self.rows
                .extend((0..latencies.len()).map(|i| MetricRow::new(RowKind::Query(i))));
        } else if latencies.len() != self.query_count {
            return Err(DropReason::QueryCountMismatch {
                expected: self.query_count,
                actual: latencies.len(),
            });
        }

        let target = rec.target.as_str();
        let avg = latencies.iter().sum::<f64>() / latencies.len() as f64;
        self.set(RowKind::AvgQueryLatency, target, units::duration(avg));
        for (i, latency) in latencies.iter().enumerate() {
            self.set(RowKind::Query(i), target, units::duration(*latency));
        }

        let ingest_time = rec.ingest_time.unwrap_or(0.0);
        let workload = self.key.dataset_type.workload();
        self.set(RowKind::IngestTime, target, units::duration(ingest_time));
        self.set(
            RowKind::IngestSpeed,
            target,
            units::speed(workload.size_bytes as f64, ingest_time),
        );
        self.set(
            RowKind::CompressedSize,
            target,
            units::size(rec.compressed_size.unwrap_or(0.0)),
        );
        self.set(
            RowKind::IngestMemory,
            target,
            units::size(rec.avg_ingest_mem.unwrap_or(0.0)),
        );
        self.set(
            RowKind::QueryMemory,
            target,
            units::size(rec.avg_query_mem.unwrap_or(0.0)),
        );

        self.targets.upsert(
            target,
            TargetInfo {
                display_name: rec.target_displayed_name.clone(),
                display_order: rec.displayed_order,
            },
        );
        Ok(())
    }
}

/// Everything derived from one payload.
#[derive(Debug, Clone)]
pub struct DashboardState {
    buckets: BTreeMap<BucketKey, BucketState>,
    pub accepted: usize,
    /// Drop counts keyed by `DropReason::as_str`.
    pub dropped: BTreeMap<&'static str, usize>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            buckets: BucketKey::all().map(|k| (k, BucketState::new(k))).collect(),
            accepted: 0,
            dropped: BTreeMap::new(),
        }
    }
}

impl DashboardState {
    pub fn build(records: &[BenchmarkRecord]) -> Self {
        let _scope = ProfileScope::with_context("group", &[("records", v_num(records.len() as f64))]);
        let mut state = Self::default();
        for rec in records {
            match state.ingest(rec) {
                Ok(_) => state.accepted += 1,
                Err(reason) => {
                    *state.dropped.entry(reason.as_str()).or_insert(0) += 1;
                    log_record_dropped(&rec.target, reason.as_str(), &reason.to_string());
                }
            }
        }
        state
    }

    /// Route one record into its bucket.
    pub fn ingest(&mut self, rec: &BenchmarkRecord) -> Result<BucketKey, DropReason> {
        if !rec.is_enable {
            return Err(DropReason::Disabled);
        }
        let key = rec.bucket().map_err(DropReason::Decode)?;
        let latencies = rec.query_latencies().map_err(DropReason::Decode)?;
        self.buckets
            .entry(key)
            .or_insert_with(|| BucketState::new(key))
            .accept(rec, &latencies)?;
        Ok(key)
    }

    pub fn bucket(&self, key: BucketKey) -> Option<&BucketState> {
        self.buckets.get(&key)
    }

    pub fn buckets(&self) -> impl Iterator<Item = &BucketState> {
        self.buckets.values()
    }

    pub fn total_dropped(&self) -> usize {
        self.dropped.values().sum()
    }
}
