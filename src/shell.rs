//! Selection and view state shared by the terminal and HTML surfaces.
//!
//! All four bucket tables are pivoted once when a payload arrives; switching
//! dataset type or run metric only changes which one is visible.

use std::collections::BTreeMap;

use crate::grouper::DashboardState;
use crate::pivot::{ChartBar, PivotTable};
use crate::record::{BenchmarkRecord, BucketKey, DatasetType, RunMetric, Workload};

pub const LOADING: &str = "Loading";
pub const NETWORK_ERROR: &str = "Network error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub dataset_type: DatasetType,
    pub run_metric: RunMetric,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            dataset_type: DatasetType::Unstructured,
            run_metric: RunMetric::HotRun,
        }
    }
}

impl Selection {
    pub fn key(&self) -> BucketKey {
        BucketKey::new(self.dataset_type, self.run_metric)
    }
}

#[derive(Debug)]
pub enum ViewState {
    Loading,
    NetworkError(String),
    Ready {
        state: DashboardState,
        tables: BTreeMap<BucketKey, PivotTable>,
    },
}

#[derive(Debug)]
pub struct Dashboard {
    selection: Selection,
    view: ViewState,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(Selection::default())
    }
}

impl Dashboard {
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            view: ViewState::Loading,
        }
    }

    /// Replace everything with the outcome of a fetch.
    pub fn load(&mut self, outcome: anyhow::Result<Vec<BenchmarkRecord>>) {
        self.view = match outcome {
            Ok(records) => {
                let state = DashboardState::build(&records);
                let tables = state
                    .buckets()
                    .map(|b| (b.key, PivotTable::build(b)))
                    .collect();
                ViewState::Ready { state, tables }
            }
            Err(e) => ViewState::NetworkError(format!("{:#}", e)),
        };
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn select_type(&mut self, dataset_type: DatasetType) {
        self.selection.dataset_type = dataset_type;
    }

    pub fn select_metric(&mut self, run_metric: RunMetric) {
        self.selection.run_metric = run_metric;
    }

    /// Placeholder shown instead of rows.
    pub fn overlay_text(&self) -> &'static str {
        match self.view {
            ViewState::Loading => LOADING,
            ViewState::NetworkError(_) => NETWORK_ERROR,
            ViewState::Ready { .. } => "",
        }
    }

    pub fn workload(&self) -> Workload {
        self.selection.dataset_type.workload()
    }

    pub fn state(&self) -> Option<&DashboardState> {
        match &self.view {
            ViewState::Ready { state, .. } => Some(state),
            _ => None,
        }
    }

    pub fn table(&self, key: BucketKey) -> Option<&PivotTable> {
        match &self.view {
            ViewState::Ready { tables, .. } => tables.get(&key),
            _ => None,
        }
    }

    /// The table for the current selection.
    pub fn visible(&self) -> Option<&PivotTable> {
        self.table(self.selection.key())
    }

    pub fn tables(&self) -> Vec<&PivotTable> {
        match &self.view {
            ViewState::Ready { tables, .. } => tables.values().collect(),
            _ => Vec::new(),
        }
    }

    /// Title and bars for the drill-down chart of a visible row.
    pub fn chart(&self, row_id: usize) -> Option<(String, Vec<ChartBar>)> {
        let table = self.visible()?;
        let row = table.row(row_id)?;
        Some((row.label.clone(), row.chart_series(&table.columns)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn rec(ty: i64, metric: i64, target: &str) -> BenchmarkRecord {
        BenchmarkRecord {
            target: target.to_string(),
            target_displayed_name: target.to_string(),
            displayed_order: Some(1),
            is_enable: true,
            dataset_type: ty,
            metric,
            ingest_time: Some(1000.0),
            compressed_size: Some(1_048_576.0),
            avg_ingest_mem: Some(1_048_576.0),
            avg_query_mem: Some(1_048_576.0),
            query_times: Some("[100]".to_string()),
        }
    }

    #[test]
    fn test_starts_loading() {
        let d = Dashboard::default();
        assert_eq!(d.overlay_text(), LOADING);
        assert!(d.visible().is_none());
    }

    #[test]
    fn test_network_error_view() {
        let mut d = Dashboard::default();
        d.load(Err(anyhow!("connection refused")));
        assert_eq!(d.overlay_text(), NETWORK_ERROR);
        assert!(d.tables().is_empty());
        assert!(matches!(d.view(), ViewState::NetworkError(msg) if msg.contains("refused")));
    }

    #[test]
    fn test_selection_reslices_without_rebuild() {
        let mut d = Dashboard::default();
        d.load(Ok(vec![rec(1, 1, "clp"), rec(2, 2, "clps")]));
        assert_eq!(d.overlay_text(), "");
        assert_eq!(d.tables().len(), 4);
        assert_eq!(d.visible().unwrap().columns[0].target, "clp");
        assert_eq!(d.workload().name, "Hadoop (258GB)");

        d.select_type(DatasetType::SemiStructured);
        assert!(d.visible().unwrap().is_empty());
        d.select_metric(RunMetric::ColdRun);
        assert_eq!(d.visible().unwrap().columns[0].target, "clps");
        assert_eq!(d.workload().name, "MongoDB (64GB)");
        assert_eq!(d.state().unwrap().accepted, 2);
    }

    #[test]
    fn test_reload_replaces_state() {
        let mut d = Dashboard::default();
        d.load(Ok(vec![rec(1, 1, "old")]));
        d.load(Ok(vec![rec(1, 1, "new")]));
        let cols = &d.visible().unwrap().columns;
        assert_eq!(cols.len(), 1);
        assert_eq!(cols[0].target, "new");
    }

    #[test]
    fn test_chart_for_row() {
        let mut d = Dashboard::default();
        d.load(Ok(vec![rec(1, 1, "a"), rec(1, 1, "b")]));
        let (title, bars) = d.chart(4).unwrap();
        assert_eq!(title, "Ingest time:");
        assert_eq!(bars.len(), 2);
        assert!(d.chart(99).is_none());
    }
}
