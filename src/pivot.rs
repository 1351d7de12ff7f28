//! Turns a bucket into table columns and rows.

use serde::Serialize;

use crate::colorize::{style_cell, CellStyle};
use crate::grouper::{BucketState, RowKind};
use crate::logging::{log_bucket_summary, ProfileScope};
use crate::record::BucketKey;
use crate::units::Measurement;

/// One target column, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub target: String,
    pub header: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    /// Formatted value, empty when the target has no value in this row.
    pub value: String,
    pub magnitude: f64,
    pub style: CellStyle,
}

impl Cell {
    /// What the table shows for this cell.
    pub fn display(&self) -> &str {
        self.style.display(&self.value)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    /// Grid identity only: 1..=6 for fixed rows, 7.. for queries.
    pub id: usize,
    pub kind: RowKind,
    pub label: String,
    /// One cell per column, same order as `PivotTable::columns`.
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PivotTable {
    pub key: BucketKey,
    pub columns: Vec<Column>,
    pub rows: Vec<TableRow>,
}

/// One bar of a drill-down chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: String,
    pub value: f64,
}

impl TableRow {
    /// Bars for targets with data, in column order.
    pub fn chart_series(&self, columns: &[Column]) -> Vec<ChartBar> {
        columns
            .iter()
            .zip(&self.cells)
            .filter(|(_, cell)| cell.magnitude != 0.0 && cell.magnitude.is_finite())
            .map(|(col, cell)| ChartBar {
                label: col.header.clone(),
                value: cell.magnitude,
            })
            .collect()
    }
}

impl PivotTable {
    pub fn build(bucket: &BucketState) -> Self {
        let _scope = ProfileScope::new("pivot");
        let ordered = bucket.targets.ordered();
        let columns: Vec<Column> = ordered
            .iter()
            .map(|(id, info)| Column {
                target: id.to_string(),
                header: info.display_name.clone(),
            })
            .collect();

        let rows = bucket
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let values: Vec<Option<&Measurement>> =
                    columns.iter().map(|c| row.get(&c.target)).collect();
                let cells = values
                    .iter()
                    .map(|value| Cell {
                        value: value.map(|m| m.text.clone()).unwrap_or_default(),
                        magnitude: value.map_or(0.0, |m| m.magnitude),
                        style: style_cell(&values, *value),
                    })
                    .collect();
                TableRow {
                    id: i + 1,
                    kind: row.kind,
                    label: row.label.clone(),
                    cells,
                }
            })
            .collect();

        log_bucket_summary(&bucket.key.to_string(), columns.len(), bucket.query_count());
        Self {
            key: bucket.key,
            columns,
            rows,
        }
    }

    pub fn row(&self, id: usize) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorize::Rgb;
    use crate::grouper::DashboardState;
    use crate::record::{BenchmarkRecord, DatasetType, RunMetric};

    fn rec(target: &str, order: i64, size_mb: f64, queries: &str) -> BenchmarkRecord {
        BenchmarkRecord {
            target: target.to_string(),
            target_displayed_name: format!("{} name", target),
            displayed_order: Some(order),
            is_enable: true,
            dataset_type: 2,
            metric: 2,
            ingest_time: Some(2000.0),
            compressed_size: Some(size_mb * 1_048_576.0),
            avg_ingest_mem: Some(0.0),
            avg_query_mem: Some(1_048_576.0),
            query_times: Some(queries.to_string()),
        }
    }

    fn table(records: &[BenchmarkRecord]) -> PivotTable {
        let state = DashboardState::build(records);
        let key = BucketKey::new(DatasetType::SemiStructured, RunMetric::ColdRun);
        PivotTable::build(state.bucket(key).unwrap())
    }

    #[test]
    fn test_columns_follow_display_order() {
        let t = table(&[
            rec("A", 3, 1.0, "[1]"),
            rec("B", 1, 2.0, "[1]"),
            rec("C", 2, 3.0, "[1]"),
        ]);
        let targets: Vec<&str> = t.columns.iter().map(|c| c.target.as_str()).collect();
        assert_eq!(targets, vec!["B", "C", "A"]);
        assert_eq!(t.columns[0].header, "B name");
    }

    #[test]
    fn test_row_sequence_and_ids() {
        let t = table(&[rec("A", 1, 1.0, "[10,20,30]")]);
        let labels: Vec<&str> = t.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Compressed size:",
                "Mem usage (ingest):",
                "Mem usage (query):",
                "Ingest time:",
                "Ingest speed:",
                "Avg query latency:",
                "Q1:",
                "Q2:",
                "Q3:",
            ]
        );
        let ids: Vec<usize> = t.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=9).collect::<Vec<_>>());
        assert_eq!(t.row(7).unwrap().kind, RowKind::Query(0));
    }

    #[test]
    fn test_cells_are_ranked_within_row() {
        let t = table(&[
            rec("A", 1, 1.0, "[1]"),
            rec("B", 2, 2.0, "[1]"),
            rec("C", 3, 4.0, "[1]"),
        ]);
        let size = &t.rows[0];
        assert_eq!(size.cells[0].style.background(), Rgb(0, 255, 0));
        assert_eq!(size.cells[2].style.background(), Rgb(0, 0, 0));

        // ingest memory is 0 for everyone: fewer than two values, unstyled
        let mem = &t.rows[1];
        assert!(mem.cells.iter().all(|c| c.style == CellStyle::Unstyled));
        assert_eq!(mem.cells[0].display(), "0.00MB");
    }

    #[test]
    fn test_chart_series_skips_empty_cells() {
        let mut zero = rec("Z", 0, 0.0, "[1]");
        zero.target_displayed_name = "Zero".to_string();
        let t = table(&[zero, rec("A", 1, 1.0, "[1]"), rec("B", 2, 3.0, "[1]")]);
        let bars = t.rows[0].chart_series(&t.columns);
        assert_eq!(
            bars,
            vec![
                ChartBar { label: "A name".to_string(), value: 1.0 },
                ChartBar { label: "B name".to_string(), value: 3.0 },
            ]
        );
        // the zero cell in a ranked row is blanked
        assert_eq!(t.rows[0].cells[0].display(), "");
    }
}
