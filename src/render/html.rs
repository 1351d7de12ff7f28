//! Self-contained HTML page: chip toggles, the pivoted table and a
//! full-screen bar chart per row. All four buckets are embedded, so toggling
//! never goes back to the network.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::logging::log_render;
use crate::pivot::{ChartBar, PivotTable};
use crate::record::{DatasetType, RunMetric};
use crate::shell::Dashboard;

#[derive(Debug, Serialize)]
struct PageData {
    generated: String,
    selected_type: DatasetType,
    selected_metric: RunMetric,
    overlay: &'static str,
    types: Vec<Choice<DatasetType>>,
    metrics: Vec<Choice<RunMetric>>,
    buckets: Vec<BucketView>,
}

#[derive(Debug, Serialize)]
struct Choice<T> {
    value: T,
    label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    workload: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct BucketView {
    dataset_type: DatasetType,
    run_metric: RunMetric,
    workload: &'static str,
    columns: Vec<String>,
    rows: Vec<RowView>,
}

#[derive(Debug, Serialize)]
struct RowView {
    id: usize,
    label: String,
    cells: Vec<CellView>,
    chart: Vec<ChartBar>,
}

#[derive(Debug, Serialize)]
struct CellView {
    text: String,
    bg: String,
    fg: String,
}

fn bucket_view(table: &PivotTable) -> BucketView {
    BucketView {
        dataset_type: table.key.dataset_type,
        run_metric: table.key.run_metric,
        workload: table.key.dataset_type.workload().name,
        columns: table.columns.iter().map(|c| c.header.clone()).collect(),
        rows: table
            .rows
            .iter()
            .map(|row| RowView {
                id: row.id,
                label: row.label.clone(),
                cells: row
                    .cells
                    .iter()
                    .map(|c| CellView {
                        text: c.display().to_string(),
                        bg: c.style.background().to_css(),
                        fg: c.style.text_color().to_css(),
                    })
                    .collect(),
                chart: row.chart_series(&table.columns),
            })
            .collect(),
    }
}

pub fn render_page(dashboard: &Dashboard) -> Result<String> {
    let selection = dashboard.selection();
    let tables = dashboard.tables();
    let data = PageData {
        generated: chrono::Utc::now().to_rfc3339(),
        selected_type: selection.dataset_type,
        selected_metric: selection.run_metric,
        overlay: dashboard.overlay_text(),
        types: DatasetType::ALL
            .iter()
            .map(|t| Choice {
                value: *t,
                label: t.label(),
                workload: Some(t.workload().name),
            })
            .collect(),
        metrics: RunMetric::ALL
            .iter()
            .map(|m| Choice {
                value: *m,
                label: m.label(),
                workload: None,
            })
            .collect(),
        buckets: tables.iter().map(|t| bucket_view(t)).collect(),
    };

    // keep "</script>" inside strings from closing the data block
    let json_blob = serde_json::to_string(&data)
        .context("serializing dashboard data")?
        .replace("</", "<\\/");
    for table in &tables {
        log_render("html", &table.key.to_string(), table.rows.len(), table.columns.len());
    }
    Ok(TEMPLATE.replace("__DASHBOARD_DATA__", &json_blob))
}

pub fn write_page(dashboard: &Dashboard, path: &Path) -> Result<()> {
    let html = render_page(dashboard)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    fs::write(path, html).with_context(|| format!("writing {}", path.display()))
}

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Benchmark Results</title>
  <style>
    :root {
      --fg: #1f2328; --fg-muted: #59636e; --border: #d1d9e0; --accent: #1f883d;
      --chip: #6e7781; --sans: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
    }
    * { box-sizing: border-box; }
    body { font-family: var(--sans); color: var(--fg); margin: 1rem 1.5rem; }
    .group { display: flex; flex-wrap: wrap; gap: 0.5rem; align-items: center; margin: 0.75rem 0; }
    .chip {
      border: 0; border-radius: 1rem; padding: 0.25rem 0.8rem; color: #fff;
      background: var(--chip); cursor: pointer; font-size: 0.85rem;
    }
    .chip.on { background: var(--accent); }
    .links { display: flex; gap: 1.25rem; justify-content: flex-end; }
    .links a { color: #0969da; text-decoration: none; }
    .workload { color: var(--fg-muted); font-size: 0.9rem; }
    table { border-collapse: collapse; margin-top: 0.75rem; }
    th, td { border: 1px solid var(--border); padding: 0.3rem 0.6rem; text-align: right; white-space: nowrap; }
    th { background: #f6f8fa; }
    td.label { min-width: 14rem; }
    td.label button { border: 0; background: none; cursor: pointer; float: left; font-size: 1rem; }
    .overlay-text { padding: 2rem; color: var(--fg-muted); }
    #chart { position: fixed; inset: 0; background: #fff; display: none; flex-direction: column; }
    #chart.open { display: flex; }
    #chart header { background: #1976d2; color: #fff; padding: 0.75rem 1rem; display: flex; gap: 1rem; align-items: center; }
    #chart header button { border: 0; background: none; color: #fff; font-size: 1.2rem; cursor: pointer; }
    .bars { flex: 1; display: flex; align-items: flex-end; gap: 1.5rem; padding: 2rem 3rem; }
    .bar { flex: 1; display: flex; flex-direction: column; align-items: center; justify-content: flex-end; height: 100%; }
    .bar .fill { width: 100%; background: #02b2af; }
    .bar .name, .bar .value { font-size: 0.8rem; margin-top: 0.3rem; }
  </style>
</head>
<body>
  <nav class="links">
    <a href="https://github.com/y-scope/clp-bench-prototype/blob/main/docs/methodology.md">Methodology</a>
    <a href="https://docs.yscope.com/clp/main/user-guide/core-unstructured/clp.html">CLP Documentation</a>
  </nav>
  <div class="group" id="types"><span>Type:</span></div>
  <div class="group" id="metrics"><span>Metric:</span></div>
  <span class="workload" id="workload"></span>
  <div id="grid"></div>
  <div id="chart">
    <header><button id="chart-close" aria-label="close">&#x2715;</button><span id="chart-title"></span></header>
    <div class="bars" id="chart-bars"></div>
  </div>
  <script id="dashboard-data" type="application/json">__DASHBOARD_DATA__</script>
  <script>
    const DATA = JSON.parse(document.getElementById('dashboard-data').textContent);
    const sel = { type: DATA.selected_type, metric: DATA.selected_metric };

    function el(tag, attrs, text) {
      const e = document.createElement(tag);
      Object.assign(e, attrs || {});
      if (text !== undefined) e.textContent = text;
      return e;
    }

    function chips(containerId, choices, key) {
      const box = document.getElementById(containerId);
      box.querySelectorAll('button').forEach((b) => b.remove());
      for (const c of choices) {
        const b = el('button', { className: 'chip' + (sel[key] === c.value ? ' on' : '') }, c.label);
        b.onclick = () => { sel[key] = c.value; render(); };
        box.appendChild(b);
      }
    }

    function openChart(row) {
      document.getElementById('chart-title').textContent = row.label;
      const bars = document.getElementById('chart-bars');
      bars.innerHTML = '';
      const max = Math.max(0, ...row.chart.map((b) => b.value));
      for (const b of row.chart) {
        const bar = el('div', { className: 'bar' });
        const fill = el('div', { className: 'fill' });
        fill.style.height = (max > 0 ? (b.value / max) * 80 : 0) + '%';
        bar.appendChild(el('div', { className: 'value' }, String(b.value)));
        bar.appendChild(fill);
        bar.appendChild(el('div', { className: 'name' }, b.label));
        bars.appendChild(bar);
      }
      document.getElementById('chart').classList.add('open');
    }

    function render() {
      chips('types', DATA.types, 'type');
      chips('metrics', DATA.metrics, 'metric');
      const grid = document.getElementById('grid');
      grid.innerHTML = '';
      const bucket = DATA.buckets.find((b) => b.dataset_type === sel.type && b.run_metric === sel.metric);
      const type = DATA.types.find((t) => t.value === sel.type);
      document.getElementById('workload').textContent =
        'The used benchmark workload: ' + (type ? type.workload : '');
      if (!bucket) {
        grid.appendChild(el('div', { className: 'overlay-text' }, DATA.overlay));
        return;
      }
      const table = el('table');
      const head = el('tr');
      head.appendChild(el('th', {}, ''));
      for (const c of bucket.columns) head.appendChild(el('th', {}, c));
      table.appendChild(head);
      for (const row of bucket.rows) {
        const tr = el('tr');
        const label = el('td', { className: 'label' }, row.label);
        const btn = el('button', { title: 'bar chart' }, '\u{1F4CA}');
        btn.onclick = () => openChart(row);
        label.prepend(btn);
        tr.appendChild(label);
        for (const c of row.cells) {
          const td = el('td', {}, c.text);
          td.style.background = c.bg;
          td.style.color = c.fg;
          tr.appendChild(td);
        }
        table.appendChild(tr);
      }
      grid.appendChild(table);
    }

    document.getElementById('chart-close').onclick = () =>
      document.getElementById('chart').classList.remove('open');
    render();
  </script>
</body>
</html>
"##;
