use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use benchboard::config::{load_dotenv, Config};
use benchboard::fetch::{load_records, FileSource, HttpSource, ResultSource};
use benchboard::logging::{log, log_startup, obj, v_str, Domain, Level};
use benchboard::record::{DatasetType, RunMetric};
use benchboard::render::{html, terminal};
use benchboard::shell::{Dashboard, Selection, ViewState};
use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TypeArg {
    Unstructured,
    SemiStructured,
}

impl From<TypeArg> for DatasetType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Unstructured => DatasetType::Unstructured,
            TypeArg::SemiStructured => DatasetType::SemiStructured,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MetricArg {
    Hot,
    Cold,
}

impl From<MetricArg> for RunMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Hot => RunMetric::HotRun,
            MetricArg::Cold => RunMetric::ColdRun,
        }
    }
}

/// Benchmark results dashboard
///
/// Fetches result records from the results endpoint and prints the pivoted,
/// rank-colored comparison table for one dataset type and run metric.
///
/// # Examples
///
/// ```bash
/// benchboard --type semi-structured --metric cold
/// benchboard --chart 6
/// benchboard --from-file results.json --html out/dashboard.html
/// ```
#[derive(Parser, Debug)]
#[command(name = "benchboard")]
#[command(author, version, about = "Benchmark results dashboard", long_about = None)]
struct Cli {
    /// Results endpoint; defaults to the one built from BACKEND_HOST/BACKEND_PORT/FRONTEND_BASE_PATH
    #[arg(long)]
    url: Option<String>,

    /// Read a saved `api/get` response instead of fetching
    #[arg(long, value_name = "PATH", conflicts_with = "url")]
    from_file: Option<PathBuf>,

    #[arg(long = "type", value_enum, default_value = "unstructured")]
    dataset_type: TypeArg,

    #[arg(long, value_enum, default_value = "hot")]
    metric: MetricArg,

    /// Also draw the bar chart of this row id
    #[arg(long, value_name = "ROW_ID")]
    chart: Option<usize>,

    /// Write the interactive page with all buckets to this file
    #[arg(long, value_name = "PATH")]
    html: Option<PathBuf>,

    /// Disable colors in the terminal table
    #[arg(long)]
    no_color: bool,

    /// Directory holding .env.local / .env
    #[arg(long, value_name = "DIR", default_value = ".")]
    env_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let dotenv = load_dotenv(&cli.env_dir);

    let mut cfg = Config::from_env();
    if let Some(url) = &cli.url {
        cfg.results_url = Some(url.clone());
    }

    let source: Box<dyn ResultSource + Send + Sync> = match &cli.from_file {
        Some(path) => Box::new(FileSource::new(path.clone())),
        None => Box::new(HttpSource::from_config(&cfg)?),
    };
    log_startup(&source.describe());
    if let Some(path) = dotenv {
        log(
            Level::Debug,
            Domain::System,
            "dotenv_loaded",
            obj(&[("path", v_str(&path.to_string_lossy()))]),
        );
    }

    let mut dashboard = Dashboard::new(Selection {
        dataset_type: cli.dataset_type.into(),
        run_metric: cli.metric.into(),
    });
    eprintln!("{}", dashboard.overlay_text());
    dashboard.load(load_records(source.as_ref()).await);

    let ansi = !cli.no_color && io::stdout().is_terminal();
    terminal::write_dashboard(&mut io::stdout().lock(), &dashboard, ansi)?;

    if let Some(row_id) = cli.chart {
        match dashboard.chart(row_id) {
            Some((title, bars)) => println!("\n{}", terminal::render_chart(&title, &bars)),
            None => eprintln!("no row {} in the current table", row_id),
        }
    }

    if let Some(path) = &cli.html {
        html::write_page(&dashboard, path)?;
        eprintln!("{} written", path.display());
    }

    if let Some(state) = dashboard.state() {
        log(
            Level::Info,
            Domain::System,
            "done",
            obj(&[
                ("accepted", serde_json::json!(state.accepted)),
                ("dropped", serde_json::json!(state.dropped)),
            ]),
        );
    }

    Ok(match dashboard.view() {
        ViewState::NetworkError(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
