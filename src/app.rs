use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use tokio::sync::mpsc;

use crate::api::{self, HttpSearchBackend};
use crate::availability::{
    self, AvailabilityLoader, AvailabilityReport, HttpAvailabilityLoader, NoAvailability,
};
use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::fetcher::{FetchOutcome, ProductFetcher};
use crate::output::OutputFormat;
use crate::query::SortMode;
use crate::state::{self, AppState, FilterSet, Pagination, SortDirection, SortSpec};
use crate::ui::{TerminalUi, LOAD_FAILED_TEXT};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn init_logging(verbose: u8) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level(verbose)),
    )
    .try_init();
}

#[derive(Clone, Debug)]
struct RunConfig {
    base_url: String,
    search_path: String,
    availability_path: String,
    load_availability: bool,
    timeout: u64,
    proxy: Option<String>,
    format: OutputFormat,
    no_color: bool,
    sort_mode: SortMode,
    filters: FilterSet,
    sort: SortSpec,
    pagination: Pagination,
    city_id: String,
}

impl RunConfig {
    fn initial_state(&self) -> AppState {
        AppState {
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            pagination: self.pagination,
            city_id: Some(self.city_id.clone()),
            products: Vec::new(),
        }
    }
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let base_url = args
        .url
        .or(cfg.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    reqwest::Url::parse(&base_url).map_err(|e| format!("invalid base url '{base_url}': {e}"))?;

    let format_raw = args
        .format
        .or(cfg.output_format)
        .unwrap_or_else(|| "text".to_string());
    let format = OutputFormat::parse(&format_raw)
        .ok_or_else(|| format!("invalid output format '{format_raw}'"))?;

    let sort_mode_raw = args
        .sort_mode
        .or(cfg.sort_mode)
        .unwrap_or_else(|| "column".to_string());
    let sort_mode = SortMode::parse(&sort_mode_raw)
        .ok_or_else(|| format!("invalid sort mode '{sort_mode_raw}'"))?;

    let direction_raw = args
        .direction
        .or(cfg.sort_direction)
        .unwrap_or_else(|| "asc".to_string());
    let direction = SortDirection::parse(&direction_raw)
        .ok_or_else(|| format!("invalid sort direction '{direction_raw}'"))?;
    let sort = SortSpec {
        column: args
            .sort
            .or(cfg.sort)
            .unwrap_or_else(|| state::DEFAULT_SORT_COLUMN.to_string()),
        direction,
    };

    let mut filters = FilterSet::new();
    for raw in cfg.filters.unwrap_or_default().iter().chain(args.filter.iter()) {
        let (key, value) =
            validation::parse_filter(raw).map_err(|e| format!("invalid filter '{raw}': {e}"))?;
        filters.set(key, value);
    }
    if let Some(search) = args.search {
        filters.set(state::SEARCH_FILTER_KEY, search);
    }

    let items_per_page = args
        .limit
        .or(cfg.limit)
        .unwrap_or(state::DEFAULT_ITEMS_PER_PAGE);
    if items_per_page == 0 {
        return Err("invalid limit, expected positive integer".to_string());
    }
    let pagination = Pagination {
        current_page: args.page.unwrap_or(1),
        items_per_page,
        total_products: 0,
    };

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);
    let load_availability = !args.no_availability && cfg.load_availability.unwrap_or(true);

    Ok(RunConfig {
        base_url,
        search_path: cfg
            .search_path
            .unwrap_or_else(|| api::DEFAULT_SEARCH_PATH.to_string()),
        availability_path: cfg
            .availability_path
            .unwrap_or_else(|| availability::DEFAULT_AVAILABILITY_PATH.to_string()),
        load_availability,
        timeout: args.timeout.or(cfg.timeout).unwrap_or(10),
        proxy: args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty()),
        format,
        no_color,
        sort_mode,
        filters,
        sort,
        pagination,
        city_id: args
            .city
            .or(cfg.city_id)
            .unwrap_or_else(|| state::DEFAULT_CITY_ID.to_string()),
    })
}

fn print_settings(run: &RunConfig) {
    format_kv_line("Backend", &run.base_url);
    format_kv_line("City", &run.city_id);
    format_kv_line(
        "Page",
        &format!(
            "{} (limit {})",
            run.pagination.current_page, run.pagination.items_per_page
        ),
    );
    format_kv_line(
        "Sort",
        &format!("{} {}", run.sort.column, run.sort.direction.as_str()),
    );
    if !run.filters.is_empty() {
        let filters = run
            .filters
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ");
        format_kv_line("Filters", &filters);
    }
    eprintln!();
}

async fn run_listing<A: AvailabilityLoader>(
    run: &RunConfig,
    backend: HttpSearchBackend,
    loader: A,
) -> Result<bool, String> {
    let ui = TerminalUi::new(run.format, run.no_color);
    let fetcher = ProductFetcher::new(backend, ui, loader, state::shared(run.initial_state()))
        .with_sort_mode(run.sort_mode);

    match fetcher.fetch_products().await {
        FetchOutcome::Loaded { count, .. } => {
            if run.format == OutputFormat::Text {
                if let Some(line) = fetcher.ui().pagination_line() {
                    eprintln!();
                    eprintln!(":: {line} ::");
                }
            }
            Ok(count > 0)
        }
        FetchOutcome::Failed(e) => Err(format!("{LOAD_FAILED_TEXT}: {e}")),
        FetchOutcome::Stale => Ok(false),
    }
}

/// Stdout carries only the product listing in JSON mode, so it stays one document.
fn availability_on_stdout(format: OutputFormat) -> bool {
    format == OutputFormat::Text
}

fn availability_sink(format: OutputFormat) -> Box<dyn Write + Send> {
    if availability_on_stdout(format) {
        Box::new(io::stdout())
    } else {
        Box::new(io::stderr())
    }
}

async fn drain_availability<W: Write>(
    mut rx: mpsc::Receiver<AvailabilityReport>,
    wait: Duration,
    out: &mut W,
) {
    while let Ok(Some(report)) = tokio::time::timeout(wait, rx.recv()).await {
        match report.result {
            Ok(value) => {
                eprintln!(":: Availability ({} products) ::", report.product_ids.len());
                let body =
                    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
                if let Err(e) = writeln!(out, "{body}") {
                    log::warn!("failed to write availability: {e}");
                }
            }
            Err(e) => log::warn!("availability for {:?}: {e}", report.product_ids),
        }
    }
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.format == OutputFormat::Text {
        print_settings(&run);
    }

    let client =
        api::build_http_client(run.proxy.as_deref(), run.timeout).map_err(|e| e.to_string())?;
    let backend =
        HttpSearchBackend::new(client.clone(), &run.base_url).with_search_path(&run.search_path);

    if !run.load_availability {
        run_listing(&run, backend, NoAvailability).await?;
        return Ok(());
    }

    let (tx, rx) = mpsc::channel::<AvailabilityReport>(16);
    let loader = HttpAvailabilityLoader::new(client, &run.base_url, &run.city_id, tx)
        .with_path(&run.availability_path);
    let has_products = run_listing(&run, backend, loader).await?;

    if has_products {
        let mut out = availability_sink(run.format);
        drain_availability(rx, Duration::from_secs(run.timeout.max(1)), &mut out).await;
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_logging(args.verbose);

    let config_path: Option<PathBuf> = args
        .config
        .as_deref()
        .map(config::expand_tilde)
        .or_else(config::default_config_path);

    if args.init_config {
        let path = config_path.ok_or("cannot determine config path")?;
        config::ensure_default_config_file(&path).map_err(|e| e.to_string())?;
        eprintln!(":: Config written to {}", path.display());
        return Ok(());
    }

    // An explicit --config must exist; the default location may be absent.
    let cfg = match config_path.as_ref() {
        Some(path) => {
            config::load_config(path, args.config.is_none()).map_err(|e| e.to_string())?
        }
        None => ConfigFile::default(),
    };

    let run = build_run_config(args, cfg)?;
    log::debug!("run config: {run:?}");

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
