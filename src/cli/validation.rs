use crate::cli::args::CliArgs;
use crate::output::OutputFormat;
use crate::query::SortMode;
use crate::state::SortDirection;

/// Splits a `key=value` filter; the value may be empty, the key may not.
pub fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| "expected KEY=VALUE".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("filter key is empty".to_string());
    }
    Ok((key.to_string(), value.trim().to_string()))
}

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(url) = args.url.as_deref() {
        reqwest::Url::parse(url).map_err(|e| format!("invalid --url '{url}': {e}"))?;
    }
    if args.page == Some(0) {
        return Err("invalid --page, expected positive integer".to_string());
    }
    if args.limit == Some(0) {
        return Err("invalid --limit, expected positive integer".to_string());
    }
    if args.timeout == Some(0) {
        return Err("invalid --timeout, expected positive integer".to_string());
    }
    if let Some(raw) = args.direction.as_deref() {
        SortDirection::parse(raw)
            .ok_or_else(|| format!("invalid --direction '{raw}', expected asc or desc"))?;
    }
    if let Some(raw) = args.sort_mode.as_deref() {
        SortMode::parse(raw)
            .ok_or_else(|| format!("invalid --sort-mode '{raw}', expected column or api"))?;
    }
    if let Some(raw) = args.format.as_deref() {
        OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid --format '{raw}', expected text or json"))?;
    }
    for raw in args.filter.iter() {
        parse_filter(raw).map_err(|e| format!("invalid --filter '{raw}': {e}"))?;
    }
    Ok(())
}
