use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::state::{AppState, SEARCH_FILTER_KEY};

/// Which value goes into the `sort` parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// The raw sort column (`name`, `base_price`, ...).
    #[default]
    Column,
    /// The search API vocabulary (`price_asc`, `price_desc`, `name`, `relevance`).
    Api,
}

impl SortMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "column" | "raw" => Some(Self::Column),
            "api" => Some(Self::Api),
            _ => None,
        }
    }
}

pub type QueryParams = Vec<(String, String)>;

/// Builds the ordered search parameters: `q`, `page`, `limit`, `sort`, `city_id`,
/// then every non-empty filter other than `search` in insertion order.
pub fn build_search_params(state: &AppState, sort_mode: SortMode) -> QueryParams {
    let sort = match sort_mode {
        SortMode::Column => state.sort.column_or_default().to_string(),
        SortMode::Api => state.sort.api_param().to_string(),
    };

    let mut params: QueryParams = vec![
        ("q".to_string(), state.filters.search_term().to_string()),
        (
            "page".to_string(),
            state.pagination.page_or_default().to_string(),
        ),
        (
            "limit".to_string(),
            state.pagination.limit_or_default().to_string(),
        ),
        ("sort".to_string(), sort),
        ("city_id".to_string(), state.city_or_default().to_string()),
    ];

    for (key, value) in state.filters.iter() {
        if key == SEARCH_FILTER_KEY || value.is_empty() {
            continue;
        }
        // A filter named like a built-in parameter overrides it in place.
        match params.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value.to_string(),
            None => params.push((key.to_string(), value.to_string())),
        }
    }

    params
}

/// Form-url-encodes parameters the way a browser's `URLSearchParams` does.
pub fn encode_query(params: &[(String, String)]) -> String {
    match Url::parse("http://localhost/") {
        Ok(mut url) => {
            url.query_pairs_mut().extend_pairs(params.iter());
            url.query().unwrap_or_default().to_string()
        }
        Err(_) => String::new(),
    }
}

/// Joins `base_url` and `path` and appends the encoded parameters.
pub fn endpoint_url(
    base_url: &str,
    path: &str,
    params: &[(String, String)],
) -> Result<Url, FetchError> {
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let mut url = Url::parse(&joined).map_err(|e| FetchError::InvalidUrl {
        url: joined.clone(),
        message: e.to_string(),
    })?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.iter());
    }
    Ok(url)
}
