use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

pub const DEFAULT_CITY_ID: &str = "1";
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 20;
pub const DEFAULT_SORT_COLUMN: &str = "name";

/// Filter key that feeds the `q` parameter instead of being passed through.
pub const SEARCH_FILTER_KEY: &str = "search";

/// Insertion-ordered filter key/value pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSet {
    entries: Vec<(String, String)>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, keeping the original position when the key exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn search_term(&self) -> &str {
        self.get(SEARCH_FILTER_KEY).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FilterSet::new();
        for (k, v) in iter {
            set.set(k, v);
        }
        set
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            column: DEFAULT_SORT_COLUMN.to_string(),
            direction: SortDirection::Asc,
        }
    }
}

impl SortSpec {
    /// The column actually sent today; falls back to `name` when unset.
    pub fn column_or_default(&self) -> &str {
        if self.column.trim().is_empty() {
            DEFAULT_SORT_COLUMN
        } else {
            &self.column
        }
    }

    /// Sort value in the search API's own vocabulary.
    pub fn api_param(&self) -> &'static str {
        match self.column_or_default() {
            "base_price" => match self.direction {
                SortDirection::Asc => "price_asc",
                SortDirection::Desc => "price_desc",
            },
            "name" => "name",
            _ => "relevance",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub items_per_page: u32,
    pub total_products: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            total_products: 0,
        }
    }
}

impl Pagination {
    pub fn page_or_default(&self) -> u32 {
        if self.current_page == 0 {
            1
        } else {
            self.current_page
        }
    }

    pub fn limit_or_default(&self) -> u32 {
        if self.items_per_page == 0 {
            DEFAULT_ITEMS_PER_PAGE
        } else {
            self.items_per_page
        }
    }

    pub fn total_pages(&self) -> u64 {
        crate::pagination::total_pages(self.total_products, self.items_per_page)
    }
}

/// Product identifier; the backend sends either numbers or strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => fmt::Display::fmt(id, f),
            Self::Text(id) => f.pad(id),
        }
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<i32> for ProductId {
    fn from(id: i32) -> Self {
        Self::Int(i64::from(id))
    }
}

/// A product row as returned by the search endpoint.
///
/// Only `product_id` is required; every other field is kept verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Product {
    pub fn new(product_id: impl Into<ProductId>) -> Self {
        Self {
            product_id: product_id.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn field_text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub filters: FilterSet,
    pub sort: SortSpec,
    pub pagination: Pagination,
    pub city_id: Option<String>,
    pub products: Vec<Product>,
}

impl AppState {
    pub fn city_or_default(&self) -> &str {
        match self.city_id.as_deref().map(str::trim) {
            Some(city) if !city.is_empty() => city,
            _ => DEFAULT_CITY_ID,
        }
    }

    pub fn replace_products(&mut self, products: Vec<Product>, total: u64) {
        self.products = products;
        self.pagination.total_products = total;
    }

    pub fn reset_products(&mut self) {
        self.replace_products(Vec::new(), 0);
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        self.products.iter().map(|p| p.product_id.clone()).collect()
    }
}

pub type SharedState = Arc<Mutex<AppState>>;

pub fn shared(state: AppState) -> SharedState {
    Arc::new(Mutex::new(state))
}
