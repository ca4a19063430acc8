pub mod http;

use std::future::Future;

use serde::{Deserialize, Deserializer};

use crate::error::FetchError;
use crate::state::Product;

pub use http::{build_http_client, HttpSearchBackend};

pub const DEFAULT_SEARCH_PATH: &str = "/api/search";

/// Message used when the backend reports failure without saying why.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Ошибка загрузки";

/// Status and body of a search response, before any interpretation.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The transport behind product searches.
pub trait SearchBackend: Send + Sync {
    fn search(
        &self,
        params: &[(String, String)],
    ) -> impl Future<Output = Result<RawResponse, FetchError>> + Send;
}

/// A validated page of search results.
#[derive(Clone, Debug)]
pub struct SearchData {
    pub products: Vec<Product>,
    pub total: u64,
}

/// `data` as sent on the wire; `products` may be absent or null.
#[derive(Clone, Debug, Deserialize)]
pub struct SearchPayload {
    pub products: Option<Vec<Product>>,
    #[serde(default, deserialize_with = "total_from_number")]
    pub total: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchEnvelope {
    pub success: bool,
    pub data: Option<SearchPayload>,
    pub error: Option<String>,
}

/// Accepts any JSON number or null; null, negative and non-finite values count as 0.
fn total_from_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let total = Option::<f64>::deserialize(deserializer)?;
    Ok(match total {
        Some(n) if n.is_finite() && n > 0.0 => n as u64,
        _ => 0,
    })
}

impl SearchEnvelope {
    pub fn into_page(self) -> Result<SearchData, FetchError> {
        if !self.success {
            let message = self
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
            return Err(FetchError::Application { message });
        }
        let data = self.data.ok_or(FetchError::MissingData)?;
        let products = data.products.ok_or(FetchError::MissingData)?;
        Ok(SearchData {
            products,
            total: data.total,
        })
    }
}

/// Turns a raw response into a page of products, rejecting non-2xx statuses,
/// undecodable bodies and `success: false` envelopes.
pub fn parse_search_response(response: &RawResponse) -> Result<SearchData, FetchError> {
    if !response.is_success() {
        return Err(FetchError::Status {
            status: response.status,
        });
    }
    let envelope: SearchEnvelope = serde_json::from_slice(&response.body)
        .map_err(|e| FetchError::Decode { source: e })?;
    envelope.into_page()
}
