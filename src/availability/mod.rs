use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::FetchError;
use crate::query;
use crate::state::ProductId;

pub const DEFAULT_AVAILABILITY_PATH: &str = "/api/availability";

/// Fetches per-product stock data for the ids just shown.
///
/// Fire-and-forget: the fetcher does not wait for the result.
pub trait AvailabilityLoader: Send + Sync {
    fn load_availability(&self, product_ids: Vec<ProductId>);
}

#[derive(Debug)]
pub struct AvailabilityReport {
    pub product_ids: Vec<ProductId>,
    pub result: Result<Value, FetchError>,
}

/// Loads availability over HTTP on a spawned task and forwards each report.
#[derive(Clone, Debug)]
pub struct HttpAvailabilityLoader {
    client: reqwest::Client,
    base_url: String,
    path: String,
    city_id: String,
    tx: mpsc::Sender<AvailabilityReport>,
}

impl HttpAvailabilityLoader {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        city_id: impl Into<String>,
        tx: mpsc::Sender<AvailabilityReport>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            path: DEFAULT_AVAILABILITY_PATH.to_string(),
            city_id: city_id.into(),
            tx,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    async fn fetch(&self, product_ids: &[ProductId]) -> Result<Value, FetchError> {
        let params = availability_params(product_ids, &self.city_id);
        let url = query::endpoint_url(&self.base_url, &self.path, &params)?;
        log::debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network { source: e })?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(FetchError::Status { status });
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network { source: e })?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode { source: e })
    }
}

impl AvailabilityLoader for HttpAvailabilityLoader {
    fn load_availability(&self, product_ids: Vec<ProductId>) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            log::warn!("availability load skipped: no async runtime");
            return;
        };
        let loader = self.clone();
        handle.spawn(async move {
            let result = loader.fetch(&product_ids).await;
            if let Err(e) = &result {
                log::warn!("availability load failed: {e}");
            }
            let _ = loader
                .tx
                .send(AvailabilityReport {
                    product_ids,
                    result,
                })
                .await;
        });
    }
}

/// Loader for pages that do not show availability.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAvailability;

impl AvailabilityLoader for NoAvailability {
    fn load_availability(&self, product_ids: Vec<ProductId>) {
        log::debug!("availability disabled, {} ids ignored", product_ids.len());
    }
}

pub fn availability_params(product_ids: &[ProductId], city_id: &str) -> Vec<(String, String)> {
    let ids = product_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    vec![
        ("product_ids".to_string(), ids),
        ("city_id".to_string(), city_id.to_string()),
    ]
}
