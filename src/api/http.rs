use std::time::Duration;

use crate::api::{RawResponse, SearchBackend, DEFAULT_SEARCH_PATH};
use crate::error::{ConfigError, FetchError};
use crate::query;

const USER_AGENT: &str = concat!("product-lister/", env!("CARGO_PKG_VERSION"));

pub fn build_http_client(
    proxy: Option<&str>,
    timeout_seconds: u64,
) -> Result<reqwest::Client, ConfigError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(USER_AGENT),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .timeout(Duration::from_secs(timeout_seconds.max(1)));

    if let Some(proxy) = proxy.filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| ConfigError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| ConfigError::HttpClientBuild { source: e })
}

/// Issues product searches against a live backend.
#[derive(Clone, Debug)]
pub struct HttpSearchBackend {
    client: reqwest::Client,
    base_url: String,
    search_path: String,
}

impl HttpSearchBackend {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
        }
    }

    pub fn with_search_path(mut self, path: impl Into<String>) -> Self {
        self.search_path = path.into();
        self
    }
}

impl SearchBackend for HttpSearchBackend {
    async fn search(&self, params: &[(String, String)]) -> Result<RawResponse, FetchError> {
        let url = query::endpoint_url(&self.base_url, &self.search_path, params)?;
        log::debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network { source: e })?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network { source: e })?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
