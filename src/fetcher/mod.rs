use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::{self, SearchBackend};
use crate::availability::AvailabilityLoader;
use crate::error::FetchError;
use crate::pagination;
use crate::query::{self, SortMode};
use crate::state::SharedState;
use crate::ui::{RenderPort, ToastKind, LOAD_FAILED_TEXT};

#[derive(Debug)]
pub enum FetchOutcome {
    Loaded { count: usize, total: u64 },
    Failed(FetchError),
    /// A newer fetch was started before this one resolved; its response was dropped.
    Stale,
}

impl FetchOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// Loads one page of products into the shared state and redraws the page.
///
/// Each call takes a sequence number. Only the most recently started call may
/// touch state or UI when it resolves; older responses are discarded.
pub struct ProductFetcher<B, U, A> {
    backend: B,
    ui: U,
    availability: A,
    state: SharedState,
    sort_mode: SortMode,
    issued: AtomicU64,
}

impl<B, U, A> ProductFetcher<B, U, A>
where
    B: SearchBackend,
    U: RenderPort,
    A: AvailabilityLoader,
{
    pub fn new(backend: B, ui: U, availability: A, state: SharedState) -> Self {
        Self {
            backend,
            ui,
            availability,
            state,
            sort_mode: SortMode::default(),
            issued: AtomicU64::new(0),
        }
    }

    pub fn with_sort_mode(mut self, sort_mode: SortMode) -> Self {
        self.sort_mode = sort_mode;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub async fn fetch_products(&self) -> FetchOutcome {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.ui.show_loading();

        let outcome = self.load(seq).await;

        if self.is_latest(seq) {
            self.ui.hide_loading();
        }
        outcome
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == seq
    }

    async fn load(&self, seq: u64) -> FetchOutcome {
        let params = {
            let state = self.state.lock().await;
            query::build_search_params(&state, self.sort_mode)
        };
        log::debug!("search #{seq}: {}", query::encode_query(&params));

        let result = match self.backend.search(&params).await {
            Ok(raw) => api::parse_search_response(&raw),
            Err(e) => Err(e),
        };

        let mut state = self.state.lock().await;
        if !self.is_latest(seq) {
            log::debug!("search #{seq}: discarding stale response");
            return FetchOutcome::Stale;
        }

        match result {
            Ok(page) => {
                let total = page.total;
                state.replace_products(page.products, total);
                let count = state.products.len();
                log::info!("loaded {count} of {total} products");

                self.ui.render_products(&state.products);
                pagination::update_pagination_info(&state.pagination, &self.ui);

                if count > 0 {
                    self.availability.load_availability(state.product_ids());
                }
                FetchOutcome::Loaded { count, total }
            }
            Err(e) => {
                log::error!("Fetch error: {e}");
                self.ui.show_toast(LOAD_FAILED_TEXT, ToastKind::Error);
                state.reset_products();
                self.ui.render_products(&state.products);
                FetchOutcome::Failed(e)
            }
        }
    }
}
