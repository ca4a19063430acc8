use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::{RawResponse, SearchBackend};
use crate::availability::AvailabilityLoader;
use crate::error::FetchError;
use crate::fetcher::{FetchOutcome, ProductFetcher};
use crate::pagination;
use crate::query::QueryParams;
use crate::state::{self, AppState, FilterSet, Pagination, Product, ProductId, SharedState};
use crate::ui::{RenderPort, ToastKind, LOAD_FAILED_TEXT};

struct Scripted {
    delay: Duration,
    result: Result<RawResponse, FetchError>,
}

#[derive(Default)]
struct FakeBackend {
    script: Mutex<VecDeque<Scripted>>,
    seen: Mutex<Vec<QueryParams>>,
}

impl FakeBackend {
    fn respond(self, delay_ms: u64, status: u16, body: &str) -> Self {
        self.script.lock().unwrap().push_back(Scripted {
            delay: Duration::from_millis(delay_ms),
            result: Ok(RawResponse {
                status,
                body: body.as_bytes().to_vec(),
            }),
        });
        self
    }

    fn fail(self, error: FetchError) -> Self {
        self.script.lock().unwrap().push_back(Scripted {
            delay: Duration::ZERO,
            result: Err(error),
        });
        self
    }
}

impl SearchBackend for FakeBackend {
    async fn search(&self, params: &[(String, String)]) -> Result<RawResponse, FetchError> {
        self.seen.lock().unwrap().push(params.to_vec());
        let next = self.script.lock().unwrap().pop_front();
        let Some(next) = next else {
            return Err(FetchError::Status { status: 599 });
        };
        if !next.delay.is_zero() {
            tokio::time::sleep(next.delay).await;
        }
        next.result
    }
}

#[derive(Default)]
struct RecordingUi {
    toasts: Mutex<Vec<(String, ToastKind)>>,
    loading: Mutex<bool>,
    texts: Mutex<BTreeMap<String, String>>,
    renders: Mutex<Vec<Vec<String>>>,
}

impl RecordingUi {
    fn toasts(&self) -> Vec<(String, ToastKind)> {
        self.toasts.lock().unwrap().clone()
    }

    fn renders(&self) -> Vec<Vec<String>> {
        self.renders.lock().unwrap().clone()
    }

    fn text(&self, id: &str) -> Option<String> {
        self.texts.lock().unwrap().get(id).cloned()
    }
}

impl RenderPort for RecordingUi {
    fn show_toast(&self, message: &str, kind: ToastKind) {
        self.toasts.lock().unwrap().push((message.to_string(), kind));
    }

    fn show_loading(&self) {
        *self.loading.lock().unwrap() = true;
    }

    fn hide_loading(&self) {
        *self.loading.lock().unwrap() = false;
    }

    fn is_loading(&self) -> bool {
        *self.loading.lock().unwrap()
    }

    fn set_text(&self, target_id: &str, text: &str) {
        self.texts
            .lock()
            .unwrap()
            .insert(target_id.to_string(), text.to_string());
    }

    fn render_products(&self, products: &[Product]) {
        self.renders
            .lock()
            .unwrap()
            .push(products.iter().map(|p| p.product_id.to_string()).collect());
    }
}

#[derive(Clone, Default)]
struct RecordingLoader {
    calls: Arc<Mutex<Vec<Vec<ProductId>>>>,
}

impl RecordingLoader {
    fn calls(&self) -> Vec<Vec<ProductId>> {
        self.calls.lock().unwrap().clone()
    }
}

impl AvailabilityLoader for RecordingLoader {
    fn load_availability(&self, product_ids: Vec<ProductId>) {
        self.calls.lock().unwrap().push(product_ids);
    }
}

fn page_state() -> SharedState {
    let mut app = AppState {
        filters: [("search", "milk"), ("brand", "X")].into_iter().collect::<FilterSet>(),
        ..AppState::default()
    };
    app.pagination.current_page = 2;
    app.pagination.items_per_page = 20;
    app.products = vec![Product::new(99)];
    app.pagination.total_products = 1;
    state::shared(app)
}

fn fetcher(
    backend: FakeBackend,
) -> (
    ProductFetcher<FakeBackend, RecordingUi, RecordingLoader>,
    RecordingLoader,
) {
    let loader = RecordingLoader::default();
    let fetcher = ProductFetcher::new(
        backend,
        RecordingUi::default(),
        loader.clone(),
        page_state(),
    );
    (fetcher, loader)
}

const ONE_PRODUCT: &str = r#"{"success":true,"data":{"products":[{"product_id":1,"name":"Молоко"}],"total":45}}"#;

#[tokio::test]
async fn success_replaces_products_and_loads_availability() {
    let (fetcher, loader) = fetcher(FakeBackend::default().respond(0, 200, ONE_PRODUCT));

    let outcome = fetcher.fetch_products().await;
    assert!(matches!(outcome, FetchOutcome::Loaded { count: 1, total: 45 }));

    let state = fetcher.state().lock().await;
    assert_eq!(state.products.len(), 1);
    assert_eq!(state.products[0].product_id, ProductId::Int(1));
    assert_eq!(state.pagination.total_products, 45);
    drop(state);

    assert_eq!(loader.calls(), vec![vec![ProductId::Int(1)]]);
    let ui = fetcher.ui();
    assert_eq!(ui.renders(), vec![vec!["1".to_string()]]);
    assert!(ui.toasts().is_empty());
    assert!(!ui.is_loading());
    assert_eq!(ui.text("totalPages").as_deref(), Some("3"));
}

#[tokio::test]
async fn string_product_ids_reach_availability_unchanged() {
    let (fetcher, loader) = fetcher(FakeBackend::default().respond(
        0,
        200,
        r#"{"success":true,"data":{"products":[{"product_id":"SKU-1","name":"Кефир"},{"product_id":4}],"total":2}}"#,
    ));

    let outcome = fetcher.fetch_products().await;
    assert!(matches!(outcome, FetchOutcome::Loaded { count: 2, total: 2 }));
    assert_eq!(
        loader.calls(),
        vec![vec![ProductId::Text("SKU-1".to_string()), ProductId::Int(4)]]
    );
    assert_eq!(
        fetcher.ui().renders(),
        vec![vec!["SKU-1".to_string(), "4".to_string()]]
    );
    assert!(fetcher.ui().toasts().is_empty());
}

#[tokio::test]
async fn fractional_total_is_accepted() {
    let (fetcher, _) = fetcher(FakeBackend::default().respond(
        0,
        200,
        r#"{"success":true,"data":{"products":[{"product_id":1}],"total":45.0}}"#,
    ));

    assert!(matches!(
        fetcher.fetch_products().await,
        FetchOutcome::Loaded { count: 1, total: 45 }
    ));
    assert_eq!(fetcher.ui().text("totalPages").as_deref(), Some("3"));
}

#[tokio::test]
async fn request_carries_search_pagination_and_filters() {
    let backend = FakeBackend::default().respond(0, 200, ONE_PRODUCT);
    let (fetcher, _) = fetcher(backend);
    fetcher.fetch_products().await;

    let query = crate::query::encode_query(&fetcher_seen(&fetcher)[0]);
    assert!(query.starts_with("q=milk&page=2&limit=20"));
    assert!(query.contains("brand=X"));
    assert!(!query.contains("search="));
}

fn fetcher_seen(
    fetcher: &ProductFetcher<FakeBackend, RecordingUi, RecordingLoader>,
) -> Vec<QueryParams> {
    fetcher.backend().seen.lock().unwrap().clone()
}

#[tokio::test]
async fn application_failure_resets_state_and_toasts_once() {
    let (fetcher, loader) = fetcher(FakeBackend::default().respond(
        0,
        200,
        r#"{"success":false,"error":"index unavailable"}"#,
    ));

    let outcome = fetcher.fetch_products().await;
    assert!(matches!(
        outcome,
        FetchOutcome::Failed(FetchError::Application { .. })
    ));

    let state = fetcher.state().lock().await;
    assert!(state.products.is_empty());
    assert_eq!(state.pagination.total_products, 0);
    drop(state);

    let ui = fetcher.ui();
    assert_eq!(
        ui.toasts(),
        vec![(LOAD_FAILED_TEXT.to_string(), ToastKind::Error)]
    );
    assert_eq!(ui.renders(), vec![Vec::<String>::new()]);
    assert!(!ui.is_loading());
    assert!(loader.calls().is_empty());
}

#[tokio::test]
async fn http_error_behaves_like_application_failure() {
    let (fetcher, loader) = fetcher(FakeBackend::default().respond(0, 500, "Internal Server Error"));

    let outcome = fetcher.fetch_products().await;
    assert!(matches!(
        outcome,
        FetchOutcome::Failed(FetchError::Status { status: 500 })
    ));

    let state = fetcher.state().lock().await;
    assert!(state.products.is_empty());
    assert_eq!(state.pagination.total_products, 0);
    drop(state);

    assert_eq!(fetcher.ui().toasts().len(), 1);
    assert_eq!(fetcher.ui().renders().len(), 1);
    assert!(!fetcher.ui().is_loading());
    assert!(loader.calls().is_empty());
}

#[tokio::test]
async fn transport_failure_is_reported_the_same_way() {
    let (fetcher, _) = fetcher(FakeBackend::default().fail(FetchError::InvalidUrl {
        url: "http://".to_string(),
        message: "empty host".to_string(),
    }));

    assert!(!fetcher.fetch_products().await.is_loaded());
    assert_eq!(
        fetcher.ui().toasts(),
        vec![(LOAD_FAILED_TEXT.to_string(), ToastKind::Error)]
    );
    assert!(fetcher.state().lock().await.products.is_empty());
}

#[tokio::test]
async fn empty_result_skips_availability() {
    let (fetcher, loader) = fetcher(FakeBackend::default().respond(
        0,
        200,
        r#"{"success":true,"data":{"products":[],"total":0}}"#,
    ));

    assert!(matches!(
        fetcher.fetch_products().await,
        FetchOutcome::Loaded { count: 0, total: 0 }
    ));
    assert!(loader.calls().is_empty());
    assert_eq!(fetcher.ui().renders(), vec![Vec::<String>::new()]);
    assert_eq!(fetcher.ui().text("totalPages").as_deref(), Some("0"));
}

#[tokio::test(start_paused = true)]
async fn loading_indicator_is_shown_only_while_pending() {
    for body in [ONE_PRODUCT, r#"{"success":false}"#] {
        let (fetcher, _) = fetcher(FakeBackend::default().respond(100, 200, body));
        assert!(!fetcher.ui().is_loading());

        let midway = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            fetcher.ui().is_loading()
        };
        let (_, during) = tokio::join!(fetcher.fetch_products(), midway);

        assert!(during);
        assert!(!fetcher.ui().is_loading());
    }
}

#[tokio::test(start_paused = true)]
async fn stale_response_is_discarded() {
    let backend = FakeBackend::default()
        .respond(
            100,
            200,
            r#"{"success":true,"data":{"products":[{"product_id":1}],"total":1}}"#,
        )
        .respond(
            10,
            200,
            r#"{"success":true,"data":{"products":[{"product_id":2},{"product_id":3}],"total":2}}"#,
        );
    let (fetcher, loader) = fetcher(backend);

    let (first, second) = tokio::join!(fetcher.fetch_products(), fetcher.fetch_products());

    assert!(matches!(first, FetchOutcome::Stale));
    assert!(matches!(second, FetchOutcome::Loaded { count: 2, total: 2 }));
    let expected = vec![ProductId::Int(2), ProductId::Int(3)];
    assert_eq!(fetcher.state().lock().await.product_ids(), expected);
    assert_eq!(fetcher.ui().renders(), vec![vec!["2".to_string(), "3".to_string()]]);
    assert_eq!(loader.calls(), vec![expected]);
    assert!(!fetcher.ui().is_loading());
}

#[tokio::test(start_paused = true)]
async fn older_request_does_not_hide_newer_indicator() {
    let backend = FakeBackend::default()
        .respond(10, 200, ONE_PRODUCT)
        .respond(100, 200, ONE_PRODUCT);
    let (fetcher, _) = fetcher(backend);

    let midway = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        fetcher.ui().is_loading()
    };
    let (first, second, during) =
        tokio::join!(fetcher.fetch_products(), fetcher.fetch_products(), midway);

    assert!(matches!(first, FetchOutcome::Stale));
    assert!(second.is_loaded());
    assert!(during);
    assert!(!fetcher.ui().is_loading());
}

#[test]
fn pagination_info_fills_top_and_bottom_targets() {
    let ui = RecordingUi::default();
    let info = Pagination {
        current_page: 2,
        items_per_page: 20,
        total_products: 45,
    };
    pagination::update_pagination_info(&info, &ui);

    for id in pagination::CURRENT_PAGE_TARGETS {
        assert_eq!(ui.text(id).as_deref(), Some("2"));
    }
    for id in pagination::TOTAL_PAGES_TARGETS {
        assert_eq!(ui.text(id).as_deref(), Some("3"));
    }
    for id in pagination::TOTAL_PRODUCTS_TARGETS {
        assert_eq!(ui.text(id).as_deref(), Some("Найдено товаров: 45"));
    }
}
