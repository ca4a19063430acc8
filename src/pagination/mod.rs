use crate::state::Pagination;
use crate::ui::RenderPort;

pub const CURRENT_PAGE_TARGETS: [&str; 2] = ["currentPage", "currentPageBottom"];
pub const TOTAL_PAGES_TARGETS: [&str; 2] = ["totalPages", "totalPagesBottom"];
pub const TOTAL_PRODUCTS_TARGETS: [&str; 2] = ["totalProductsText", "totalProductsTextBottom"];

pub fn total_pages(total_products: u64, items_per_page: u32) -> u64 {
    if items_per_page == 0 {
        return 0;
    }
    total_products.div_ceil(u64::from(items_per_page))
}

pub fn total_products_text(total_products: u64) -> String {
    format!("Найдено товаров: {total_products}")
}

pub fn is_known_target(target_id: &str) -> bool {
    CURRENT_PAGE_TARGETS
        .iter()
        .chain(TOTAL_PAGES_TARGETS.iter())
        .chain(TOTAL_PRODUCTS_TARGETS.iter())
        .any(|t| *t == target_id)
}

/// Writes current page, page count and the found-products line into both the
/// top and bottom pagination targets.
pub fn update_pagination_info<U: RenderPort + ?Sized>(pagination: &Pagination, ui: &U) {
    let current = pagination.page_or_default().to_string();
    let pages = pagination.total_pages().to_string();
    let found = total_products_text(pagination.total_products);

    for target in CURRENT_PAGE_TARGETS {
        ui.set_text(target, &current);
    }
    for target in TOTAL_PAGES_TARGETS {
        ui.set_text(target, &pages);
    }
    for target in TOTAL_PRODUCTS_TARGETS {
        ui.set_text(target, &found);
    }
}
