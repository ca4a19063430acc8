pub mod terminal;
pub mod toast;

use crate::state::Product;

pub use terminal::TerminalUi;
pub use toast::{Toast, ToastStack, TOAST_TTL};

pub const LOADING_TEXT: &str = "Загрузка...";
pub const LOAD_FAILED_TEXT: &str = "Ошибка загрузки товаров";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Success => "toast-success",
            Self::Error => "toast-error",
        }
    }
}

/// Everything the product page draws, so fetch logic never touches a display directly.
///
/// Implementations use interior mutability; all methods take `&self`.
pub trait RenderPort: Send + Sync {
    fn show_toast(&self, message: &str, kind: ToastKind);

    /// Shows the loading indicator unless one is already visible.
    fn show_loading(&self);

    /// Removes the loading indicator if present.
    fn hide_loading(&self);

    fn is_loading(&self) -> bool;

    /// Writes `text` into the target named `target_id`. Unknown targets are ignored.
    fn set_text(&self, target_id: &str, text: &str);

    fn render_products(&self, products: &[Product]);
}
