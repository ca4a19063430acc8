use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::{RenderPort, ToastKind, ToastStack, LOADING_TEXT};
use crate::output::{self, OutputFormat};
use crate::pagination;
use crate::state::Product;

/// Draws the product page on a terminal: spinner on stderr, table on stdout.
pub struct TerminalUi {
    spinner: Mutex<Option<ProgressBar>>,
    toasts: ToastStack,
    texts: Mutex<BTreeMap<String, String>>,
    format: OutputFormat,
    no_color: bool,
    hidden: bool,
}

impl TerminalUi {
    pub fn new(format: OutputFormat, no_color: bool) -> Self {
        Self {
            spinner: Mutex::new(None),
            toasts: ToastStack::default(),
            texts: Mutex::new(BTreeMap::new()),
            format,
            no_color,
            hidden: false,
        }
    }

    /// A UI that draws nothing, for non-interactive runs.
    pub fn hidden(format: OutputFormat) -> Self {
        Self {
            hidden: true,
            ..Self::new(format, true)
        }
    }

    pub fn toasts(&self) -> &ToastStack {
        &self.toasts
    }

    pub fn text(&self, target_id: &str) -> Option<String> {
        self.texts
            .lock()
            .ok()
            .and_then(|texts| texts.get(target_id).cloned())
    }

    /// One-line summary built from the top pagination targets.
    pub fn pagination_line(&self) -> Option<String> {
        let current = self.text(pagination::CURRENT_PAGE_TARGETS[0])?;
        let total = self.text(pagination::TOTAL_PAGES_TARGETS[0])?;
        let found = self.text(pagination::TOTAL_PRODUCTS_TARGETS[0])?;
        Some(format!("Страница {current} из {total} :: {found}"))
    }

    fn print_line(&self, line: String) {
        match self.spinner.lock() {
            Ok(guard) if guard.is_some() => {
                if let Some(pb) = guard.as_ref() {
                    pb.println(line);
                }
            }
            _ => eprintln!("{line}"),
        }
    }

    fn new_spinner(&self) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if self.hidden {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        } else {
            pb.set_draw_target(ProgressDrawTarget::stderr());
        }
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(LOADING_TEXT);
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

impl RenderPort for TerminalUi {
    fn show_toast(&self, message: &str, kind: ToastKind) {
        let toast = self.toasts.push(message, kind);
        log::debug!("toast #{} ({}) {}", toast.id, kind.class_name(), message);
        if self.hidden {
            return;
        }
        let marker = match (kind, self.no_color) {
            (ToastKind::Success, false) => "OK".bold().green().to_string(),
            (ToastKind::Error, false) => "ERR".bold().red().to_string(),
            (ToastKind::Success, true) => "OK".to_string(),
            (ToastKind::Error, true) => "ERR".to_string(),
        };
        self.print_line(format!("[{marker}] {message}"));
    }

    fn show_loading(&self) {
        if let Ok(mut guard) = self.spinner.lock() {
            if guard.is_none() {
                *guard = Some(self.new_spinner());
            }
        }
    }

    fn hide_loading(&self) {
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn is_loading(&self) -> bool {
        self.spinner
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    fn set_text(&self, target_id: &str, text: &str) {
        if !pagination::is_known_target(target_id) {
            return;
        }
        if let Ok(mut texts) = self.texts.lock() {
            texts.insert(target_id.to_string(), text.to_string());
        }
    }

    fn render_products(&self, products: &[Product]) {
        if self.hidden {
            return;
        }
        let rendered = output::render(products, self.format);
        print!("{rendered}");
        if !rendered.ends_with('\n') {
            println!();
        }
    }
}
