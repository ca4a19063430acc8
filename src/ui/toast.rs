use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::ToastKind;

pub const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
}

/// Toasts currently on screen. Each one removes itself after its TTL; pushes stack.
#[derive(Clone, Debug)]
pub struct ToastStack {
    active: Arc<Mutex<Vec<Toast>>>,
    next_id: Arc<AtomicU64>,
    ttl: Duration,
}

impl Default for ToastStack {
    fn default() -> Self {
        Self::with_ttl(TOAST_TTL)
    }
}

impl ToastStack {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            active: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            ttl,
        }
    }

    /// Adds a toast and schedules its removal. Outside a tokio runtime the toast
    /// stays until [`ToastStack::dismiss`] is called.
    pub fn push(&self, message: &str, kind: ToastKind) -> Toast {
        let toast = Toast {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            message: message.to_string(),
            kind,
        };
        if let Ok(mut active) = self.active.lock() {
            active.push(toast.clone());
        }

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let stack = self.clone();
            let id = toast.id;
            handle.spawn(async move {
                tokio::time::sleep(stack.ttl).await;
                stack.dismiss(id);
            });
        }

        toast
    }

    pub fn dismiss(&self, id: u64) {
        if let Ok(mut active) = self.active.lock() {
            active.retain(|t| t.id != id);
        }
    }

    pub fn active(&self) -> Vec<Toast> {
        self.active
            .lock()
            .map(|active| active.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.active.lock().map(|active| active.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
