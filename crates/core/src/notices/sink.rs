//! Notice sink trait and implementations.

use std::sync::{Arc, Mutex};

use super::Notice;

/// Trait for receiving notices.
///
/// - `emit()` must be fast and non-blocking
/// - Failure to display a notice must not affect the operation that raised it
pub trait NoticeSink: Send + Sync {
    fn emit(&self, notice: Notice);
}

/// No-op implementation for contexts without a UI.
#[derive(Clone, Default)]
pub struct NoOpNoticeSink;

impl NoticeSink for NoOpNoticeSink {
    fn emit(&self, _notice: Notice) {}
}

/// Sink that forwards notices to the `log` facade.
#[derive(Clone, Default)]
pub struct LogNoticeSink;

impl NoticeSink for LogNoticeSink {
    fn emit(&self, notice: Notice) {
        match notice {
            Notice::Error { message } => log::warn!("notice: {}", message),
            Notice::Success { message } | Notice::Info { message } => {
                log::info!("notice: {}", message)
            }
            Notice::Celebration => log::info!("notice: celebration"),
        }
    }
}

/// Mock sink for testing - collects emitted notices.
#[derive(Clone, Default)]
pub struct MockNoticeSink {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MockNoticeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected notices.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Error { message } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.notices.lock().map(|n| n.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NoticeSink for MockNoticeSink {
    fn emit(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
