use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

const DEFAULT_BENIGN_FRAGMENTS: [&str; 1] = ["removeChild"];
const FALLBACK_MESSAGE: &str = "Something went wrong. Reload to continue.";

/// What the user sees when a screen fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub message: String,
    pub detail: String,
    pub reload: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryOutcome<T> {
    Rendered(T),
    /// A known teardown race; nothing to show.
    Suppressed,
    Fallback(Fallback),
}

/// Isolates a screen so a panic never takes the whole client down.
#[derive(Debug, Clone)]
pub struct ErrorBoundary {
    benign_fragments: Vec<String>,
}

impl Default for ErrorBoundary {
    fn default() -> Self {
        Self {
            benign_fragments: DEFAULT_BENIGN_FRAGMENTS
                .iter()
                .map(|fragment| fragment.to_string())
                .collect(),
        }
    }
}

impl ErrorBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_benign_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.benign_fragments.push(fragment.into());
        self
    }

    pub fn run<T>(&self, screen: impl FnOnce() -> T) -> BoundaryOutcome<T> {
        match catch_unwind(AssertUnwindSafe(screen)) {
            Ok(rendered) => BoundaryOutcome::Rendered(rendered),
            Err(payload) => {
                let detail = panic_message(payload.as_ref());
                if self.is_benign(&detail) {
                    tracing::debug!(%detail, "Suppressed benign teardown failure");
                    return BoundaryOutcome::Suppressed;
                }
                tracing::error!(%detail, "Screen failed");
                BoundaryOutcome::Fallback(Fallback {
                    message: FALLBACK_MESSAGE.to_string(),
                    detail,
                    reload: true,
                })
            }
        }
    }

    fn is_benign(&self, detail: &str) -> bool {
        self.benign_fragments
            .iter()
            .any(|fragment| detail.contains(fragment.as_str()))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown failure".to_string()
    }
}
