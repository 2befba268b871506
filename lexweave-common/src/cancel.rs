use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable cancellation flag shared between the lexer and the parser.
///
/// Cancellation is cooperative: the drivers check the token between state
/// invocations and wind down when it has fired. A child token created with
/// [`CancelToken::child`] also observes its parent, so the coordinator can
/// cancel its own work without touching the caller's token.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    canceled: AtomicBool,
    parent: Option<CancelToken>,
}

impl CancelToken {
    /// Creates a fresh, uncanceled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that reports canceled when either it or `self` has
    /// been canceled. Canceling the child does not affect the parent.
    pub fn child(&self) -> CancelToken {
        CancelToken {
            inner: Arc::new(Inner {
                canceled: AtomicBool::new(false),
                parent: Some(self.clone()),
            }),
        }
    }

    /// Signals cancellation to every holder of this token and its children.
    pub fn cancel(&self) {
        self.inner.canceled.store(true, Ordering::Release);
    }

    /// Returns true once this token or any ancestor has been canceled.
    pub fn is_canceled(&self) -> bool {
        if self.inner.canceled.load(Ordering::Acquire) {
            return true;
        }
        match &self.inner.parent {
            Some(parent) => parent.is_canceled(),
            None => false,
        }
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("canceled", &self.is_canceled())
            .finish()
    }
}
