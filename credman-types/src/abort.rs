//! Cooperative cancellation of pending container operations.

use tokio_util::sync::CancellationToken;

/// Owns the right to abort the operations observing its [`AbortSignal`]s.
///
/// <https://dom.spec.whatwg.org/#interface-abortcontroller>
#[derive(Debug, Clone, Default)]
pub struct AbortController {
    token: CancellationToken,
}

impl AbortController {
    /// A controller whose signal is not aborted yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A signal tied to this controller, cheap to clone and hand out.
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            token: self.token.clone(),
        }
    }

    /// Abort every operation observing this controller's signals. Idempotent.
    pub fn abort(&self) {
        self.token.cancel();
    }
}

/// The observing half of an [`AbortController`].
///
/// <https://dom.spec.whatwg.org/#interface-AbortSignal>
#[derive(Debug, Clone)]
pub struct AbortSignal {
    token: CancellationToken,
}

impl AbortSignal {
    /// A signal that is already aborted.
    pub fn aborted_signal() -> Self {
        let token = CancellationToken::new();
        token.cancel();
        Self { token }
    }

    /// Whether the controller has aborted.
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolve once the controller aborts.
    pub async fn aborted(&self) {
        self.token.cancelled().await
    }
}
