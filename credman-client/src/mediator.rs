use credman_types::Credential;

/// The account chooser shown when `get()` needs the user to pick a password or federated
/// credential.
#[cfg_attr(any(test, feature = "testable"), mockall::automock)]
#[async_trait::async_trait]
pub trait CredentialMediator {
    /// Let the user pick one of `candidates` for `origin`. `None` means the chooser was dismissed.
    async fn choose_credential(
        &self,
        origin: &str,
        candidates: Vec<Credential>,
    ) -> Option<Credential>;
}

/// A mediator for contexts without any user interface: every prompt is dismissed, so only
/// silent access can hand out credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoUserInterface;

#[async_trait::async_trait]
impl CredentialMediator for NoUserInterface {
    async fn choose_credential(
        &self,
        origin: &str,
        candidates: Vec<Credential>,
    ) -> Option<Credential> {
        log::debug!(
            "dismissing account chooser for {origin} with {} candidates",
            candidates.len()
        );
        None
    }
}

#[cfg(any(test, feature = "testable"))]
impl MockCredentialMediator {
    /// A user picking the first candidate `times` times.
    pub fn picks_first(times: usize) -> Self {
        let mut mediator = MockCredentialMediator::new();
        mediator
            .expect_choose_credential()
            .returning(|_, candidates| candidates.into_iter().next())
            .times(times);
        mediator
    }

    /// A mediator that must never be asked.
    pub fn never_asked() -> Self {
        let mut mediator = MockCredentialMediator::new();
        mediator.expect_choose_credential().never();
        mediator
    }
}
