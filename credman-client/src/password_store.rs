use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use credman_types::Credential;

use crate::CredentialError;


/// Storage of the password and federated credentials of each origin, and of the origins that
/// prevented silent access.
#[async_trait::async_trait]
pub trait PasswordStore {
    /// The credentials stored for `origin`.
    async fn find_credentials(&self, origin: &str) -> Result<Vec<Credential>, CredentialError>;

    /// Store `credential` for `origin`, replacing a credential with the same identity.
    async fn save_credential(
        &mut self,
        origin: &str,
        credential: Credential,
    ) -> Result<(), CredentialError>;

    /// Whether `origin` prevented silent access.
    async fn prevents_silent_access(&self, origin: &str) -> Result<bool, CredentialError>;

    /// Set or clear the prevent silent access flag of `origin`.
    async fn set_prevent_silent_access(
        &mut self,
        origin: &str,
        prevent: bool,
    ) -> Result<(), CredentialError>;
}

/// Two credentials of an origin are the same account when they share their type and id, and
/// for federated credentials their provider.
fn same_account(a: &Credential, b: &Credential) -> bool {
    match (a, b) {
        (Credential::Password(a), Credential::Password(b)) => a.id == b.id,
        (Credential::Federated(a), Credential::Federated(b)) => {
            a.id == b.id && a.provider == b.provider
        }
        _ => false,
    }
}

/// In-memory password store.
///
/// Useful for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryPasswordStore {
    credentials: HashMap<String, Vec<Credential>>,
    silent_access_prevented: HashSet<String>,
}

impl MemoryPasswordStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of credentials stored across all origins.
    pub fn len(&self) -> usize {
        self.credentials.values().map(Vec::len).sum()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl PasswordStore for MemoryPasswordStore {
    async fn find_credentials(&self, origin: &str) -> Result<Vec<Credential>, CredentialError> {
        Ok(self.credentials.get(origin).cloned().unwrap_or_default())
    }

    async fn save_credential(
        &mut self,
        origin: &str,
        credential: Credential,
    ) -> Result<(), CredentialError> {
        let stored = self.credentials.entry(origin.to_owned()).or_default();
        match stored.iter_mut().find(|old| same_account(old, &credential)) {
            Some(old) => *old = credential,
            None => stored.push(credential),
        }
        Ok(())
    }

    async fn prevents_silent_access(&self, origin: &str) -> Result<bool, CredentialError> {
        Ok(self.silent_access_prevented.contains(origin))
    }

    async fn set_prevent_silent_access(
        &mut self,
        origin: &str,
        prevent: bool,
    ) -> Result<(), CredentialError> {
        if prevent {
            self.silent_access_prevented.insert(origin.to_owned());
        } else {
            self.silent_access_prevented.remove(origin);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<P: PasswordStore + Send + Sync> PasswordStore for Arc<tokio::sync::Mutex<P>> {
    async fn find_credentials(&self, origin: &str) -> Result<Vec<Credential>, CredentialError> {
        self.lock().await.find_credentials(origin).await
    }

    async fn save_credential(
        &mut self,
        origin: &str,
        credential: Credential,
    ) -> Result<(), CredentialError> {
        self.lock().await.save_credential(origin, credential).await
    }

    async fn prevents_silent_access(&self, origin: &str) -> Result<bool, CredentialError> {
        self.lock().await.prevents_silent_access(origin).await
    }

    async fn set_prevent_silent_access(
        &mut self,
        origin: &str,
        prevent: bool,
    ) -> Result<(), CredentialError> {
        self.lock().await.set_prevent_silent_access(origin, prevent).await
    }
}
