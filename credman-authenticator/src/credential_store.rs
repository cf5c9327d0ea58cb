#[cfg(any(feature = "tokio", test))]
use std::sync::Arc;

use coset::CoseKey;
use credman_types::{
    webauthn::{
        PublicKeyCredentialDescriptor, PublicKeyCredentialRpEntity, PublicKeyCredentialUserEntity,
    },
    Bytes,
};

use crate::AuthenticatorError;

/// The authenticator side record of a public key credential.
///
/// <https://w3c.github.io/webauthn/#public-key-credential-source>
#[derive(Debug, Clone, PartialEq)]
pub struct PublicKeyCredentialSource {
    /// The credential ID handed to the relying party.
    pub credential_id: Bytes,

    /// The private key, in COSE format.
    pub key: CoseKey,

    /// The RP ID the credential is scoped to.
    pub rp_id: String,

    /// The user handle of the account the credential was created for.
    pub user_handle: Option<Bytes>,

    /// The account name, for account choosers.
    pub username: Option<String>,

    /// The account display name, for account choosers.
    pub user_display_name: Option<String>,

    /// Signature counter, `None` for credentials created without one.
    pub counter: Option<u32>,

    /// Whether the credential can be used without the relying party naming it in an allow list.
    pub discoverable: bool,
}

impl PublicKeyCredentialSource {
    /// Whether `descriptors` names this credential.
    pub fn is_listed_in(&self, descriptors: &[PublicKeyCredentialDescriptor]) -> bool {
        descriptors
            .iter()
            .any(|d| d.is_known() && d.id == self.credential_id)
    }
}

/// Storage of [`PublicKeyCredentialSource`]s.
#[async_trait::async_trait]
pub trait CredentialStore {
    /// Find the credentials of `rp_id`. With an allow list only the listed credentials qualify,
    /// without one only discoverable credentials do.
    ///
    /// The first credential returned is the one used for an assertion.
    async fn find_credentials(
        &self,
        ids: Option<&[PublicKeyCredentialDescriptor]>,
        rp_id: &str,
    ) -> Result<Vec<PublicKeyCredentialSource>, AuthenticatorError>;

    /// Save a new credential.
    async fn save_credential(
        &mut self,
        cred: PublicKeyCredentialSource,
        user: PublicKeyCredentialUserEntity,
        rp: PublicKeyCredentialRpEntity,
    ) -> Result<(), AuthenticatorError>;

    /// Replace a credential after use, e.g. with its incremented counter.
    async fn update_credential(
        &mut self,
        cred: PublicKeyCredentialSource,
    ) -> Result<(), AuthenticatorError>;
}

fn matches(
    cred: &PublicKeyCredentialSource,
    ids: Option<&[PublicKeyCredentialDescriptor]>,
    rp_id: &str,
) -> bool {
    cred.rp_id == rp_id
        && match ids {
            Some(ids) => cred.is_listed_in(ids),
            None => cred.discoverable,
        }
}

/// In-memory store keyed by credential ID.
///
/// Useful for tests.
pub type MemoryStore = std::collections::HashMap<Vec<u8>, PublicKeyCredentialSource>;

#[async_trait::async_trait]
impl CredentialStore for MemoryStore {
    async fn find_credentials(
        &self,
        ids: Option<&[PublicKeyCredentialDescriptor]>,
        rp_id: &str,
    ) -> Result<Vec<PublicKeyCredentialSource>, AuthenticatorError> {
        Ok(self
            .values()
            .filter(|cred| matches(cred, ids, rp_id))
            .cloned()
            .collect())
    }

    async fn save_credential(
        &mut self,
        cred: PublicKeyCredentialSource,
        user: PublicKeyCredentialUserEntity,
        _rp: PublicKeyCredentialRpEntity,
    ) -> Result<(), AuthenticatorError> {
        // a new discoverable credential replaces the older ones of the same account
        if cred.discoverable {
            self.retain(|_, old| {
                !(old.discoverable
                    && old.rp_id == cred.rp_id
                    && old.user_handle.as_ref() == Some(&user.id))
            });
        }
        self.insert(cred.credential_id.to_vec(), cred);
        Ok(())
    }

    async fn update_credential(
        &mut self,
        cred: PublicKeyCredentialSource,
    ) -> Result<(), AuthenticatorError> {
        self.insert(cred.credential_id.to_vec(), cred);
        Ok(())
    }
}

/// A store holding at most one credential.
#[async_trait::async_trait]
impl CredentialStore for Option<PublicKeyCredentialSource> {
    async fn find_credentials(
        &self,
        ids: Option<&[PublicKeyCredentialDescriptor]>,
        rp_id: &str,
    ) -> Result<Vec<PublicKeyCredentialSource>, AuthenticatorError> {
        Ok(self
            .iter()
            .filter(|cred| matches(cred, ids, rp_id))
            .cloned()
            .collect())
    }

    async fn save_credential(
        &mut self,
        cred: PublicKeyCredentialSource,
        _user: PublicKeyCredentialUserEntity,
        _rp: PublicKeyCredentialRpEntity,
    ) -> Result<(), AuthenticatorError> {
        self.replace(cred);
        Ok(())
    }

    async fn update_credential(
        &mut self,
        cred: PublicKeyCredentialSource,
    ) -> Result<(), AuthenticatorError> {
        self.replace(cred);
        Ok(())
    }
}

#[cfg(any(feature = "tokio", test))]
#[async_trait::async_trait]
impl<S: CredentialStore + Send + Sync> CredentialStore for Arc<tokio::sync::Mutex<S>> {
    async fn find_credentials(
        &self,
        ids: Option<&[PublicKeyCredentialDescriptor]>,
        rp_id: &str,
    ) -> Result<Vec<PublicKeyCredentialSource>, AuthenticatorError> {
        self.lock().await.find_credentials(ids, rp_id).await
    }

    async fn save_credential(
        &mut self,
        cred: PublicKeyCredentialSource,
        user: PublicKeyCredentialUserEntity,
        rp: PublicKeyCredentialRpEntity,
    ) -> Result<(), AuthenticatorError> {
        self.lock().await.save_credential(cred, user, rp).await
    }

    async fn update_credential(
        &mut self,
        cred: PublicKeyCredentialSource,
    ) -> Result<(), AuthenticatorError> {
        self.lock().await.update_credential(cred).await
    }
}
