//! The envelopes handed to `get()` and `create()`.
//!
//! Each envelope is one flat record listing every credential type it can ask for. Any number of
//! members may be present in a request envelope, a creation envelope is expected to carry exactly
//! one.

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::{
    abort::AbortSignal,
    utils::serde::ignore_unknown,
    webauthn::{PublicKeyCredentialCreationOptions, PublicKeyCredentialRequestOptions},
    CredentialType, FederatedCredentialInit, PasswordCredentialInit,
};


/// How much the user must be involved in a `get()` request.
///
/// <https://w3c.github.io/webappsec-credential-management/#mediation-requirements>
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum CredentialMediationRequirement {
    /// Never show any user interface. Resolve with nothing rather than asking.
    Silent,
    /// Hand over a credential without asking when silent access is allowed, ask otherwise.
    #[default]
    Optional,
    /// Always ask, even when a single credential could be handed over silently.
    Required,
}

/// The argument of `get()`.
///
/// <https://w3c.github.io/webappsec-credential-management/#dictdef-credentialrequestoptions>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequestOptions {
    /// The user mediation the request needs.
    #[serde(default, deserialize_with = "ignore_unknown")]
    pub mediation: CredentialMediationRequirement,

    /// Aborts the request when its controller aborts.
    #[serde(skip)]
    pub signal: Option<AbortSignal>,

    /// Whether password credentials are acceptable.
    #[serde(default, skip_serializing_if = "is_false")]
    pub password: bool,

    /// Which federated credentials are acceptable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub federated: Option<FederatedCredentialRequestOptions>,

    /// Ask for a WebAuthn assertion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKeyCredentialRequestOptions>,
}

impl CredentialRequestOptions {
    /// The credential types this request asks for.
    pub fn requested_types(&self) -> Vec<CredentialType> {
        let mut types = Vec::new();
        if self.password {
            types.push(CredentialType::Password);
        }
        if self.federated.is_some() {
            types.push(CredentialType::Federated);
        }
        if self.public_key.is_some() {
            types.push(CredentialType::PublicKey);
        }
        types
    }

    /// Observe `signal` for this request.
    pub fn with_signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Restricts the federated credentials a request accepts. Empty or absent lists accept any
/// provider and any protocol respectively.
///
/// <https://w3c.github.io/webappsec-credential-management/#dictdef-federatedcredentialrequestoptions>
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare]
pub struct FederatedCredentialRequestOptions {
    /// Acceptable identity provider origins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,

    /// Acceptable protocols.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<String>>,
}

impl FederatedCredentialRequestOptions {
    /// Whether a credential of `provider` speaking `protocol` is acceptable.
    pub fn accepts(&self, provider: &str, protocol: Option<&str>) -> bool {
        let provider_ok = match self.providers.as_deref() {
            None | Some([]) => true,
            Some(providers) => providers.iter().any(|p| p == provider),
        };
        let protocol_ok = match (self.protocols.as_deref(), protocol) {
            (None | Some([]), _) => true,
            (Some(protocols), Some(protocol)) => protocols.iter().any(|p| p == protocol),
            (Some(_), None) => false,
        };
        provider_ok && protocol_ok
    }
}

/// The argument of `create()`.
///
/// <https://w3c.github.io/webappsec-credential-management/#dictdef-credentialcreationoptions>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialCreationOptions {
    /// Aborts the request when its controller aborts.
    #[serde(skip)]
    pub signal: Option<AbortSignal>,

    /// Build a password credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<PasswordCredentialInit>,

    /// Build a federated credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub federated: Option<FederatedCredentialInit>,

    /// Register a WebAuthn credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKeyCredentialCreationOptions>,
}

impl CredentialCreationOptions {
    /// The credential types this request asks for.
    pub fn requested_types(&self) -> Vec<CredentialType> {
        let mut types = Vec::new();
        if self.password.is_some() {
            types.push(CredentialType::Password);
        }
        if self.federated.is_some() {
            types.push(CredentialType::Federated);
        }
        if self.public_key.is_some() {
            types.push(CredentialType::PublicKey);
        }
        types
    }

    /// Observe `signal` for this request.
    pub fn with_signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }
}

impl From<PublicKeyCredentialCreationOptions> for CredentialCreationOptions {
    fn from(value: PublicKeyCredentialCreationOptions) -> Self {
        Self {
            public_key: Some(value),
            ..Default::default()
        }
    }
}

impl From<PublicKeyCredentialRequestOptions> for CredentialRequestOptions {
    fn from(value: PublicKeyCredentialRequestOptions) -> Self {
        Self {
            public_key: Some(value),
            ..Default::default()
        }
    }
}
