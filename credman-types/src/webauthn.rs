//! Types of the public key (WebAuthn) half of the model.
//!
//! <https://w3c.github.io/webauthn>

use std::fmt;

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::{encoding, utils::serde::ignore_unknown, Bytes, CredentialInitError};

mod assertion;
mod attestation;
mod client_data;
mod common;
mod extensions;


// re-export types
pub use self::{assertion::*, attestation::*, client_data::*, common::*, extensions::*};

/// The result of a successful registration or authentication ceremony.
///
/// This is the `public-key` variant of [`Credential`](crate::Credential). Its `type` tag is written
/// by the enclosing [`Credential`](crate::Credential) so it is not a member here, see
/// [`PublicKeyCredential::ty`].
///
/// <https://w3c.github.io/webauthn/#iface-pkcredential>
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredential {
    /// The base64url encoding of [`Self::raw_id`].
    pub id: String,

    /// The credential ID chosen by the authenticator. It is expected to be globally unique with
    /// high probability across all credentials of the same type across all authenticators.
    pub raw_id: Bytes,

    /// The authenticator's response: an attestation for `create()`, an assertion for `get()`.
    pub response: AuthenticatorResponse,

    /// The modality of the communication between the client and authenticator.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown"
    )]
    pub authenticator_attachment: Option<AuthenticatorAttachment>,

    /// Extension identifier to client extension output entries.
    #[serde(default)]
    pub client_extension_results: AuthenticationExtensionsClientOutputs,
}

impl PublicKeyCredential {
    /// Build a credential whose [`Self::id`] is derived from `raw_id`.
    pub fn new(raw_id: impl Into<Bytes>, response: AuthenticatorResponse) -> Self {
        let raw_id = raw_id.into();
        Self {
            id: encoding::base64url(&raw_id),
            raw_id,
            response,
            authenticator_attachment: None,
            client_extension_results: Default::default(),
        }
    }

    /// Always [`PublicKeyCredentialType::PublicKey`].
    pub fn ty(&self) -> PublicKeyCredentialType {
        PublicKeyCredentialType::PublicKey
    }

    /// The outputs of the client extension processing for this credential.
    pub fn get_client_extension_results(&self) -> &AuthenticationExtensionsClientOutputs {
        &self.client_extension_results
    }
}

/// The two responses an authenticator can produce.
///
/// Both carry the serialized [`CollectedClientData`] the authenticator signed over. The variants
/// have disjoint required members (`attestationObject` vs `signature`) which is how they are told
/// apart on the wire.
///
/// <https://w3c.github.io/webauthn/#iface-authenticatorresponse>
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AuthenticatorResponse {
    /// Produced by a registration ceremony.
    Attestation(AuthenticatorAttestationResponse),
    /// Produced by an authentication ceremony.
    Assertion(AuthenticatorAssertionResponse),
}

impl AuthenticatorResponse {
    /// The exact JSON serialization of the [`CollectedClientData`] of this ceremony.
    pub fn client_data_json(&self) -> &Bytes {
        match self {
            AuthenticatorResponse::Attestation(att) => &att.client_data_json,
            AuthenticatorResponse::Assertion(ass) => &ass.client_data_json,
        }
    }

    /// Parse the client data of this response.
    pub fn client_data(&self) -> serde_json::Result<CollectedClientData> {
        serde_json::from_slice(self.client_data_json())
    }

    /// Get the attestation response if this came from a registration ceremony.
    pub fn as_attestation(&self) -> Option<&AuthenticatorAttestationResponse> {
        match self {
            AuthenticatorResponse::Attestation(att) => Some(att),
            AuthenticatorResponse::Assertion(_) => None,
        }
    }

    /// Get the assertion response if this came from an authentication ceremony.
    pub fn as_assertion(&self) -> Option<&AuthenticatorAssertionResponse> {
        match self {
            AuthenticatorResponse::Attestation(_) => None,
            AuthenticatorResponse::Assertion(ass) => Some(ass),
        }
    }
}

impl From<AuthenticatorAttestationResponse> for AuthenticatorResponse {
    fn from(value: AuthenticatorAttestationResponse) -> Self {
        AuthenticatorResponse::Attestation(value)
    }
}

impl From<AuthenticatorAssertionResponse> for AuthenticatorResponse {
    fn from(value: AuthenticatorAssertionResponse) -> Self {
        AuthenticatorResponse::Assertion(value)
    }
}

/// A required member of a request envelope is missing or unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content")]
#[typeshare]
pub enum MalformedRequest {
    /// The challenge is empty.
    MissingChallenge,
    /// No entry of `pubKeyCredParams` names a known credential type and registered algorithm.
    EmptyPubKeyCredParams,
    /// The user handle must be between 1 and 64 bytes, this holds the offending length.
    InvalidUserIdLength(usize),
    /// The relying party name is empty.
    MissingRpName,
    /// The data of a password or federated credential is incomplete.
    CredentialData(CredentialInitError),
}

impl fmt::Display for MalformedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedRequest::MissingChallenge => f.write_str("the challenge is empty"),
            MalformedRequest::EmptyPubKeyCredParams => {
                f.write_str("pubKeyCredParams contains no usable algorithm")
            }
            MalformedRequest::InvalidUserIdLength(len) => {
                write!(f, "user.id must be 1 to 64 bytes long, got {len}")
            }
            MalformedRequest::MissingRpName => f.write_str("rp.name is empty"),
            MalformedRequest::CredentialData(err) => write!(f, "invalid credential data: {err}"),
        }
    }
}

impl std::error::Error for MalformedRequest {}

impl From<CredentialInitError> for MalformedRequest {
    fn from(value: CredentialInitError) -> Self {
        MalformedRequest::CredentialData(value)
    }
}
