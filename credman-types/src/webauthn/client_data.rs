//! The client data both ceremonies sign over.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use typeshare::typeshare;

use crate::{encoding, Bytes};

/// The contextual bindings of the relying party and the client, hashed by the authenticator into
/// every attestation and assertion.
///
/// Serialization follows the [JSON byte serialization] of WebAuthn: `type`, `challenge`, `origin`
/// and `crossOrigin` are always present and come first, in that order. Unknown keys are kept in an
/// [`IndexMap`] so a parsed value serializes back in the order it was signed in.
///
/// <https://w3c.github.io/webauthn/#dictionary-client-data>
///
/// [JSON byte serialization]: https://w3c.github.io/webauthn/#clientdatajson-serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedClientData {
    /// Which ceremony produced this client data.
    #[serde(rename = "type")]
    pub ty: ClientDataType,

    /// The base64url encoding of the challenge provided by the relying party.
    pub challenge: String,

    /// The fully qualified origin of the requester, as in [RFC6454].
    ///
    /// [RFC6454]: https://www.rfc-editor.org/rfc/rfc6454
    pub origin: String,

    /// Whether the request came from a context that is not same-origin with its ancestors.
    #[serde(default, serialize_with = "truthiness")]
    pub cross_origin: Option<bool>,

    /// The state of the Token Binding protocol with the relying party.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_binding: Option<TokenBinding>,

    /// Keys this crate does not know about, in their original order.
    #[serde(flatten)]
    pub unknown_keys: IndexMap<String, serde_json::Value>,
}

impl CollectedClientData {
    /// Client data for `ty` over `challenge` requested from `origin`.
    pub fn new(ty: ClientDataType, challenge: &[u8], origin: impl Into<String>) -> Self {
        Self {
            ty,
            challenge: encoding::base64url(challenge),
            origin: origin.into(),
            cross_origin: None,
            token_binding: None,
            unknown_keys: IndexMap::new(),
        }
    }

    /// Decode [`Self::challenge`] back into the bytes the relying party sent.
    pub fn challenge_bytes(&self) -> Option<Bytes> {
        encoding::try_from_base64url(&self.challenge).map(Bytes::from)
    }
}

fn truthiness<S>(cross_origin: &Option<bool>, ser: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    ser.serialize_bool(cross_origin.unwrap_or_default())
}

/// The value of [`CollectedClientData::ty`].
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[typeshare]
pub enum ClientDataType {
    /// `"webauthn.create"`
    #[serde(rename = "webauthn.create")]
    Create,

    /// `"webauthn.get"`
    #[serde(rename = "webauthn.get")]
    Get,
}

impl fmt::Display for ClientDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClientDataType::Create => "webauthn.create",
            ClientDataType::Get => "webauthn.get",
        })
    }
}

/// Token Binding state of the connection to the relying party.
///
/// <https://www.w3.org/TR/webauthn-1/#dictdef-tokenbinding>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare]
pub struct TokenBinding {
    /// Whether Token Binding was negotiated.
    pub status: TokenBindingStatus,

    /// The base64url encoding of the Token Binding ID, required when `status` is
    /// [`TokenBindingStatus::Present`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// <https://www.w3.org/TR/webauthn-1/#enumdef-tokenbindingstatus>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum TokenBindingStatus {
    /// Token Binding was used when communicating with the relying party.
    Present,
    /// The client supports Token Binding but it was not negotiated.
    Supported,
}
