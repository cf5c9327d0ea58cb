//! Types used for public key authentication

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::{
    utils::serde::{ignore_unknown, ignore_unknown_opt_vec, maybe_stringified},
    webauthn::{
        AuthenticationExtensionsClientInputs, MalformedRequest, PublicKeyCredentialDescriptor,
        UserVerificationRequirement,
    },
    Bytes,
};

#[cfg(doc)]
use crate::webauthn::{CollectedClientData, PublicKeyCredentialUserEntity};

/// The public key member of a request envelope. Only the challenge is required.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialrequestoptions>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredentialRequestOptions {
    /// A challenge the authenticator signs, along with other data, when producing the assertion.
    pub challenge: Bytes,

    /// How long, in milliseconds, the relying party is willing to wait. A hint the client may
    /// override.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "maybe_stringified"
    )]
    pub timeout: Option<u32>,

    /// The RP ID claimed by the relying party. The client verifies the caller's origin is within
    /// its scope. When omitted it is the origin's effective domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rp_id: Option<String>,

    /// Credentials acceptable to the relying party, in descending order of preference. When
    /// absent any discoverable credential of the RP ID may be used.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown_opt_vec"
    )]
    pub allow_credentials: Option<Vec<PublicKeyCredentialDescriptor>>,

    /// Requirement regarding user verification for this ceremony.
    #[serde(default, deserialize_with = "ignore_unknown")]
    pub user_verification: UserVerificationRequirement,

    /// Client extension inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<AuthenticationExtensionsClientInputs>,
}

impl PublicKeyCredentialRequestOptions {
    /// Build a request with only a challenge.
    pub fn new(challenge: impl Into<Bytes>) -> Self {
        Self {
            challenge: challenge.into(),
            timeout: None,
            rp_id: None,
            allow_credentials: None,
            user_verification: UserVerificationRequirement::default(),
            extensions: None,
        }
    }

    /// Check the members an authentication ceremony cannot do without.
    pub fn validate(&self) -> Result<(), MalformedRequest> {
        if self.challenge.is_empty() {
            return Err(MalformedRequest::MissingChallenge);
        }
        Ok(())
    }
}

/// The authenticator's response to a `get()` request: a signature proving possession of the
/// credential private key over the authenticator data and the client data hash.
///
/// <https://w3c.github.io/webauthn/#iface-authenticatorassertionresponse>
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AuthenticatorAssertionResponse {
    /// The JSON serialization of the [`CollectedClientData`] the signature covers. The exact bytes
    /// must be preserved.
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: Bytes,

    /// The authenticator data returned by the authenticator.
    pub authenticator_data: Bytes,

    /// The raw signature returned by the authenticator.
    pub signature: Bytes,

    /// Mirrors [`PublicKeyCredentialUserEntity::id`], when the authenticator returned it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<Bytes>,
}
