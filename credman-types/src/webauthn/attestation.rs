//! Types specific to public key credential creation

use coset::iana;
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::{
    utils::serde::{
        i64_to_iana, ignore_unknown, ignore_unknown_opt_vec, ignore_unknown_vec,
        maybe_stringified,
    },
    webauthn::{
        AuthenticationExtensionsClientInputs, AuthenticatorAttachment, AuthenticatorTransport,
        MalformedRequest, PublicKeyCredentialDescriptor, PublicKeyCredentialType,
        UserVerificationRequirement,
    },
    Bytes,
};

#[cfg(doc)]
use crate::webauthn::{AuthenticatorAssertionResponse, CollectedClientData};

/// The smallest and largest user handle accepted in [`PublicKeyCredentialUserEntity::id`].
const USER_HANDLE_LEN: std::ops::RangeInclusive<usize> = 1..=64;

/// The public key member of a creation envelope, describing the credential the relying party
/// wants to register.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialcreationoptions>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredentialCreationOptions {
    /// The name and identifier of the relying party responsible for the request.
    pub rp: PublicKeyCredentialRpEntity,

    /// The user account performing the registration. Its [`PublicKeyCredentialUserEntity::id`]
    /// is returned as [`AuthenticatorAssertionResponse::user_handle`] in later authentications.
    pub user: PublicKeyCredentialUserEntity,

    /// A challenge the authenticator signs along with other data when producing the attestation
    /// for the new credential.
    pub challenge: Bytes,

    /// The key types and signature algorithms the relying party supports, ordered from most
    /// preferred to least preferred. Entries with an unknown type or algorithm are dropped at
    /// deserialization. If none of the listed types can be created `create()` fails.
    #[serde(deserialize_with = "ignore_unknown_vec")]
    pub pub_key_cred_params: Vec<PublicKeyCredentialParameters>,

    /// How long, in milliseconds, the relying party is willing to wait for the call to complete.
    /// This is a hint and may be overridden by the client.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "maybe_stringified"
    )]
    pub timeout: Option<u32>,

    /// Existing credentials of this user account. The new credential must not be created on an
    /// authenticator that already holds one of them.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown_opt_vec"
    )]
    pub exclude_credentials: Option<Vec<PublicKeyCredentialDescriptor>>,

    /// Capabilities and settings the authenticator must or should satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_selection: Option<AuthenticatorSelectionCriteria>,

    /// Preference regarding attestation conveyance. Unknown values act as the default,
    /// [`AttestationConveyancePreference::None`].
    #[serde(default, deserialize_with = "ignore_unknown")]
    pub attestation: AttestationConveyancePreference,

    /// Client extension inputs requesting additional processing by the client and authenticator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<AuthenticationExtensionsClientInputs>,
}

impl PublicKeyCredentialCreationOptions {
    /// Check the members a creation ceremony cannot do without, reporting the first violation.
    pub fn validate(&self) -> Result<(), MalformedRequest> {
        if self.rp.name.is_empty() {
            return Err(MalformedRequest::MissingRpName);
        }
        if !USER_HANDLE_LEN.contains(&self.user.id.len()) {
            return Err(MalformedRequest::InvalidUserIdLength(self.user.id.len()));
        }
        if self.challenge.is_empty() {
            return Err(MalformedRequest::MissingChallenge);
        }
        if self.most_preferred_algorithm().is_none() {
            return Err(MalformedRequest::EmptyPubKeyCredParams);
        }
        Ok(())
    }

    /// The first `public-key` entry of [`Self::pub_key_cred_params`].
    pub fn most_preferred_algorithm(&self) -> Option<iana::Algorithm> {
        self.pub_key_cred_params
            .iter()
            .find(|p| p.ty == PublicKeyCredentialType::PublicKey)
            .map(|p| p.alg)
    }

    /// The effective user verification requirement of this request.
    pub fn user_verification(&self) -> UserVerificationRequirement {
        self.authenticator_selection
            .as_ref()
            .map(|s| s.user_verification)
            .unwrap_or_default()
    }
}

/// Relying party attributes supplied when creating a new credential.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialrpentity>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare]
pub struct PublicKeyCredentialRpEntity {
    /// The [RP ID]. When omitted it is the requesting origin's effective domain.
    ///
    /// [RP ID]: https://w3c.github.io/webauthn/#rp-id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// A human palatable name for the relying party, intended only for display.
    pub name: String,

    /// A URL to an image for the relying party. Removed in later levels of WebAuthn but still
    /// sent by some relying parties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// User account attributes supplied when creating a new credential.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialuserentity>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredentialUserEntity {
    /// The user handle: an opaque, non empty byte sequence of at most 64 bytes. It must not
    /// contain personally identifying information.
    pub id: Bytes,

    /// A human palatable identifier for the account, e.g. `alex.mueller@example.com`.
    pub name: String,

    /// A human palatable name for the account, e.g. `Alex Müller`.
    pub display_name: String,

    /// A URL to an image for the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A credential type and signature algorithm the relying party accepts.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialparameters>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare]
pub struct PublicKeyCredentialParameters {
    /// The type of credential to be created.
    #[serde(rename = "type", deserialize_with = "ignore_unknown")]
    pub ty: PublicKeyCredentialType,

    /// The COSE algorithm the new credential will be used with, and so the kind of key pair to
    /// generate.
    #[serde(with = "i64_to_iana")]
    #[typeshare(serialized_as = "I54")]
    pub alg: iana::Algorithm,
}

impl PublicKeyCredentialParameters {
    /// A `public-key` entry for `alg`.
    pub fn public_key(alg: iana::Algorithm) -> Self {
        Self {
            ty: PublicKeyCredentialType::PublicKey,
            alg,
        }
    }

    /// The algorithms every relying party is advised to accept:
    /// * [`iana::Algorithm::ES256`]
    /// * [`iana::Algorithm::RS256`]
    pub fn default_algorithms() -> Vec<Self> {
        vec![
            Self::public_key(iana::Algorithm::ES256),
            Self::public_key(iana::Algorithm::RS256),
        ]
    }
}

/// Requirements of the relying party regarding authenticator attributes.
///
/// <https://w3c.github.io/webauthn/#dictdef-authenticatorselectioncriteria>
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AuthenticatorSelectionCriteria {
    /// Only authenticators attached with this modality are eligible.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown"
    )]
    pub authenticator_attachment: Option<AuthenticatorAttachment>,

    /// Whether a client-side discoverable credential is required. Superseded by
    /// [`Self::resident_key`] when that member is set.
    #[serde(default)]
    pub require_resident_key: bool,

    /// The extent to which a client-side discoverable credential is wanted.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown"
    )]
    pub resident_key: Option<ResidentKeyRequirement>,

    /// Requirement regarding user verification for the creation ceremony.
    #[serde(default, deserialize_with = "ignore_unknown")]
    pub user_verification: UserVerificationRequirement,
}

impl AuthenticatorSelectionCriteria {
    /// Resolve [`Self::resident_key`] with the fallback on [`Self::require_resident_key`].
    pub fn resident_key_requirement(&self) -> ResidentKeyRequirement {
        match (self.resident_key, self.require_resident_key) {
            (Some(rk), _) => rk,
            (None, true) => ResidentKeyRequirement::Required,
            (None, false) => ResidentKeyRequirement::Discouraged,
        }
    }
}

/// The extent to which a client-side discoverable credential is wanted.
///
/// <https://w3c.github.io/webauthn/#enumdef-residentkeyrequirement>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum ResidentKeyRequirement {
    /// Prefer a server-side credential, accept a discoverable one.
    Discouraged,
    /// Prefer a discoverable credential, accept a server-side one.
    Preferred,
    /// A discoverable credential is required, fail otherwise.
    Required,
}

/// Preference of the relying party regarding attestation conveyance.
///
/// <https://w3c.github.io/webauthn/#enumdef-attestationconveyancepreference>
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum AttestationConveyancePreference {
    /// Not interested in attestation.
    #[default]
    None,
    /// Prefers a verifiable attestation statement but lets the client decide how to get it.
    Indirect,
    /// Wants the attestation statement as generated by the authenticator.
    Direct,
}

/// The authenticator's response to a `create()` request.
///
/// <https://w3c.github.io/webauthn/#iface-authenticatorattestationresponse>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AuthenticatorAttestationResponse {
    /// The JSON serialization of the [`CollectedClientData`] passed to the authenticator.
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: Bytes,

    /// The CBOR attestation object: authenticator data and an attestation statement. Opaque to
    /// this crate.
    pub attestation_object: Bytes,

    /// The transports the authenticator is believed to support, in lexicographical order.
    #[serde(default, deserialize_with = "ignore_unknown_vec")]
    pub transports: Vec<AuthenticatorTransport>,

    /// The authenticator data contained in [`Self::attestation_object`], for relying parties
    /// that do not want to parse CBOR.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_data: Option<Bytes>,

    /// The DER `SubjectPublicKeyInfo` of the new credential, when the algorithm has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<Bytes>,

    /// The COSE algorithm identifier of the new credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[typeshare(serialized_as = "Option<I54>")]
    pub public_key_algorithm: Option<i64>,
}

impl AuthenticatorAttestationResponse {
    /// The transports the authenticator is believed to support.
    pub fn get_transports(&self) -> &[AuthenticatorTransport] {
        &self.transports
    }
}
