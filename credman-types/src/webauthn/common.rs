//! Vocabularies and descriptors shared by registration and authentication.

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::{
    utils::serde::{ignore_unknown, ignore_unknown_opt_vec},
    Bytes,
};

#[cfg(doc)]
use crate::webauthn::{
    AuthenticatorAttestationResponse, PublicKeyCredential, PublicKeyCredentialCreationOptions,
    PublicKeyCredentialRequestOptions,
};

/// The valid credential types. `public-key` is the only one defined by WebAuthn, any other value
/// deserializes to [`PublicKeyCredentialType::Unknown`] so it can be filtered out.
///
/// <https://w3c.github.io/webauthn/#enumdef-publickeycredentialtype>
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[typeshare(serialized_as = "String")]
pub enum PublicKeyCredentialType {
    /// The public counterpart of an asymmetric key pair.
    PublicKey,
    /// Placeholder for values this library does not know about.
    #[default]
    Unknown,
}

/// Identifies a specific public key credential, used in
/// [`PublicKeyCredentialCreationOptions::exclude_credentials`] and
/// [`PublicKeyCredentialRequestOptions::allow_credentials`].
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialdescriptor>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare]
pub struct PublicKeyCredentialDescriptor {
    /// Mirrors the `type` of the [`PublicKeyCredential`]. Descriptors of an unknown type MUST be
    /// ignored by clients.
    #[serde(rename = "type", deserialize_with = "ignore_unknown")]
    pub ty: PublicKeyCredentialType,

    /// Mirrors [`PublicKeyCredential::raw_id`].
    pub id: Bytes,

    /// Hints as to how the client might reach the authenticator holding this credential, as
    /// reported by [`AuthenticatorAttestationResponse::get_transports`] at registration.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown_opt_vec"
    )]
    pub transports: Option<Vec<AuthenticatorTransport>>,
}

impl PublicKeyCredentialDescriptor {
    /// A `public-key` descriptor without transport hints.
    pub fn public_key(id: impl Into<Bytes>) -> Self {
        Self {
            ty: PublicKeyCredentialType::PublicKey,
            id: id.into(),
            transports: None,
        }
    }

    /// Whether [`Self::ty`] is a known credential type.
    pub fn is_known(&self) -> bool {
        match self.ty {
            PublicKeyCredentialType::PublicKey => true,
            PublicKeyCredentialType::Unknown => false,
        }
    }
}

/// The relying party's requirement regarding [user verification].
///
/// <https://w3c.github.io/webauthn/#enumdef-userverificationrequirement>
///
/// [user verification]: https://w3c.github.io/webauthn/#user-verification
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum UserVerificationRequirement {
    /// The ceremony fails if the user cannot be verified.
    Required,

    /// Verify the user if possible, do not fail otherwise.
    #[default]
    Preferred,

    /// Do not verify the user, e.g. to minimize disruption of the interaction flow.
    Discouraged,
}

impl UserVerificationRequirement {
    /// Whether user verification should be attempted given the authenticator's capability.
    pub fn should_verify(&self, capable: bool) -> bool {
        match self {
            UserVerificationRequirement::Required => true,
            UserVerificationRequirement::Preferred => capable,
            UserVerificationRequirement::Discouraged => false,
        }
    }
}

/// Hints as to how a client might communicate with a particular authenticator.
///
/// <https://w3c.github.io/webauthn/#enum-transport>
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum AuthenticatorTransport {
    /// Removable USB.
    Usb,

    /// Near Field Communication.
    Nfc,

    /// Bluetooth Low Energy.
    Ble,

    /// A client device-specific transport, i.e. a platform authenticator.
    Internal,
}

/// The attachment modality of an authenticator. Relying parties state a preference at
/// registration and clients report the modality used to complete a ceremony.
///
/// <https://w3c.github.io/webauthn/#enumdef-authenticatorattachment>
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[typeshare(serialized_as = "String")]
pub enum AuthenticatorAttachment {
    /// Attached with a client device-specific transport and usually not removable.
    Platform,

    /// Removable authenticators that can "roam" between client devices.
    CrossPlatform,
}
