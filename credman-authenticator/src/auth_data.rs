//! Encoding of the authenticator data and attestation object this authenticator signs.
//!
//! <https://w3c.github.io/webauthn/#sctn-authenticator-data>

use bitflags::bitflags;
use ciborium::{cbor, value::Value};
use coset::{CborSerializable, CoseKey};
use credman_types::crypto::sha256;

use crate::AuthenticatorError;

bitflags! {
    /// Flags of the authenticator data.
    ///
    /// <https://w3c.github.io/webauthn/#authdata-flags>
    #[repr(transparent)]
    #[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
    pub struct Flags: u8 {
        /// User Present, bit 0
        const UP = 1 << 0;
        /// User Verified, bit 2
        const UV = 1 << 2;
        /// Attested Credential Data, bit 6
        const AT = 1 << 6;
        /// Extension Data Included, bit 7
        const ED = 1 << 7;
    }
}

impl From<Flags> for u8 {
    fn from(src: Flags) -> Self {
        src.bits()
    }
}

/// An Authenticator Attestation GUID, identifying the make and model of an authenticator.
///
/// Software authenticators doing `none` attestation use the all zero AAGUID, see
/// [`Aaguid::new_empty`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Aaguid(pub [u8; Self::LEN]);

impl Aaguid {
    const LEN: usize = 16;

    /// The all zero AAGUID.
    pub const fn new_empty() -> Self {
        Self([0; Self::LEN])
    }
}

impl From<[u8; 16]> for Aaguid {
    fn from(inner: [u8; 16]) -> Self {
        Aaguid(inner)
    }
}

/// The contextual bindings made by the authenticator: which RP ID, which user checks, how many
/// uses, and for registrations the new credential.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatorData {
    rp_id_hash: [u8; 32],

    /// User checks performed and members present.
    pub flags: Flags,

    /// Signature counter. Absent counters are encoded as `0`.
    pub counter: Option<u32>,

    /// The new credential, only present in registrations.
    pub attested_credential_data: Option<AttestedCredentialData>,
}

impl AuthenticatorData {
    /// Authenticator data scoped to `rp_id` without any flag set.
    pub fn new(rp_id: &str, counter: Option<u32>) -> Self {
        Self {
            rp_id_hash: sha256(rp_id.as_bytes()),
            flags: Flags::empty(),
            counter,
            attested_credential_data: None,
        }
    }

    /// Attach the new credential, which sets [`Flags::AT`].
    pub fn set_attested_credential_data(mut self, acd: AttestedCredentialData) -> Self {
        self.attested_credential_data = Some(acd);
        self.set_flags(Flags::AT)
    }

    /// Add `flags` to the ones already set.
    pub fn set_flags(mut self, flags: Flags) -> Self {
        self.flags |= flags;
        self
    }

    /// SHA-256 of the RP ID.
    pub fn rp_id_hash(&self) -> &[u8] {
        &self.rp_id_hash
    }

    /// The byte layout: RP ID hash (32), flags (1), big endian counter (4), then the attested
    /// credential data if any.
    pub fn to_vec(&self) -> Result<Vec<u8>, AuthenticatorError> {
        let mut bytes = Vec::with_capacity(37);
        bytes.extend_from_slice(&self.rp_id_hash);
        bytes.push(self.flags.into());
        bytes.extend_from_slice(&self.counter.unwrap_or_default().to_be_bytes());
        if let Some(acd) = &self.attested_credential_data {
            acd.write_to(&mut bytes)?;
        }
        Ok(bytes)
    }
}

/// The credential ID and public key added to the authenticator data of a registration.
///
/// <https://w3c.github.io/webauthn/#attested-credential-data>
#[derive(Debug, Clone, PartialEq)]
pub struct AttestedCredentialData {
    /// The AAGUID of the authenticator.
    pub aaguid: Aaguid,

    credential_id: Vec<u8>,

    /// The credential public key, a COSE_Key carrying its `alg`.
    pub key: CoseKey,
}

impl AttestedCredentialData {
    /// Fails with [`AuthenticatorError::InvalidCredential`] when the credential ID length does not
    /// fit the two byte length prefix.
    pub fn new(
        aaguid: Aaguid,
        credential_id: Vec<u8>,
        key: CoseKey,
    ) -> Result<Self, AuthenticatorError> {
        u16::try_from(credential_id.len()).map_err(|_| AuthenticatorError::InvalidCredential)?;
        Ok(Self {
            aaguid,
            credential_id,
            key,
        })
    }

    /// The credential ID.
    pub fn credential_id(&self) -> &[u8] {
        &self.credential_id
    }

    fn write_to(&self, out: &mut Vec<u8>) -> Result<(), AuthenticatorError> {
        let len = u16::try_from(self.credential_id.len())
            .map_err(|_| AuthenticatorError::InvalidCredential)?;
        out.extend_from_slice(&self.aaguid.0);
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(&self.credential_id);
        out.extend(self.key.clone().to_vec()?);
        Ok(())
    }
}

/// Wrap authenticator data into a `none` format attestation object:
/// `{ "fmt": "none", "attStmt": {}, "authData": <bytes> }`.
///
/// <https://w3c.github.io/webauthn/#sctn-none-attestation>
pub fn none_attestation_object(
    auth_data: &AuthenticatorData,
) -> Result<Vec<u8>, AuthenticatorError> {
    let auth_data = Value::Bytes(auth_data.to_vec()?);
    let object = cbor!({
        "fmt" => "none",
        "attStmt" => {},
        "authData" => auth_data
    })
    .map_err(|_| AuthenticatorError::Other(0x7F))?;

    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&object, &mut bytes)
        .map_err(|_| AuthenticatorError::Other(0x7F))?;
    Ok(bytes)
}
