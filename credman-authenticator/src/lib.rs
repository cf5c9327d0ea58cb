//! # Credman Authenticator
//!
//! A software authenticator for the `public-key` credential type. The [`Authenticator`] performs
//! the two ceremonies a client needs, [`Authenticator::make_credential`] and
//! [`Authenticator::get_assertion`], while storage and user interaction are supplied through the
//! [`CredentialStore`] and [`UserValidationMethod`] traits.
//!
//! Only ES256 keys are generated, and registrations carry a `none` attestation.

mod auth_data;
mod authenticator;
mod credential_store;
mod error;
mod user_validation;

use coset::{
    iana::{self, Algorithm, EnumI64},
    CoseKey, CoseKeyBuilder,
};
use credman_types::Bytes;
use p256::{
    ecdsa::SigningKey,
    elliptic_curve::{generic_array::GenericArray, sec1::FromEncodedPoint},
    pkcs8::EncodePublicKey,
    EncodedPoint, PublicKey, SecretKey,
};

pub use self::{
    auth_data::{none_attestation_object, Aaguid, AttestedCredentialData, AuthenticatorData, Flags},
    authenticator::{get_assertion, make_credential, Authenticator, Options},
    credential_store::{CredentialStore, MemoryStore, PublicKeyCredentialSource},
    error::AuthenticatorError,
    user_validation::{UiHint, UserCheck, UserValidationMethod},
};

#[cfg(any(test, feature = "testable"))]
pub use self::user_validation::{MockUiHint, MockUserValidationMethod};

fn ensure_es256_ec2(key: &CoseKey) -> Result<(), AuthenticatorError> {
    if !matches!(
        key.alg,
        Some(coset::RegisteredLabelWithPrivate::Assigned(
            Algorithm::ES256
        ))
    ) {
        return Err(AuthenticatorError::UnsupportedAlgorithm);
    }
    if !matches!(
        key.kty,
        coset::RegisteredLabel::Assigned(iana::KeyType::EC2)
    ) {
        return Err(AuthenticatorError::InvalidCredential);
    }
    Ok(())
}

/// Extract the P-256 secret key of a stored credential.
fn private_key_from_cose_key(key: &CoseKey) -> Result<SecretKey, AuthenticatorError> {
    ensure_es256_ec2(key)?;

    key.params
        .iter()
        .find_map(|(k, v)| match k {
            coset::Label::Int(i) => iana::Ec2KeyParameter::from_i64(*i)
                .filter(|p| p == &iana::Ec2KeyParameter::D)
                .and_then(|_| v.as_bytes())
                .and_then(|b| SecretKey::from_slice(b).ok()),
            coset::Label::Text(_) => None,
        })
        .ok_or(AuthenticatorError::InvalidCredential)
}

/// Convert a COSE public key to a DER encoded X.509 SubjectPublicKeyInfo, as exposed by
/// `getPublicKey()` on attestation responses.
pub fn public_key_der_from_cose_key(key: &CoseKey) -> Result<Bytes, AuthenticatorError> {
    ensure_es256_ec2(key)?;

    let (mut x, mut y) = (None, None);
    for (label, value) in &key.params {
        let coset::Label::Int(i) = label else {
            continue;
        };
        match iana::Ec2KeyParameter::from_i64(*i) {
            Some(iana::Ec2KeyParameter::X) => x = value.as_bytes(),
            Some(iana::Ec2KeyParameter::Y) => y = value.as_bytes(),
            _ => (),
        }
    }
    let (Some(x), Some(y)) = (x, y) else {
        log::warn!("COSE key is missing a coordinate");
        return Err(AuthenticatorError::InvalidCredential);
    };
    if x.len() != 32 || y.len() != 32 {
        return Err(AuthenticatorError::InvalidCredential);
    }

    let point = EncodedPoint::from_affine_coordinates(
        GenericArray::from_slice(x.as_slice()),
        GenericArray::from_slice(y.as_slice()),
        false,
    );
    let Some(pub_key): Option<PublicKey> = PublicKey::from_encoded_point(&point).into() else {
        return Err(AuthenticatorError::InvalidCredential);
    };
    pub_key
        .to_public_key_der()
        .map_err(|_| AuthenticatorError::InvalidCredential)
        .map(|der| der.as_bytes().to_vec().into())
}

/// A freshly generated credential key, in its stored and its published form.
struct CoseKeyPair {
    public: CoseKey,
    private: CoseKey,
}

impl CoseKeyPair {
    fn from_secret_key(private_key: &SecretKey, algorithm: Algorithm) -> Self {
        let point = SigningKey::from(private_key)
            .verifying_key()
            .to_encoded_point(false);
        // SAFETY: an uncompressed point always carries both coordinates.
        let x = point.x().unwrap().as_slice().to_vec();
        let y = point.y().unwrap().as_slice().to_vec();
        let private = CoseKeyBuilder::new_ec2_priv_key(
            iana::EllipticCurve::P_256,
            x.clone(),
            y.clone(),
            private_key.to_bytes().to_vec(),
        )
        .algorithm(algorithm)
        .build();
        let public = CoseKeyBuilder::new_ec2_pub_key(iana::EllipticCurve::P_256, x, y)
            .algorithm(algorithm)
            .build();

        Self { public, private }
    }
}
