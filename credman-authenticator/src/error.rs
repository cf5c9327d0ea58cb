use std::fmt;

use serde::Serialize;
use typeshare::typeshare;

/// The ways an authenticator operation can fail.
///
/// These mirror the CTAP2 status codes a roaming authenticator would return, restricted to the
/// ones a software authenticator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content")]
#[typeshare]
pub enum AuthenticatorError {
    /// No credential of the requested RP ID and allow list is available.
    NoCredentials,
    /// A credential of the exclude list is already held by this authenticator.
    CredentialExcluded,
    /// None of the requested algorithms is supported.
    UnsupportedAlgorithm,
    /// User verification was requested but this authenticator cannot verify the user.
    UnsupportedOption,
    /// The user did not give consent, or could not be verified.
    OperationDenied,
    /// A stored credential is unusable, e.g. its key is not a valid COSE key.
    InvalidCredential,
    /// Any other failure, carrying a CTAP2 style status byte.
    Other(u8),
}

impl fmt::Display for AuthenticatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthenticatorError::NoCredentials => f.write_str("no credentials found"),
            AuthenticatorError::CredentialExcluded => f.write_str("credential excluded"),
            AuthenticatorError::UnsupportedAlgorithm => f.write_str("unsupported algorithm"),
            AuthenticatorError::UnsupportedOption => f.write_str("unsupported option"),
            AuthenticatorError::OperationDenied => f.write_str("operation denied"),
            AuthenticatorError::InvalidCredential => f.write_str("invalid credential"),
            AuthenticatorError::Other(code) => write!(f, "authenticator error {code:#04x}"),
        }
    }
}

impl std::error::Error for AuthenticatorError {}

impl From<coset::CoseError> for AuthenticatorError {
    fn from(error: coset::CoseError) -> Self {
        log::warn!("COSE encoding failed: {error}");
        AuthenticatorError::InvalidCredential
    }
}
