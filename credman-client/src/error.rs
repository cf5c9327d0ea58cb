use std::fmt;

use credman_authenticator::AuthenticatorError;
use credman_types::{webauthn::MalformedRequest, CredentialInitError};
use serde::Serialize;
use typeshare::typeshare;

/// The ways a [`CredentialsContainer`](crate::CredentialsContainer) operation can fail.
///
/// Every variant is a distinct failure kind a relying party can branch on. Declining, timing out
/// and other user facing refusals are deliberately folded into [`CredentialError::NotAllowed`]
/// so that the relying party cannot tell which one happened.
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content")]
pub enum CredentialError {
    /// The operation's abort signal fired.
    Abort,
    /// The user declined, or the ceremony timed out.
    NotAllowed,
    /// No authenticator can satisfy the request, e.g. it holds no usable credential or supports
    /// none of the requested algorithms.
    NoEligibleAuthenticator,
    /// A required member of the envelope is missing or unusable.
    MalformedRequest(MalformedRequest),
    /// The origin is not allowed to act for the requested RP ID or credential origin.
    Security(SecurityError),
    /// The authenticator already holds one of the excluded credentials.
    InvalidState,
    /// The operation is not available for the requested credential type.
    NotSupported,
    /// Any other authenticator failure.
    Authenticator(AuthenticatorError),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::Abort => f.write_str("the operation was aborted"),
            CredentialError::NotAllowed => {
                f.write_str("the operation either timed out or was not allowed")
            }
            CredentialError::NoEligibleAuthenticator => {
                f.write_str("no authenticator can satisfy the request")
            }
            CredentialError::MalformedRequest(err) => write!(f, "malformed request: {err}"),
            CredentialError::Security(err) => write!(f, "security error: {err}"),
            CredentialError::InvalidState => f.write_str("the credential is already registered"),
            CredentialError::NotSupported => f.write_str("the operation is not supported"),
            CredentialError::Authenticator(err) => write!(f, "authenticator error: {err}"),
        }
    }
}

impl std::error::Error for CredentialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CredentialError::MalformedRequest(err) => Some(err),
            CredentialError::Security(err) => Some(err),
            CredentialError::Authenticator(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MalformedRequest> for CredentialError {
    fn from(value: MalformedRequest) -> Self {
        CredentialError::MalformedRequest(value)
    }
}

impl From<CredentialInitError> for CredentialError {
    fn from(value: CredentialInitError) -> Self {
        CredentialError::MalformedRequest(value.into())
    }
}

impl From<SecurityError> for CredentialError {
    fn from(value: SecurityError) -> Self {
        CredentialError::Security(value)
    }
}

impl From<AuthenticatorError> for CredentialError {
    fn from(value: AuthenticatorError) -> Self {
        match value {
            AuthenticatorError::OperationDenied => CredentialError::NotAllowed,
            AuthenticatorError::NoCredentials
            | AuthenticatorError::UnsupportedAlgorithm
            | AuthenticatorError::UnsupportedOption => CredentialError::NoEligibleAuthenticator,
            AuthenticatorError::CredentialExcluded => CredentialError::InvalidState,
            other => CredentialError::Authenticator(other),
        }
    }
}

/// Why an origin may not act for an RP ID or a credential origin.
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content")]
pub enum SecurityError {
    /// The origin has no domain, e.g. it is an IP address or an opaque origin.
    OriginMissingDomain,
    /// The RP ID is neither the origin's effective domain nor a suffix of it.
    OriginRpMismatch,
    /// The origin does not use HTTPS.
    UnprotectedOrigin,
    /// The origin is `localhost` but insecure localhost was not allowed.
    InsecureLocalhostNotAllowed,
    /// The RP ID is not a valid registrable domain.
    InvalidRpId,
    /// A credential init record names another origin than the container's.
    CredentialOriginMismatch,
}

impl fmt::Display for SecurityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityError::OriginMissingDomain => f.write_str("the origin has no domain"),
            SecurityError::OriginRpMismatch => {
                f.write_str("the RP ID is not a registrable suffix of the origin")
            }
            SecurityError::UnprotectedOrigin => f.write_str("the origin does not use https"),
            SecurityError::InsecureLocalhostNotAllowed => {
                f.write_str("insecure localhost origins are not allowed")
            }
            SecurityError::InvalidRpId => f.write_str("the RP ID is invalid"),
            SecurityError::CredentialOriginMismatch => {
                f.write_str("the credential belongs to another origin")
            }
        }
    }
}

impl std::error::Error for SecurityError {}
