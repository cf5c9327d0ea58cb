use credman_types::webauthn::{PublicKeyCredentialRpEntity, PublicKeyCredentialUserEntity};

use crate::{AuthenticatorError, PublicKeyCredentialSource};

#[cfg(doc)]
use crate::Authenticator;

/// What the user is being asked about, for authenticators that can show it.
#[derive(Debug, Clone, PartialEq)]
pub enum UiHint<'a> {
    /// The operation cannot complete because the user already has one of the excluded credentials.
    InformExcludedCredentialFound(&'a PublicKeyCredentialSource),

    /// The operation cannot complete because the user has no matching credential.
    InformNoCredentialsFound,

    /// Permission to create a credential for this account and relying party.
    RequestNewCredential(
        &'a PublicKeyCredentialUserEntity,
        &'a PublicKeyCredentialRpEntity,
    ),

    /// Permission to use this existing credential.
    RequestExistingCredential(&'a PublicKeyCredentialSource),
}

/// The outcome of a user check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserCheck {
    /// The user was present.
    pub presence: bool,

    /// The user was verified.
    pub verification: bool,
}

/// Pluggable user interaction and verification for the [`Authenticator`].
#[cfg_attr(any(test, feature = "testable"), mockall::automock)]
#[async_trait::async_trait]
pub trait UserValidationMethod {
    /// Check for the user's presence and obtain consent for the operation, verifying the user
    /// when `verification` is set.
    async fn check_user<'a>(
        &self,
        hint: UiHint<'a>,
        presence: bool,
        verification: bool,
    ) -> Result<UserCheck, AuthenticatorError>;

    /// Whether this method can test for user presence.
    fn is_presence_enabled(&self) -> bool;

    /// Whether this method can verify the user within itself: `Some(true)` when capable and
    /// configured, `Some(false)` when capable but not configured yet, `None` when not capable.
    fn is_verification_enabled(&self) -> Option<bool>;
}

/// An owned [`UiHint`] for setting up mock expectations.
#[cfg(any(test, feature = "testable"))]
#[derive(Debug, Clone)]
pub enum MockUiHint {
    /// See [`UiHint::InformExcludedCredentialFound`].
    InformExcludedCredentialFound(PublicKeyCredentialSource),
    /// See [`UiHint::InformNoCredentialsFound`].
    InformNoCredentialsFound,
    /// See [`UiHint::RequestNewCredential`].
    RequestNewCredential(PublicKeyCredentialUserEntity, PublicKeyCredentialRpEntity),
    /// See [`UiHint::RequestExistingCredential`].
    RequestExistingCredential(PublicKeyCredentialSource),
}

#[cfg(any(test, feature = "testable"))]
impl MockUserValidationMethod {
    /// A user that is present and verified `times` times, whatever the hint.
    pub fn verified_user(times: usize) -> Self {
        let mut user_mock = MockUserValidationMethod::new();
        user_mock
            .expect_is_verification_enabled()
            .returning(|| Some(true))
            .times(..);
        user_mock
            .expect_is_presence_enabled()
            .returning(|| true)
            .times(..);
        user_mock
            .expect_check_user()
            .returning(|_, presence, verification| {
                Ok(UserCheck {
                    presence,
                    verification,
                })
            })
            .times(times);
        user_mock
    }

    /// Same as [`Self::verified_user`], expecting `expected_hint` every time.
    pub fn verified_user_with_hint(times: usize, expected_hint: MockUiHint) -> Self {
        let mut user_mock = MockUserValidationMethod::new();
        user_mock
            .expect_is_verification_enabled()
            .returning(|| Some(true))
            .times(..);
        user_mock
            .expect_is_presence_enabled()
            .returning(|| true)
            .times(..);
        user_mock
            .expect_check_user()
            .withf(move |actual_hint, _, _| match &expected_hint {
                MockUiHint::InformExcludedCredentialFound(p) => {
                    actual_hint == &UiHint::InformExcludedCredentialFound(p)
                }
                MockUiHint::InformNoCredentialsFound => {
                    matches!(actual_hint, UiHint::InformNoCredentialsFound)
                }
                MockUiHint::RequestNewCredential(user, rp) => {
                    actual_hint == &UiHint::RequestNewCredential(user, rp)
                }
                MockUiHint::RequestExistingCredential(p) => {
                    actual_hint == &UiHint::RequestExistingCredential(p)
                }
            })
            .returning(|_, presence, verification| {
                Ok(UserCheck {
                    presence,
                    verification,
                })
            })
            .times(times);
        user_mock
    }

    /// A user that dismisses every prompt.
    pub fn refusing_user() -> Self {
        let mut user_mock = MockUserValidationMethod::new();
        user_mock
            .expect_is_verification_enabled()
            .returning(|| Some(true))
            .times(..);
        user_mock
            .expect_is_presence_enabled()
            .returning(|| true)
            .times(..);
        user_mock
            .expect_check_user()
            .returning(|_, _, _| {
                Ok(UserCheck {
                    presence: false,
                    verification: false,
                })
            })
            .times(..);
        user_mock
    }
}
