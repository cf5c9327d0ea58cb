use coset::iana;
use credman_types::webauthn;

use crate::{Aaguid, AuthenticatorError, CredentialStore, Flags, UiHint, UserValidationMethod};

pub mod get_assertion;
pub mod make_credential;

/// The user checks a ceremony asks for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Create a discoverable credential. Ignored by assertions.
    pub rk: bool,
    /// Test for user presence.
    pub up: bool,
    /// Verify the user.
    pub uv: bool,
}

/// A virtual authenticator with all the necessary state and information.
pub struct Authenticator<S, U> {
    /// The authenticator's AAGUID
    aaguid: Aaguid,
    /// Provides credential storage capabilities
    store: S,
    /// Supported algorithms, only ES256 keys can be generated.
    algs: Vec<iana::Algorithm>,
    /// Transports reported to relying parties in attestation responses.
    transports: Vec<webauthn::AuthenticatorTransport>,
    /// Provider of user verification factor.
    user_validation: U,
    /// How this authenticator is reached by the client.
    attachment: webauthn::AuthenticatorAttachment,
    /// Whether new credentials are saved with a signature counter. Defaults to `false`.
    make_credentials_with_signature_counter: bool,
}

impl<S, U> Authenticator<S, U>
where
    S: CredentialStore,
    U: UserValidationMethod,
{
    /// Create a platform authenticator with a known aaguid, a backing storage and a user
    /// verification system.
    pub fn new(aaguid: Aaguid, store: S, user: U) -> Self {
        Self {
            aaguid,
            store,
            algs: vec![iana::Algorithm::ES256],
            transports: vec![webauthn::AuthenticatorTransport::Internal],
            user_validation: user,
            attachment: webauthn::AuthenticatorAttachment::Platform,
            make_credentials_with_signature_counter: false,
        }
    }

    /// Builder method for overwriting the authenticator's supported transports.
    pub fn transports(self, transports: Vec<webauthn::AuthenticatorTransport>) -> Self {
        Self { transports, ..self }
    }

    /// Builder method for overwriting the authenticator's attachment modality.
    pub fn attachment(self, attachment: webauthn::AuthenticatorAttachment) -> Self {
        Self { attachment, ..self }
    }

    /// Set whether new credentials are saved with a signature counter.
    pub fn set_make_credentials_with_signature_counter(&mut self, value: bool) {
        self.make_credentials_with_signature_counter = value;
    }

    /// Whether new credentials are saved with a signature counter.
    pub fn make_credentials_with_signature_counter(&self) -> bool {
        self.make_credentials_with_signature_counter
    }

    /// Access the [`CredentialStore`] to look into what is stored.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Exclusively access the [`CredentialStore`] to look into what is stored and modify it if needed.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Access the authenticator's [`Aaguid`]
    pub fn aaguid(&self) -> &Aaguid {
        &self.aaguid
    }

    /// The transports reported for new credentials, sorted lexicographically.
    pub fn supported_transports(&self) -> Vec<webauthn::AuthenticatorTransport> {
        let mut transports = self.transports.clone();
        transports.sort_by_key(|t| match t {
            webauthn::AuthenticatorTransport::Ble => 0,
            webauthn::AuthenticatorTransport::Internal => 1,
            webauthn::AuthenticatorTransport::Nfc => 2,
            webauthn::AuthenticatorTransport::Usb => 3,
        });
        transports.dedup();
        transports
    }

    /// The attachment modality of this authenticator.
    pub fn attachment_type(&self) -> webauthn::AuthenticatorAttachment {
        self.attachment
    }

    /// Whether user verification is available and configured.
    pub fn is_user_verifying(&self) -> bool {
        self.user_validation.is_verification_enabled() == Some(true)
    }

    /// Choose the first algorithm of `params` this authenticator supports, so the relying party's
    /// order of preference is honoured. Entries of an unknown type are skipped.
    pub fn choose_algorithm(
        &self,
        params: &[webauthn::PublicKeyCredentialParameters],
    ) -> Result<iana::Algorithm, AuthenticatorError> {
        params
            .iter()
            .filter(|param| param.ty == webauthn::PublicKeyCredentialType::PublicKey)
            .find(|param| self.algs.contains(&param.alg))
            .map(|param| param.alg)
            .ok_or(AuthenticatorError::UnsupportedAlgorithm)
    }

    /// Collect user consent, and verify the user if `options.uv` is set. This happens before the
    /// authenticator discloses anything about the credentials it holds.
    ///
    /// * [`AuthenticatorError::UnsupportedOption`] when verification or presence is asked for but
    ///   not available.
    /// * [`AuthenticatorError::OperationDenied`] when a requested check did not pass.
    async fn check_user(
        &self,
        hint: UiHint<'_>,
        options: &Options,
    ) -> Result<Flags, AuthenticatorError> {
        if options.uv && !self.is_user_verifying() {
            return Err(AuthenticatorError::UnsupportedOption);
        }

        if options.up && !self.user_validation.is_presence_enabled() {
            return Err(AuthenticatorError::UnsupportedOption);
        }

        let check_result = self
            .user_validation
            .check_user(hint, options.up, options.uv)
            .await?;

        if options.up && !check_result.presence {
            return Err(AuthenticatorError::OperationDenied);
        }

        if options.uv && !check_result.verification {
            return Err(AuthenticatorError::OperationDenied);
        }

        let mut flags = Flags::empty();
        if check_result.presence {
            flags |= Flags::UP;
        }

        if check_result.verification {
            flags |= Flags::UV;
        }

        Ok(flags)
    }
}
