use std::{future::Future, time::Duration};

use coset::iana::EnumI64;
use credman_authenticator::{
    get_assertion, make_credential, public_key_der_from_cose_key, Authenticator,
    AuthenticatorError, CredentialStore, Options, UserValidationMethod,
};
use credman_types::{
    crypto::sha256,
    webauthn::{
        AuthenticatorAssertionResponse, AuthenticatorAttachment, AuthenticatorAttestationResponse,
        AttestationConveyancePreference, ClientDataType, CollectedClientData, PublicKeyCredential,
        PublicKeyCredentialCreationOptions, PublicKeyCredentialRequestOptions,
        ResidentKeyRequirement,
    },
    AbortController, AbortSignal, Credential, CredentialCreationOptions,
    CredentialMediationRequirement, CredentialRequestOptions, FederatedCredential,
    FederatedCredentialRequestOptions,
};
use url::Url;

use crate::{
    extensions, CredentialError, CredentialMediator, PasswordStore, RpIdVerifier, SecurityError,
    TimeoutPolicy,
};

#[cfg(test)]
mod tests;

/// The credential management capability of one origin.
///
/// Public key credentials go through the [`Authenticator`], password and federated credentials
/// through the [`PasswordStore`], with the [`CredentialMediator`] asking the user to pick an
/// account when one cannot be handed over silently.
///
/// Every operation resolves exactly once: with a value (possibly `None` for `get` and
/// `create`) or with a [`CredentialError`].
pub struct CredentialsContainer<S, U, M, P> {
    origin: Url,
    authenticator: Authenticator<S, U>,
    mediator: M,
    password_store: P,
    rp_id_verifier: RpIdVerifier,
    timeout_policy: TimeoutPolicy,
}

impl<S, U, M, P> CredentialsContainer<S, U, M, P>
where
    S: CredentialStore,
    U: UserValidationMethod,
    M: CredentialMediator,
    P: PasswordStore,
{
    /// Create a container acting for `origin`.
    pub fn new(
        origin: Url,
        authenticator: Authenticator<S, U>,
        mediator: M,
        password_store: P,
    ) -> Self {
        Self {
            origin,
            authenticator,
            mediator,
            password_store,
            rp_id_verifier: RpIdVerifier::new(),
            timeout_policy: TimeoutPolicy::default(),
        }
    }

    /// Allows public key ceremonies from an insecure `localhost` origin.
    pub fn allows_insecure_localhost(mut self, is_allowed: bool) -> Self {
        self.rp_id_verifier = self.rp_id_verifier.allows_insecure_localhost(is_allowed);
        self
    }

    /// Replace the default [`TimeoutPolicy`].
    pub fn with_timeout_policy(self, timeout_policy: TimeoutPolicy) -> Self {
        Self {
            timeout_policy,
            ..self
        }
    }

    /// The origin this container acts for.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Read access to the container's `Authenticator`.
    pub fn authenticator(&self) -> &Authenticator<S, U> {
        &self.authenticator
    }

    /// Write access to the container's `Authenticator`.
    pub fn authenticator_mut(&mut self) -> &mut Authenticator<S, U> {
        &mut self.authenticator
    }

    /// Read access to the container's `PasswordStore`.
    pub fn password_store(&self) -> &P {
        &self.password_store
    }

    /// The origin as it appears in client data and keys the password store,
    /// e.g. `https://acme.example`.
    fn serialized_origin(&self) -> String {
        self.origin.origin().ascii_serialization()
    }

    /// Request a credential.
    ///
    /// A `publicKey` member takes precedence and runs one authentication ceremony. The password
    /// and federated credentials of the origin are considered instead when no ceremony runs, under
    /// [`CredentialMediationRequirement::Silent`], or when the ceremony finds no eligible
    /// credential. They are handed over silently or through the [`CredentialMediator`] according
    /// to the mediation requirement. No matching credential, or a dismissed chooser, resolves
    /// `None`.
    pub async fn get(
        &mut self,
        options: CredentialRequestOptions,
    ) -> Result<Option<Credential>, CredentialError> {
        let signal = signal_of(options.signal.as_ref());
        if signal.is_aborted() {
            return Err(CredentialError::Abort);
        }
        if options.requested_types().is_empty() {
            return Err(CredentialError::NotSupported);
        }

        let wants_stored = options.password || options.federated.is_some();
        if let Some(request) = options.public_key {
            if options.mediation == CredentialMediationRequirement::Silent {
                log::debug!("get: a public key ceremony cannot be silent");
                if !wants_stored {
                    return Ok(None);
                }
            } else {
                match self.get_public_key(request, &signal).await {
                    Ok(credential) => return Ok(Some(credential.into())),
                    Err(CredentialError::NoEligibleAuthenticator) if wants_stored => {
                        log::debug!("get: no public key credential, trying stored credentials");
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        self.get_stored(
            options.mediation,
            options.password,
            options.federated.as_ref(),
            &signal,
        )
        .await
    }

    /// Store a password or federated credential for this origin, which also allows silent
    /// access again. Public key credentials are stored by their authenticator when they are
    /// created, so they are [`CredentialError::NotSupported`] here.
    pub async fn store(&mut self, credential: Credential) -> Result<Credential, CredentialError> {
        if let Credential::PublicKey(_) = credential {
            return Err(CredentialError::NotSupported);
        }

        let origin = self.serialized_origin();
        self.password_store
            .save_credential(&origin, credential.clone())
            .await?;
        self.password_store
            .set_prevent_silent_access(&origin, false)
            .await?;
        log::debug!("store: saved a {} credential for {origin}", credential.ty());
        Ok(credential)
    }

    /// Create a credential from the single member of `options`.
    ///
    /// Password and federated credentials are only constructed, pass them to
    /// [`Self::store`] to keep them. Public key credentials are registered with the
    /// authenticator in one ceremony.
    pub async fn create(
        &mut self,
        options: CredentialCreationOptions,
    ) -> Result<Option<Credential>, CredentialError> {
        let signal = signal_of(options.signal.as_ref());
        if signal.is_aborted() {
            return Err(CredentialError::Abort);
        }
        if options.requested_types().len() != 1 {
            return Err(CredentialError::NotSupported);
        }

        let origin = self.serialized_origin();
        if let Some(init) = options.password {
            check_credential_origin(init.origin(), &origin)?;
            return Ok(Some(init.into_credential(&origin)?.into()));
        }
        if let Some(init) = options.federated {
            check_credential_origin(Some(&init.origin), &origin)?;
            return Ok(Some(FederatedCredential::new(init)?.into()));
        }
        if let Some(request) = options.public_key {
            let credential = self.create_public_key(request, &signal).await?;
            return Ok(Some(credential.into()));
        }

        Err(CredentialError::NotSupported)
    }

    /// Require user mediation for the next `get` of this origin, until a credential is stored
    /// again. Typically called when the user signs out.
    pub async fn prevent_silent_access(&mut self) -> Result<(), CredentialError> {
        let origin = self.serialized_origin();
        self.password_store
            .set_prevent_silent_access(&origin, true)
            .await
    }

    /// Whether a platform authenticator able to verify the user is available.
    pub fn is_user_verifying_platform_authenticator_available(&self) -> bool {
        self.authenticator.attachment_type() == AuthenticatorAttachment::Platform
            && self.authenticator.is_user_verifying()
    }

    async fn get_stored(
        &mut self,
        mediation: CredentialMediationRequirement,
        password: bool,
        federated: Option<&FederatedCredentialRequestOptions>,
        signal: &AbortSignal,
    ) -> Result<Option<Credential>, CredentialError> {
        let origin = self.serialized_origin();
        let mut candidates: Vec<Credential> = self
            .password_store
            .find_credentials(&origin)
            .await?
            .into_iter()
            .filter(|credential| match credential {
                Credential::Password(_) => password,
                Credential::Federated(fed) => federated
                    .is_some_and(|opts| opts.accepts(&fed.provider, fed.protocol.as_deref())),
                Credential::PublicKey(_) => false,
            })
            .collect();

        if candidates.is_empty() {
            log::debug!("get: no stored credential matches for {origin}");
            return Ok(None);
        }

        let silent = candidates.len() == 1
            && !self.password_store.prevents_silent_access(&origin).await?;

        match mediation {
            CredentialMediationRequirement::Silent | CredentialMediationRequirement::Optional
                if silent =>
            {
                Ok(candidates.pop())
            }
            CredentialMediationRequirement::Silent => Ok(None),
            CredentialMediationRequirement::Optional | CredentialMediationRequirement::Required => {
                let choice = abortable(
                    signal,
                    self.mediator.choose_credential(&origin, candidates.clone()),
                )
                .await?;
                // the chooser may only hand back one of the candidates
                Ok(choice.filter(|chosen| candidates.contains(chosen)))
            }
        }
    }

    async fn get_public_key(
        &mut self,
        request: PublicKeyCredentialRequestOptions,
        signal: &AbortSignal,
    ) -> Result<PublicKeyCredential, CredentialError> {
        request.validate()?;
        let rp_id = self
            .rp_id_verifier
            .assert_domain(&self.origin, request.rp_id.as_deref())?;

        let uv = request
            .user_verification
            .should_verify(self.authenticator.is_user_verifying());
        let client_data_json = self.client_data_json(ClientDataType::Get, &request.challenge);
        let timeout = self.timeout_policy.effective(request.timeout);
        // an empty allow list is the same as none
        let allow_list = request.allow_credentials.filter(|list| !list.is_empty());

        let ceremony = self.authenticator.get_assertion(get_assertion::Request {
            rp_id,
            client_data_hash: sha256(&client_data_json).to_vec().into(),
            allow_list,
            options: Options {
                rk: false,
                up: true,
                uv,
            },
        });
        let response = ceremony_with_deadline(signal, timeout, ceremony).await?;

        let assertion = AuthenticatorAssertionResponse {
            client_data_json: client_data_json.into(),
            authenticator_data: response.auth_data.to_vec()?.into(),
            signature: response.signature,
            user_handle: response.user_handle,
        };
        let mut credential = PublicKeyCredential::new(response.credential_id, assertion.into());
        credential.authenticator_attachment = Some(self.authenticator.attachment_type());
        credential.client_extension_results =
            extensions::assertion_outputs(request.extensions.as_ref());
        Ok(credential)
    }

    async fn create_public_key(
        &mut self,
        request: PublicKeyCredentialCreationOptions,
        signal: &AbortSignal,
    ) -> Result<PublicKeyCredential, CredentialError> {
        request.validate()?;
        let rp_id = self
            .rp_id_verifier
            .assert_domain(&self.origin, request.rp.id.as_deref())?;

        let selection = request.authenticator_selection.unwrap_or_default();
        if selection
            .authenticator_attachment
            .is_some_and(|wanted| wanted != self.authenticator.attachment_type())
        {
            return Err(CredentialError::NoEligibleAuthenticator);
        }
        if request.attestation != AttestationConveyancePreference::None {
            log::debug!("create: only none attestation is available");
        }

        let rk = selection.resident_key_requirement() != ResidentKeyRequirement::Discouraged;
        let uv = selection
            .user_verification
            .should_verify(self.authenticator.is_user_verifying());
        let client_data_json = self.client_data_json(ClientDataType::Create, &request.challenge);
        let timeout = self.timeout_policy.effective(request.timeout);

        let ceremony = self.authenticator.make_credential(make_credential::Request {
            client_data_hash: sha256(&client_data_json).to_vec().into(),
            rp_id,
            rp: request.rp,
            user: request.user,
            pub_key_cred_params: request.pub_key_cred_params,
            exclude_list: request.exclude_credentials,
            options: Options { rk, up: true, uv },
        });
        let response = ceremony_with_deadline(signal, timeout, ceremony).await?;

        let acd = response
            .auth_data
            .attested_credential_data
            .as_ref()
            .ok_or(AuthenticatorError::InvalidCredential)?;
        let attestation = AuthenticatorAttestationResponse {
            client_data_json: client_data_json.into(),
            attestation_object: response.attestation_object()?.into(),
            transports: self.authenticator.supported_transports(),
            authenticator_data: Some(response.auth_data_bytes()?.into()),
            public_key: Some(public_key_der_from_cose_key(&acd.key)?),
            public_key_algorithm: Some(response.algorithm.to_i64()),
        };
        let mut credential =
            PublicKeyCredential::new(response.credential_id().to_vec(), attestation.into());
        credential.authenticator_attachment = Some(self.authenticator.attachment_type());
        credential.client_extension_results =
            extensions::registration_outputs(request.extensions.as_ref(), response.discoverable);
        Ok(credential)
    }

    fn client_data_json(&self, ty: ClientDataType, challenge: &[u8]) -> Vec<u8> {
        let client_data = CollectedClientData::new(ty, challenge, self.serialized_origin());
        // SAFETY: it is a developer error if serializing this struct fails.
        serde_json::to_vec(&client_data).unwrap()
    }
}

fn signal_of(signal: Option<&AbortSignal>) -> AbortSignal {
    signal
        .cloned()
        .unwrap_or_else(|| AbortController::new().signal())
}

/// A credential init record naming an origin must name this container's.
fn check_credential_origin(claimed: Option<&str>, origin: &str) -> Result<(), SecurityError> {
    match claimed {
        Some(claimed) if !claimed.is_empty() && claimed.trim_end_matches('/') != origin => {
            Err(SecurityError::CredentialOriginMismatch)
        }
        _ => Ok(()),
    }
}

/// Run `fut` unless `signal` aborts first.
async fn abortable<T>(
    signal: &AbortSignal,
    fut: impl Future<Output = T>,
) -> Result<T, CredentialError> {
    tokio::select! {
        biased;
        _ = signal.aborted() => Err(CredentialError::Abort),
        value = fut => Ok(value),
    }
}

/// Run an authenticator ceremony bounded by `timeout` and `signal`.
async fn ceremony_with_deadline<T>(
    signal: &AbortSignal,
    timeout: Duration,
    ceremony: impl Future<Output = Result<T, AuthenticatorError>>,
) -> Result<T, CredentialError> {
    let Ok(result) = abortable(signal, tokio::time::timeout(timeout, ceremony)).await? else {
        log::debug!("ceremony timed out after {timeout:?}");
        return Err(CredentialError::NotAllowed);
    };
    Ok(result?)
}
