//! Registration: create a key pair scoped to an RP ID and attest to it.

use coset::iana;
use credman_types::{
    rand::random_vec,
    webauthn::{
        PublicKeyCredentialDescriptor, PublicKeyCredentialParameters, PublicKeyCredentialRpEntity,
        PublicKeyCredentialUserEntity,
    },
    Bytes,
};
use p256::SecretKey;

use crate::{
    auth_data::none_attestation_object, Authenticator, AttestedCredentialData, AuthenticatorData,
    AuthenticatorError, CoseKeyPair, CredentialStore, Options, PublicKeyCredentialSource, UiHint,
    UserValidationMethod,
};

/// Length of generated credential IDs.
const CREDENTIAL_ID_LEN: usize = 16;

/// Input of [`Authenticator::make_credential`].
#[derive(Debug, Clone)]
pub struct Request {
    /// SHA-256 of the serialized client data.
    pub client_data_hash: Bytes,

    /// The RP ID the new credential is scoped to, already verified by the client.
    pub rp_id: String,

    /// Relying party display data.
    pub rp: PublicKeyCredentialRpEntity,

    /// The account the credential is created for.
    pub user: PublicKeyCredentialUserEntity,

    /// Acceptable algorithms in order of preference.
    pub pub_key_cred_params: Vec<PublicKeyCredentialParameters>,

    /// Credentials that must not already be held by this authenticator.
    pub exclude_list: Option<Vec<PublicKeyCredentialDescriptor>>,

    /// User checks, and whether a discoverable credential is wanted.
    pub options: Options,
}

/// Output of [`Authenticator::make_credential`].
#[derive(Debug, Clone)]
pub struct Response {
    /// The authenticator data, with the attested credential data of the new credential.
    pub auth_data: AuthenticatorData,

    /// The algorithm of the new credential.
    pub algorithm: iana::Algorithm,

    /// Whether the new credential is discoverable.
    pub discoverable: bool,
}

impl Response {
    /// The ID of the new credential.
    pub fn credential_id(&self) -> &[u8] {
        self.auth_data
            .attested_credential_data
            .as_ref()
            .map(AttestedCredentialData::credential_id)
            .unwrap_or_default()
    }

    /// The encoded authenticator data.
    pub fn auth_data_bytes(&self) -> Result<Vec<u8>, AuthenticatorError> {
        self.auth_data.to_vec()
    }

    /// A `none` format attestation object around [`Self::auth_data`].
    pub fn attestation_object(&self) -> Result<Vec<u8>, AuthenticatorError> {
        none_attestation_object(&self.auth_data)
    }
}

impl<S, U> Authenticator<S, U>
where
    S: CredentialStore,
    U: UserValidationMethod,
{
    /// Create a new credential.
    ///
    /// 1. Excluded credentials held by this authenticator still ask the user for presence, then
    ///    fail with [`AuthenticatorError::CredentialExcluded`] so their existence is only revealed
    ///    after consent.
    /// 2. Pick the first supported algorithm.
    /// 3. Collect consent and verification.
    /// 4. Generate the key pair, save the credential source, and build the authenticator data.
    pub async fn make_credential(
        &mut self,
        input: Request,
    ) -> Result<Response, AuthenticatorError> {
        if let Some(exclude_list) = input.exclude_list.as_deref() {
            let excluded = self
                .store
                .find_credentials(Some(exclude_list), &input.rp_id)
                .await?;
            if let Some(found) = excluded.first() {
                log::debug!("make_credential: found an excluded credential for {}", input.rp_id);
                let options = Options {
                    up: true,
                    ..Options::default()
                };
                self.check_user(UiHint::InformExcludedCredentialFound(found), &options)
                    .await?;
                return Err(AuthenticatorError::CredentialExcluded);
            }
        }

        let algorithm = self.choose_algorithm(&input.pub_key_cred_params)?;

        let options = Options {
            up: true,
            ..input.options
        };
        let flags = self
            .check_user(
                UiHint::RequestNewCredential(&input.user, &input.rp),
                &options,
            )
            .await?;

        let private_key = {
            let mut rng = rand::thread_rng();
            SecretKey::random(&mut rng)
        };
        let CoseKeyPair { public, private } = CoseKeyPair::from_secret_key(&private_key, algorithm);
        let credential_id = random_vec(CREDENTIAL_ID_LEN);
        let counter = self.make_credentials_with_signature_counter.then_some(0);

        let source = PublicKeyCredentialSource {
            credential_id: credential_id.clone().into(),
            key: private,
            rp_id: input.rp_id.clone(),
            user_handle: Some(input.user.id.clone()),
            username: Some(input.user.name.clone()),
            user_display_name: Some(input.user.display_name.clone()),
            counter,
            discoverable: input.options.rk,
        };
        self.store
            .save_credential(source, input.user, input.rp)
            .await?;

        let acd = AttestedCredentialData::new(*self.aaguid(), credential_id, public)?;
        let auth_data = AuthenticatorData::new(&input.rp_id, counter)
            .set_flags(flags)
            .set_attested_credential_data(acd);

        log::debug!("make_credential: created a credential for {}", input.rp_id);
        Ok(Response {
            auth_data,
            algorithm,
            discoverable: input.options.rk,
        })
    }
}

#[cfg(test)]
mod tests;
