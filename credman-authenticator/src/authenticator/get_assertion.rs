//! Authentication: sign a challenge with a credential scoped to an RP ID.

use credman_types::{webauthn::PublicKeyCredentialDescriptor, Bytes};
use p256::ecdsa::{signature::Signer, Signature, SigningKey};

use crate::{
    private_key_from_cose_key, Authenticator, AuthenticatorData, AuthenticatorError,
    CredentialStore, Options, UiHint, UserValidationMethod,
};

/// Input of [`Authenticator::get_assertion`].
#[derive(Debug, Clone)]
pub struct Request {
    /// The RP ID the credential must be scoped to, already verified by the client.
    pub rp_id: String,

    /// SHA-256 of the serialized client data, appended to the authenticator data when signing.
    pub client_data_hash: Bytes,

    /// Credentials acceptable to the relying party. When absent any discoverable credential of
    /// the RP ID may be used.
    pub allow_list: Option<Vec<PublicKeyCredentialDescriptor>>,

    /// User checks to perform.
    pub options: Options,
}

/// Output of [`Authenticator::get_assertion`].
#[derive(Debug, Clone)]
pub struct Response {
    /// The ID of the credential that signed.
    pub credential_id: Bytes,

    /// The signed authenticator data.
    pub auth_data: AuthenticatorData,

    /// DER encoded ECDSA signature over the authenticator data followed by the client data hash.
    pub signature: Bytes,

    /// The user handle the credential was created with.
    pub user_handle: Option<Bytes>,
}

impl<S, U> Authenticator<S, U>
where
    S: CredentialStore,
    U: UserValidationMethod,
{
    /// Produce an assertion with the first matching credential.
    ///
    /// When no credential matches, the user is still informed and asked for presence before
    /// [`AuthenticatorError::NoCredentials`] is returned, whatever they answer.
    pub async fn get_assertion(&mut self, input: Request) -> Result<Response, AuthenticatorError> {
        let options = Options {
            rk: false,
            ..input.options
        };

        let mut credentials = self
            .store
            .find_credentials(input.allow_list.as_deref(), &input.rp_id)
            .await?;

        if credentials.is_empty() {
            log::debug!("get_assertion: no credentials for {}", input.rp_id);
            let inform = Options {
                up: true,
                ..Options::default()
            };
            // the outcome of the prompt does not change the answer
            let _ = self
                .check_user(UiHint::InformNoCredentialsFound, &inform)
                .await;
            return Err(AuthenticatorError::NoCredentials);
        }
        let mut credential = credentials.swap_remove(0);

        let flags = self
            .check_user(UiHint::RequestExistingCredential(&credential), &options)
            .await?;

        if let Some(counter) = credential.counter.as_mut() {
            *counter = counter.wrapping_add(1);
            self.store.update_credential(credential.clone()).await?;
        }

        let auth_data = AuthenticatorData::new(&input.rp_id, credential.counter).set_flags(flags);

        let mut signature_target = auth_data.to_vec()?;
        signature_target.extend_from_slice(&input.client_data_hash);

        let secret_key = private_key_from_cose_key(&credential.key)?;
        let signing_key = SigningKey::from(secret_key);
        let signature: Signature = signing_key.sign(&signature_target);

        Ok(Response {
            credential_id: credential.credential_id,
            auth_data,
            signature: signature.to_der().as_bytes().to_vec().into(),
            user_handle: credential.user_handle,
        })
    }
}
