//! Sample App for a credentials container
use credman::{
    authenticator::{
        Aaguid, Authenticator, AuthenticatorError, MemoryStore, UiHint, UserCheck,
        UserValidationMethod,
    },
    client::{CredentialError, CredentialsContainer, MemoryPasswordStore, NoUserInterface},
    types::{
        rand::random_vec, webauthn::*, Credential, CredentialCreationOptions,
        CredentialMediationRequirement, CredentialRequestOptions, FormData,
        PasswordCredentialInit,
    },
};
use url::Url;

// MyUserValidationMethod is a stub impl of the UserValidationMethod trait, used later.
struct MyUserValidationMethod {}

#[async_trait::async_trait]
impl UserValidationMethod for MyUserValidationMethod {
    async fn check_user<'a>(
        &self,
        hint: UiHint<'a>,
        presence: bool,
        verification: bool,
    ) -> Result<UserCheck, AuthenticatorError> {
        println!("Asking the user about: {hint:?}");
        Ok(UserCheck {
            presence,
            verification,
        })
    }

    fn is_verification_enabled(&self) -> Option<bool> {
        Some(true)
    }

    fn is_presence_enabled(&self) -> bool {
        true
    }
}

type MyContainer = CredentialsContainer<
    MemoryStore,
    MyUserValidationMethod,
    NoUserInterface,
    MemoryPasswordStore,
>;

// Register a discoverable public key credential, then sign in with it.
async fn public_key_round_trip(
    container: &mut MyContainer,
    user_entity: PublicKeyCredentialUserEntity,
) -> Result<(Credential, Credential), CredentialError> {
    // The following values would usually be retrieved from the Relying Party.
    let request = PublicKeyCredentialCreationOptions {
        rp: PublicKeyCredentialRpEntity {
            id: None, // Leaving the ID as None means use the effective domain
            name: "ACME Corporation".into(),
            icon: None,
        },
        user: user_entity,
        challenge: random_vec(32).into(),
        pub_key_cred_params: PublicKeyCredentialParameters::default_algorithms(),
        timeout: None,
        exclude_credentials: None,
        authenticator_selection: Some(AuthenticatorSelectionCriteria {
            resident_key: Some(ResidentKeyRequirement::Preferred),
            ..Default::default()
        }),
        attestation: AttestationConveyancePreference::None,
        extensions: None,
    };
    let created = container
        .create(request.into())
        .await?
        .ok_or(CredentialError::NotAllowed)?;

    let credential_request = PublicKeyCredentialRequestOptions::new(random_vec(32));
    let authenticated = container
        .get(credential_request.into())
        .await?
        .ok_or(CredentialError::NotAllowed)?;

    Ok((created, authenticated))
}

// Build a password credential from a sign up form, store it and read it back silently.
async fn password_round_trip(
    container: &mut MyContainer,
) -> Result<Option<Credential>, CredentialError> {
    let form = FormData::default()
        .field("username", "alice@acme.example")
        .field("new-password", "correct horse battery staple");
    let options = CredentialCreationOptions {
        password: Some(PasswordCredentialInit::Form(form)),
        ..Default::default()
    };
    if let Some(credential) = container.create(options).await? {
        container.store(credential).await?;
    }

    container
        .get(CredentialRequestOptions {
            mediation: CredentialMediationRequirement::Silent,
            password: true,
            ..Default::default()
        })
        .await
}

#[tokio::main]
async fn main() -> Result<(), CredentialError> {
    let origin = Url::parse("https://acme.example").expect("Should Parse");
    let authenticator = Authenticator::new(
        Aaguid::new_empty(),
        MemoryStore::new(),
        MyUserValidationMethod {},
    );
    let mut container = CredentialsContainer::new(
        origin,
        authenticator,
        NoUserInterface,
        MemoryPasswordStore::new(),
    );
    let user_entity = PublicKeyCredentialUserEntity {
        id: random_vec(32).into(),
        display_name: "Alice Example".into(),
        name: "alice@acme.example".into(),
        icon: None,
    };

    let (created, authenticated) = public_key_round_trip(&mut container, user_entity).await?;
    println!("Public key credential created:\n\n{created:?}\n\n");
    println!("Public key credential used:\n\n{authenticated:?}\n\n");

    match password_round_trip(&mut container).await? {
        Some(credential) => println!("Password credential handed over silently: {credential:?}"),
        None => println!("No password credential could be handed over silently"),
    }

    // After signing out a silent request comes back empty until a credential is stored again.
    container.prevent_silent_access().await?;
    let after_sign_out = container
        .get(CredentialRequestOptions {
            mediation: CredentialMediationRequirement::Silent,
            password: true,
            ..Default::default()
        })
        .await?;
    println!("After signing out: {after_sign_out:?}");
    println!(
        "After signing in again: {:?}",
        password_round_trip(&mut container).await?
    );

    Ok(())
}
