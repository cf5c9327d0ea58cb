use std::future::pending;

use credman_authenticator::{
    Aaguid, MemoryStore, MockUserValidationMethod, PublicKeyCredentialSource, UiHint, UserCheck,
};
use credman_types::{
    encoding,
    webauthn::{
        AuthenticatorSelectionCriteria, AuthenticatorTransport, MalformedRequest,
        PublicKeyCredentialDescriptor, UserVerificationRequirement,
    },
    Bytes, CredentialInitError, FederatedCredentialInit, FormData, PasswordCredential,
    PasswordCredentialData, PasswordCredentialInit,
};
use serde_json::json;

use super::*;
use crate::{MemoryPasswordStore, MockCredentialMediator};

const ORIGIN: &str = "https://acme.example";

type TestContainer = CredentialsContainer<
    MemoryStore,
    MockUserValidationMethod,
    MockCredentialMediator,
    MemoryPasswordStore,
>;

fn container(user: MockUserValidationMethod, mediator: MockCredentialMediator) -> TestContainer {
    let authenticator = Authenticator::new(Aaguid::new_empty(), MemoryStore::new(), user);
    CredentialsContainer::new(
        Url::parse(ORIGIN).unwrap(),
        authenticator,
        mediator,
        MemoryPasswordStore::new(),
    )
}

fn acme_creation_options() -> CredentialCreationOptions {
    serde_json::from_value(json!({
        "publicKey": {
            "challenge": [21, 31, 105],
            "rp": {"name": "ACME"},
            "user": {
                "id": [1, 2, 3, 4],
                "name": "alice@acme.example",
                "displayName": "Alice",
            },
            "pubKeyCredParams": [{"type": "public-key", "alg": -7}],
        }
    }))
    .expect("a valid creation envelope")
}

fn request_options(allow: Option<Bytes>) -> CredentialRequestOptions {
    let mut request = PublicKeyCredentialRequestOptions::new([7u8; 32]);
    request.allow_credentials = allow.map(|id| vec![PublicKeyCredentialDescriptor::public_key(id)]);
    request.into()
}

fn password(id: &str, password: &str) -> Credential {
    PasswordCredential::new(PasswordCredentialData {
        id: id.into(),
        name: None,
        icon_url: None,
        origin: ORIGIN.into(),
        password: password.into(),
    })
    .unwrap()
    .into()
}

fn into_public_key(credential: Option<Credential>) -> PublicKeyCredential {
    match credential {
        Some(Credential::PublicKey(credential)) => credential,
        other => panic!("expected a public key credential, got {other:?}"),
    }
}

/// A user that never answers the prompt.
struct AbsentUser;

#[async_trait::async_trait]
impl UserValidationMethod for AbsentUser {
    async fn check_user<'a>(
        &self,
        _hint: UiHint<'a>,
        _presence: bool,
        _verification: bool,
    ) -> Result<UserCheck, AuthenticatorError> {
        pending().await
    }

    fn is_presence_enabled(&self) -> bool {
        true
    }

    fn is_verification_enabled(&self) -> Option<bool> {
        Some(true)
    }
}

/// An account chooser the user never closes.
struct OpenChooser;

#[async_trait::async_trait]
impl CredentialMediator for OpenChooser {
    async fn choose_credential(
        &self,
        _origin: &str,
        _candidates: Vec<Credential>,
    ) -> Option<Credential> {
        pending().await
    }
}

#[tokio::test]
async fn acme_envelope_creates_a_public_key_credential() {
    let mut container = container(
        MockUserValidationMethod::verified_user(1),
        MockCredentialMediator::never_asked(),
    );

    let credential = into_public_key(container.create(acme_creation_options()).await.unwrap());

    assert_eq!(credential.id, encoding::base64url(&credential.raw_id));
    assert_eq!(
        credential.authenticator_attachment,
        Some(AuthenticatorAttachment::Platform)
    );
    let attestation = credential
        .response
        .as_attestation()
        .expect("create yields an attestation");
    assert_eq!(attestation.get_transports(), [AuthenticatorTransport::Internal]);
    assert_eq!(attestation.public_key_algorithm, Some(-7));
    assert!(attestation.public_key.is_some());
    assert!(!attestation.attestation_object.is_empty());

    let auth_data = attestation.authenticator_data.as_ref().unwrap();
    assert_eq!(auth_data[..32], sha256(b"acme.example"));

    let client_data = credential.response.client_data().unwrap();
    assert_eq!(client_data.ty, ClientDataType::Create);
    assert_eq!(client_data.challenge, "FR9p");
    assert_eq!(client_data.origin, ORIGIN);
    assert_eq!(
        client_data.challenge_bytes(),
        Some(Bytes::from(vec![21u8, 31, 105]))
    );

    // the authenticator keeps the new credential
    assert_eq!(container.authenticator().store().len(), 1);
}

#[tokio::test]
async fn created_credential_can_authenticate() {
    let mut container = container(
        MockUserValidationMethod::verified_user(2),
        MockCredentialMediator::never_asked(),
    );
    let created = into_public_key(container.create(acme_creation_options()).await.unwrap());

    let credential = into_public_key(
        container
            .get(request_options(Some(created.raw_id.clone())))
            .await
            .expect("failed to authenticate with freshly created credential"),
    );

    assert_eq!(credential.raw_id, created.raw_id);
    let assertion = credential
        .response
        .as_assertion()
        .expect("get yields an assertion");
    assert_eq!(assertion.user_handle, Some(Bytes::from(vec![1u8, 2, 3, 4])));
    assert_eq!(assertion.authenticator_data[..32], sha256(b"acme.example"));
    assert!(!assertion.signature.is_empty());
    assert_eq!(
        credential.response.client_data().unwrap().ty,
        ClientDataType::Get
    );
}

#[tokio::test]
async fn server_side_credentials_need_an_allow_list() {
    let mut container = container(
        MockUserValidationMethod::verified_user(2),
        MockCredentialMediator::never_asked(),
    );
    container.create(acme_creation_options()).await.unwrap();

    let err = container.get(request_options(None)).await.unwrap_err();

    assert_eq!(err, CredentialError::NoEligibleAuthenticator);
}

#[tokio::test]
async fn discoverable_credentials_report_cred_props() {
    let mut container = container(
        MockUserValidationMethod::verified_user(2),
        MockCredentialMediator::never_asked(),
    );
    let mut options = acme_creation_options();
    if let Some(public_key) = options.public_key.as_mut() {
        public_key.authenticator_selection = Some(AuthenticatorSelectionCriteria {
            require_resident_key: true,
            ..Default::default()
        });
        public_key.extensions = serde_json::from_value(json!({"credProps": true})).unwrap();
    }

    let created = into_public_key(container.create(options).await.unwrap());
    assert_eq!(
        created
            .get_client_extension_results()
            .cred_props
            .and_then(|props| props.rk),
        Some(true)
    );

    // discoverable, so no allow list is needed
    let credential = into_public_key(container.get(request_options(None)).await.unwrap());
    assert_eq!(credential.raw_id, created.raw_id);
}

#[tokio::test]
async fn silent_get_without_stored_credentials_resolves_none() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::never_asked(),
    );
    let options = CredentialRequestOptions {
        mediation: CredentialMediationRequirement::Silent,
        password: true,
        ..Default::default()
    };

    assert_eq!(container.get(options).await, Ok(None));
}

#[tokio::test]
async fn silent_public_key_get_resolves_none() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::never_asked(),
    );
    let options = CredentialRequestOptions {
        mediation: CredentialMediationRequirement::Silent,
        ..request_options(None)
    };

    assert_eq!(container.get(options).await, Ok(None));
}

#[tokio::test]
async fn nothing_requested_is_not_supported() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::never_asked(),
    );

    assert_eq!(
        container.get(CredentialRequestOptions::default()).await,
        Err(CredentialError::NotSupported)
    );
    assert_eq!(
        container.create(CredentialCreationOptions::default()).await,
        Err(CredentialError::NotSupported)
    );
}

#[tokio::test]
async fn already_aborted_signal_rejects() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::never_asked(),
    );

    let get = request_options(None).with_signal(AbortSignal::aborted_signal());
    assert_eq!(container.get(get).await, Err(CredentialError::Abort));

    let create = acme_creation_options().with_signal(AbortSignal::aborted_signal());
    assert_eq!(container.create(create).await, Err(CredentialError::Abort));
    assert!(container.authenticator().store().is_empty());
}

#[tokio::test]
async fn abort_during_a_ceremony_rejects() {
    let authenticator = Authenticator::new(Aaguid::new_empty(), MemoryStore::new(), AbsentUser);
    let mut container = CredentialsContainer::new(
        Url::parse(ORIGIN).unwrap(),
        authenticator,
        MockCredentialMediator::never_asked(),
        MemoryPasswordStore::new(),
    );
    let controller = AbortController::new();
    let options = acme_creation_options().with_signal(controller.signal());

    tokio::spawn(async move { controller.abort() });
    let result = container.create(options).await;

    assert_eq!(result, Err(CredentialError::Abort));
}

#[tokio::test(start_paused = true)]
async fn unanswered_ceremony_times_out_as_not_allowed() {
    let authenticator = Authenticator::new(Aaguid::new_empty(), MemoryStore::new(), AbsentUser);
    let mut container = CredentialsContainer::new(
        Url::parse(ORIGIN).unwrap(),
        authenticator,
        MockCredentialMediator::never_asked(),
        MemoryPasswordStore::new(),
    );
    let mut options = acme_creation_options();
    if let Some(public_key) = options.public_key.as_mut() {
        public_key.timeout = Some(30_000);
    }

    let result = container.create(options).await;

    assert_eq!(result, Err(CredentialError::NotAllowed));
}

#[tokio::test]
async fn abort_while_choosing_an_account_rejects() {
    let authenticator = Authenticator::new(
        Aaguid::new_empty(),
        MemoryStore::new(),
        MockUserValidationMethod::verified_user(0),
    );
    let mut container = CredentialsContainer::new(
        Url::parse(ORIGIN).unwrap(),
        authenticator,
        OpenChooser,
        MemoryPasswordStore::new(),
    );
    container.store(password("alice", "hunter2")).await.unwrap();
    container.store(password("bob", "pa55")).await.unwrap();

    let controller = AbortController::new();
    let options = CredentialRequestOptions {
        password: true,
        ..Default::default()
    }
    .with_signal(controller.signal());

    tokio::spawn(async move { controller.abort() });
    let result = container.get(options).await;

    assert_eq!(result, Err(CredentialError::Abort));
}

#[tokio::test]
async fn empty_algorithm_list_is_malformed() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::never_asked(),
    );
    let mut options = acme_creation_options();
    if let Some(public_key) = options.public_key.as_mut() {
        public_key.pub_key_cred_params.clear();
    }

    assert_eq!(
        container.create(options).await,
        Err(CredentialError::MalformedRequest(
            MalformedRequest::EmptyPubKeyCredParams
        ))
    );
}

#[tokio::test]
async fn empty_challenge_is_malformed() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::never_asked(),
    );
    let options: CredentialRequestOptions =
        PublicKeyCredentialRequestOptions::new(Vec::<u8>::new()).into();

    assert_eq!(
        container.get(options).await,
        Err(CredentialError::MalformedRequest(
            MalformedRequest::MissingChallenge
        ))
    );
}

#[tokio::test]
async fn foreign_rp_id_is_a_security_error() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::never_asked(),
    );
    let mut options = acme_creation_options();
    if let Some(public_key) = options.public_key.as_mut() {
        public_key.rp.id = Some("evil.example".into());
    }

    assert_eq!(
        container.create(options).await,
        Err(CredentialError::Security(SecurityError::OriginRpMismatch))
    );
}

#[tokio::test]
async fn excluded_credential_is_invalid_state() {
    let mut container = container(
        MockUserValidationMethod::verified_user(2),
        MockCredentialMediator::never_asked(),
    );
    let created = into_public_key(container.create(acme_creation_options()).await.unwrap());

    let mut options = acme_creation_options();
    if let Some(public_key) = options.public_key.as_mut() {
        public_key.exclude_credentials =
            Some(vec![PublicKeyCredentialDescriptor::public_key(created.raw_id)]);
    }

    assert_eq!(
        container.create(options).await,
        Err(CredentialError::InvalidState)
    );
    assert_eq!(container.authenticator().store().len(), 1);
}

#[tokio::test]
async fn refused_consent_is_not_allowed() {
    let mut container = container(
        MockUserValidationMethod::refusing_user(),
        MockCredentialMediator::never_asked(),
    );

    assert_eq!(
        container.create(acme_creation_options()).await,
        Err(CredentialError::NotAllowed)
    );
}

#[tokio::test]
async fn required_user_verification_without_capability_has_no_eligible_authenticator() {
    let mut user = MockUserValidationMethod::new();
    user.expect_is_verification_enabled().returning(|| None);
    user.expect_check_user().never();
    let mut container = container(user, MockCredentialMediator::never_asked());

    let mut options = acme_creation_options();
    if let Some(public_key) = options.public_key.as_mut() {
        public_key.authenticator_selection = Some(AuthenticatorSelectionCriteria {
            user_verification: UserVerificationRequirement::Required,
            ..Default::default()
        });
    }

    assert_eq!(
        container.create(options).await,
        Err(CredentialError::NoEligibleAuthenticator)
    );
}

#[tokio::test]
async fn cross_platform_requirement_skips_platform_authenticator() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::never_asked(),
    );
    let mut options = acme_creation_options();
    if let Some(public_key) = options.public_key.as_mut() {
        public_key.authenticator_selection = Some(AuthenticatorSelectionCriteria {
            authenticator_attachment: Some(AuthenticatorAttachment::CrossPlatform),
            ..Default::default()
        });
    }

    assert_eq!(
        container.create(options).await,
        Err(CredentialError::NoEligibleAuthenticator)
    );
}

#[tokio::test]
async fn stored_password_is_handed_over_silently() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::never_asked(),
    );
    let stored = container.store(password("alice", "hunter2")).await.unwrap();
    assert_eq!(stored, password("alice", "hunter2"));

    for mediation in [
        CredentialMediationRequirement::Silent,
        CredentialMediationRequirement::Optional,
    ] {
        let options = CredentialRequestOptions {
            mediation,
            password: true,
            ..Default::default()
        };
        assert_eq!(container.get(options).await, Ok(Some(stored.clone())));
    }
}

#[tokio::test]
async fn silent_mixed_request_hands_over_the_stored_password() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::never_asked(),
    );
    let stored = container.store(password("alice", "hunter2")).await.unwrap();

    let options = CredentialRequestOptions {
        mediation: CredentialMediationRequirement::Silent,
        password: true,
        ..request_options(None)
    };

    assert_eq!(container.get(options).await, Ok(Some(stored)));
}

#[tokio::test]
async fn mixed_request_falls_back_to_stored_credentials_without_a_public_key() {
    // the authenticator informs the user that it holds no credential
    let mut container = container(
        MockUserValidationMethod::verified_user(1),
        MockCredentialMediator::never_asked(),
    );
    let stored = container.store(password("alice", "hunter2")).await.unwrap();

    let options = CredentialRequestOptions {
        password: true,
        ..request_options(None)
    };

    assert_eq!(container.get(options).await, Ok(Some(stored)));
}

#[tokio::test]
async fn mixed_request_prefers_the_public_key_credential() {
    let mut container = container(
        MockUserValidationMethod::verified_user(2),
        MockCredentialMediator::never_asked(),
    );
    let created = into_public_key(container.create(acme_creation_options()).await.unwrap());
    container.store(password("alice", "hunter2")).await.unwrap();

    let options = CredentialRequestOptions {
        password: true,
        ..request_options(Some(created.raw_id.clone()))
    };

    let credential = into_public_key(container.get(options).await.unwrap());
    assert_eq!(credential.raw_id, created.raw_id);
}

#[tokio::test]
async fn prevent_silent_access_requires_mediation_until_next_store() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::picks_first(1),
    );
    container.store(password("alice", "hunter2")).await.unwrap();
    container.prevent_silent_access().await.unwrap();

    let silent = CredentialRequestOptions {
        mediation: CredentialMediationRequirement::Silent,
        password: true,
        ..Default::default()
    };
    assert_eq!(container.get(silent.clone()).await, Ok(None));

    let optional = CredentialRequestOptions {
        password: true,
        ..Default::default()
    };
    assert_eq!(
        container.get(optional).await,
        Ok(Some(password("alice", "hunter2")))
    );

    container.store(password("alice", "hunter3")).await.unwrap();
    assert_eq!(
        container.get(silent).await,
        Ok(Some(password("alice", "hunter3")))
    );
}

#[tokio::test]
async fn required_mediation_always_asks() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::picks_first(1),
    );
    container.store(password("alice", "hunter2")).await.unwrap();

    let options = CredentialRequestOptions {
        mediation: CredentialMediationRequirement::Required,
        password: true,
        ..Default::default()
    };

    assert_eq!(
        container.get(options).await,
        Ok(Some(password("alice", "hunter2")))
    );
}

#[tokio::test]
async fn dismissed_chooser_resolves_none() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::never_asked(),
    );
    container.store(password("alice", "hunter2")).await.unwrap();
    container.store(password("bob", "pa55")).await.unwrap();

    // two candidates are never handed over silently
    let silent = CredentialRequestOptions {
        mediation: CredentialMediationRequirement::Silent,
        password: true,
        ..Default::default()
    };
    assert_eq!(container.get(silent).await, Ok(None));

    let mut mediator = MockCredentialMediator::new();
    mediator
        .expect_choose_credential()
        .withf(|origin, candidates| origin == ORIGIN && candidates.len() == 2)
        .returning(|_, _| None)
        .once();
    let mut container = CredentialsContainer {
        mediator,
        ..container
    };
    let optional = CredentialRequestOptions {
        password: true,
        ..Default::default()
    };
    assert_eq!(container.get(optional).await, Ok(None));
}

#[tokio::test]
async fn chooser_cannot_invent_credentials() {
    let mut mediator = MockCredentialMediator::new();
    mediator
        .expect_choose_credential()
        .returning(|_, _| Some(password("mallory", "letmein")))
        .once();
    let mut container = container(MockUserValidationMethod::verified_user(0), mediator);
    container.store(password("alice", "hunter2")).await.unwrap();

    let options = CredentialRequestOptions {
        mediation: CredentialMediationRequirement::Required,
        password: true,
        ..Default::default()
    };

    assert_eq!(container.get(options).await, Ok(None));
}

#[tokio::test]
async fn federated_candidates_are_filtered_by_provider() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::never_asked(),
    );
    let federated: Credential = FederatedCredential::new(FederatedCredentialInit {
        id: "alice".into(),
        name: None,
        icon_url: None,
        origin: ORIGIN.into(),
        provider: "https://idp.example".into(),
        protocol: None,
    })
    .unwrap()
    .into();
    container.store(federated.clone()).await.unwrap();
    container.store(password("alice", "hunter2")).await.unwrap();

    let other_provider: CredentialRequestOptions = serde_json::from_value(json!({
        "federated": {"providers": ["https://other-idp.example"]}
    }))
    .unwrap();
    assert_eq!(container.get(other_provider).await, Ok(None));

    let same_provider: CredentialRequestOptions = serde_json::from_value(json!({
        "federated": {"providers": ["https://idp.example"]}
    }))
    .unwrap();
    assert_eq!(container.get(same_provider).await, Ok(Some(federated)));
}

#[tokio::test]
async fn public_key_credentials_cannot_be_stored() {
    let mut container = container(
        MockUserValidationMethod::verified_user(1),
        MockCredentialMediator::never_asked(),
    );
    let created = container.create(acme_creation_options()).await.unwrap();

    assert_eq!(
        container.store(created.unwrap()).await,
        Err(CredentialError::NotSupported)
    );
    assert!(container.password_store().is_empty());
}

#[tokio::test]
async fn create_password_credential() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::never_asked(),
    );

    let from_form = CredentialCreationOptions {
        password: Some(PasswordCredentialInit::Form(
            FormData::default()
                .field("username", "alice")
                .field("new-password", "hunter2"),
        )),
        ..Default::default()
    };
    assert_eq!(
        container.create(from_form).await,
        Ok(Some(password("alice", "hunter2")))
    );
    // creating does not store
    assert!(container.password_store().is_empty());

    let incomplete = CredentialCreationOptions {
        password: Some(PasswordCredentialInit::Form(
            FormData::default().field("username", "alice"),
        )),
        ..Default::default()
    };
    assert_eq!(
        container.create(incomplete).await,
        Err(CredentialError::MalformedRequest(
            MalformedRequest::CredentialData(CredentialInitError::MissingPassword)
        ))
    );
}

#[tokio::test]
async fn credential_data_of_another_origin_is_a_security_error() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::never_asked(),
    );
    let options = CredentialCreationOptions {
        password: Some(PasswordCredentialInit::Data(PasswordCredentialData {
            id: "alice".into(),
            name: None,
            icon_url: None,
            origin: "https://evil.example".into(),
            password: "hunter2".into(),
        })),
        ..Default::default()
    };

    assert_eq!(
        container.create(options).await,
        Err(CredentialError::Security(
            SecurityError::CredentialOriginMismatch
        ))
    );
}

#[tokio::test]
async fn creation_envelope_with_two_members_is_not_supported() {
    let mut container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::never_asked(),
    );
    let options = CredentialCreationOptions {
        password: Some(PasswordCredentialInit::Form(
            FormData::default()
                .field("username", "alice")
                .field("current-password", "hunter2"),
        )),
        ..acme_creation_options()
    };

    assert_eq!(
        container.create(options).await,
        Err(CredentialError::NotSupported)
    );
}

#[test]
fn platform_authenticator_availability() {
    let container = container(
        MockUserValidationMethod::verified_user(0),
        MockCredentialMediator::never_asked(),
    );
    assert!(container.is_user_verifying_platform_authenticator_available());

    let mut user = MockUserValidationMethod::new();
    user.expect_is_verification_enabled().returning(|| Some(false));
    let container = self::container(user, MockCredentialMediator::never_asked());
    assert!(!container.is_user_verifying_platform_authenticator_available());
}

#[tokio::test]
async fn sources_of_another_rp_are_not_used() {
    let mut store = MemoryStore::new();
    let source = PublicKeyCredentialSource {
        credential_id: vec![1u8; 16].into(),
        key: Default::default(),
        rp_id: "other.example".into(),
        user_handle: None,
        username: None,
        user_display_name: None,
        counter: None,
        discoverable: true,
    };
    store.insert(source.credential_id.to_vec(), source);
    let authenticator = Authenticator::new(
        Aaguid::new_empty(),
        store,
        MockUserValidationMethod::verified_user(1),
    );
    let mut container = CredentialsContainer::new(
        Url::parse(ORIGIN).unwrap(),
        authenticator,
        MockCredentialMediator::never_asked(),
        MemoryPasswordStore::new(),
    );

    let result = container.get(request_options(None)).await;

    assert_eq!(result, Err(CredentialError::NoEligibleAuthenticator));
    assert_eq!(container.authenticator().store().len(), 1);
}
