use std::sync::Arc;

use coset::{iana, CoseKey};
use credman_types::{
    rand::random_vec,
    webauthn::{
        PublicKeyCredentialDescriptor, PublicKeyCredentialParameters, PublicKeyCredentialRpEntity,
        PublicKeyCredentialUserEntity,
    },
    Bytes,
};
use tokio::sync::Mutex;

use super::*;
use crate::{
    public_key_der_from_cose_key, Aaguid, Flags, MemoryStore, MockUiHint,
    MockUserValidationMethod,
};

fn good_request() -> Request {
    Request {
        client_data_hash: random_vec(32).into(),
        rp_id: "acme.example".into(),
        rp: PublicKeyCredentialRpEntity {
            id: Some("acme.example".into()),
            name: "ACME".into(),
            icon: None,
        },
        user: PublicKeyCredentialUserEntity {
            id: random_vec(16).into(),
            name: "alice@acme.example".into(),
            display_name: "Alice".into(),
            icon: None,
        },
        pub_key_cred_params: vec![PublicKeyCredentialParameters::public_key(
            iana::Algorithm::ES256,
        )],
        exclude_list: None,
        options: Options {
            rk: true,
            up: true,
            uv: true,
        },
    }
}

#[tokio::test]
async fn assert_storage_on_success() {
    let shared_store = Arc::new(Mutex::new(MemoryStore::new()));
    let user_mock = MockUserValidationMethod::verified_user(1);

    let mut authenticator =
        Authenticator::new(Aaguid::new_empty(), shared_store.clone(), user_mock);

    let response = authenticator
        .make_credential(good_request())
        .await
        .expect("error happened while trying to make a new credential");

    let store = shared_store.lock().await;
    assert_eq!(store.len(), 1);
    let stored = store
        .get(response.credential_id())
        .expect("credential stored under its id");
    assert_eq!(stored.rp_id, "acme.example");
    assert!(stored.discoverable);
    assert_eq!(stored.counter, None);
}

#[tokio::test]
async fn response_carries_flags_and_public_key() {
    let request = good_request();
    let user = request.user.clone();
    let rp = request.rp.clone();
    let mut authenticator = Authenticator::new(
        Aaguid::new_empty(),
        MemoryStore::new(),
        MockUserValidationMethod::verified_user_with_hint(
            1,
            MockUiHint::RequestNewCredential(user, rp),
        ),
    );

    let response = authenticator.make_credential(request).await.unwrap();

    assert_eq!(response.algorithm, iana::Algorithm::ES256);
    assert_eq!(response.credential_id().len(), 16);
    assert_eq!(
        response.auth_data.flags,
        Flags::UP | Flags::UV | Flags::AT
    );
    let acd = response
        .auth_data
        .attested_credential_data
        .as_ref()
        .expect("registration carries the new credential");
    public_key_der_from_cose_key(&acd.key).expect("public key to convert to DER");

    // the attestation object wraps the same authenticator data
    let object = response.attestation_object().unwrap();
    let auth_data = response.auth_data_bytes().unwrap();
    assert!(object
        .windows(auth_data.len())
        .any(|window| window == auth_data.as_slice()));
}

#[tokio::test]
async fn assert_excluded_credentials() {
    let cred_id: Bytes = random_vec(16).into();
    let request = Request {
        exclude_list: Some(vec![PublicKeyCredentialDescriptor::public_key(
            cred_id.clone(),
        )]),
        ..good_request()
    };
    let source = PublicKeyCredentialSource {
        credential_id: cred_id.clone(),
        // contents of key doesn't matter, only the id
        key: CoseKey::default(),
        rp_id: "acme.example".into(),
        user_handle: Some(request.user.id.clone()),
        username: None,
        user_display_name: None,
        counter: None,
        discoverable: false,
    };
    let shared_store = Arc::new(Mutex::new(MemoryStore::new()));
    shared_store
        .lock()
        .await
        .insert(cred_id.into(), source.clone());
    let user_mock = MockUserValidationMethod::verified_user_with_hint(
        1,
        MockUiHint::InformExcludedCredentialFound(source),
    );

    let mut authenticator =
        Authenticator::new(Aaguid::new_empty(), shared_store.clone(), user_mock);

    let err = authenticator
        .make_credential(request)
        .await
        .expect_err("make credential succeeded even though store contains excluded id");

    assert_eq!(err, AuthenticatorError::CredentialExcluded);
    assert_eq!(shared_store.lock().await.len(), 1);
}

#[tokio::test]
async fn excluded_credential_of_another_rp_is_ignored() {
    let cred_id: Bytes = random_vec(16).into();
    let mut store = MemoryStore::new();
    store.insert(
        cred_id.to_vec(),
        PublicKeyCredentialSource {
            credential_id: cred_id.clone(),
            key: CoseKey::default(),
            rp_id: "other.example".into(),
            user_handle: None,
            username: None,
            user_display_name: None,
            counter: None,
            discoverable: false,
        },
    );
    let mut authenticator = Authenticator::new(
        Aaguid::new_empty(),
        store,
        MockUserValidationMethod::verified_user(1),
    );

    let request = Request {
        exclude_list: Some(vec![PublicKeyCredentialDescriptor::public_key(cred_id)]),
        ..good_request()
    };

    authenticator
        .make_credential(request)
        .await
        .expect("exclusion is scoped to the RP ID");
    assert_eq!(authenticator.store().len(), 2);
}

#[tokio::test]
async fn assert_unsupported_algorithm() {
    let user_mock = MockUserValidationMethod::verified_user(0);
    let mut authenticator = Authenticator::new(Aaguid::new_empty(), MemoryStore::new(), user_mock);

    let request = Request {
        pub_key_cred_params: vec![PublicKeyCredentialParameters::public_key(
            iana::Algorithm::RSAES_OAEP_SHA_256,
        )],
        ..good_request()
    };

    let err = authenticator
        .make_credential(request)
        .await
        .expect_err("Succeeded with an unsupported algorithm");

    assert_eq!(err, AuthenticatorError::UnsupportedAlgorithm);
    assert!(authenticator.store().is_empty());
}

#[tokio::test]
async fn refused_consent_stores_nothing() {
    let mut authenticator = Authenticator::new(
        Aaguid::new_empty(),
        MemoryStore::new(),
        MockUserValidationMethod::refusing_user(),
    );

    let err = authenticator
        .make_credential(good_request())
        .await
        .expect_err("created a credential without consent");

    assert_eq!(err, AuthenticatorError::OperationDenied);
    assert!(authenticator.store().is_empty());
}

#[tokio::test]
async fn make_credential_counter_is_some_0_when_counters_are_enabled() {
    // Arrange
    let shared_store = Arc::new(Mutex::new(None));
    let user_mock = MockUserValidationMethod::verified_user(1);
    let request = good_request();
    let mut authenticator =
        Authenticator::new(Aaguid::new_empty(), shared_store.clone(), user_mock);
    authenticator.set_make_credentials_with_signature_counter(true);

    // Act
    let response = authenticator.make_credential(request).await.unwrap();

    // Assert
    let store = shared_store.lock().await;
    assert_eq!(store.as_ref().and_then(|c| c.counter).unwrap(), 0);
    assert_eq!(response.auth_data.counter, Some(0));
}

#[tokio::test]
async fn new_discoverable_credential_replaces_the_previous_one() {
    let request = good_request();
    let mut authenticator = Authenticator::new(
        Aaguid::new_empty(),
        MemoryStore::new(),
        MockUserValidationMethod::verified_user(2),
    );

    authenticator.make_credential(request.clone()).await.unwrap();
    let second = authenticator.make_credential(request).await.unwrap();

    let store = authenticator.store();
    assert_eq!(store.len(), 1);
    assert!(store.contains_key(second.credential_id()));
}
