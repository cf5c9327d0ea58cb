//! # Credman
//!
//! `credman` is a collection of Rust libraries implementing the [Credential Management][credman]
//! API of a user agent together with the [WebAuthn][webauthn-3] public key credentials it carries.
//! It is comprised of three sub-libraries:
//!
//! - `credman-client` - a library, usable as [`client`], which implements the credentials
//!   container: `get`, `store`, `create` and `preventSilentAccess` on behalf of one origin.
//! - `credman-authenticator` - a library, usable as [`authenticator`], which implements a software
//!   authenticator for the `public-key` credential type.
//! - `credman-types` - type definitions, usable as [`types`], for the request envelopes,
//!   credentials and WebAuthn dictionaries.
//!
//! Much of the type naming in these libraries refers directly to the terms used in the two
//! standards, being familiar with their terminology will greatly aid your understanding.
//!
//! Examples in this documentation show values assumed to come from a website (the Relying Party).
//! How these values and the resulting credentials travel between your application and the
//! Relying Party is outside the scope of these libraries.
//!
//! ## Basic Concepts
//!
//! A [`CredentialsContainer`](client::CredentialsContainer) acts for a single origin. It handles
//! three kinds of credentials:
//!
//! - password credentials, a username and password pair,
//! - federated credentials, a sign in at an identity provider,
//! - public key credentials, created and exercised by an authenticator.
//!
//! The first two are kept in a [`PasswordStore`](client::PasswordStore) and handed out either
//! silently or through a [`CredentialMediator`](client::CredentialMediator), the account chooser.
//! Public key credentials are delegated to an [`Authenticator`](authenticator::Authenticator):
//!
//! RelyingParty <-> [`CredentialsContainer`](client::CredentialsContainer) <->
//! [`Authenticator`](authenticator::Authenticator) <->
//! [`CredentialStore`](authenticator::CredentialStore)
//!
//! The [`Authenticator`](authenticator::Authenticator) performs the cryptographic operations:
//!
//! - [`make_credential()`](authenticator::Authenticator::make_credential()) - creates a credential.
//! - [`get_assertion()`](authenticator::Authenticator::get_assertion()) - signs a challenge with
//!   an existing credential.
//!
//! It does not store credentials itself but relies on a type implementing
//! [`CredentialStore`](authenticator::CredentialStore), such as the in-memory
//! [`MemoryStore`](authenticator::MemoryStore). User consent is collected by a
//! [`UserValidationMethod`](authenticator::UserValidationMethod) you provide.
//!
//! A runnable demonstration binary is provided in `credman/examples/usage.rs`.
//!
//! [credman]: https://w3c.github.io/webappsec-credential-management/
//! [webauthn-3]: https://www.w3.org/TR/webauthn-3/
//!
//! ### Example: Registering and authenticating through a container
//!
//! ```
//! use credman::{
//!     authenticator::{
//!         Aaguid, Authenticator, AuthenticatorError, MemoryStore, UiHint, UserCheck,
//!         UserValidationMethod,
//!     },
//!     client::{CredentialsContainer, MemoryPasswordStore, NoUserInterface},
//!     types::{
//!         rand::random_vec, webauthn::*, Credential, CredentialCreationOptions,
//!         CredentialRequestOptions,
//!     },
//! };
//! use url::Url;
//!
//! // A user that accepts every prompt.
//! struct AlwaysYes;
//!
//! #[async_trait::async_trait]
//! impl UserValidationMethod for AlwaysYes {
//!     async fn check_user<'a>(
//!         &self,
//!         _hint: UiHint<'a>,
//!         presence: bool,
//!         verification: bool,
//!     ) -> Result<UserCheck, AuthenticatorError> {
//!         Ok(UserCheck { presence, verification })
//!     }
//!
//!     fn is_presence_enabled(&self) -> bool {
//!         true
//!     }
//!
//!     fn is_verification_enabled(&self) -> Option<bool> {
//!         Some(true)
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let origin = Url::parse("https://acme.example").expect("Should parse");
//! let authenticator = Authenticator::new(Aaguid::new_empty(), MemoryStore::new(), AlwaysYes);
//! let mut container = CredentialsContainer::new(
//!     origin,
//!     authenticator,
//!     NoUserInterface,
//!     MemoryPasswordStore::new(),
//! );
//!
//! // The following values would usually be sent by the Relying Party.
//! let creation = PublicKeyCredentialCreationOptions {
//!     rp: PublicKeyCredentialRpEntity {
//!         id: None, // the origin's effective domain
//!         name: "ACME".into(),
//!         icon: None,
//!     },
//!     user: PublicKeyCredentialUserEntity {
//!         id: random_vec(16).into(),
//!         name: "alice@acme.example".into(),
//!         display_name: "Alice".into(),
//!         icon: None,
//!     },
//!     challenge: random_vec(32).into(),
//!     pub_key_cred_params: PublicKeyCredentialParameters::default_algorithms(),
//!     timeout: None,
//!     exclude_credentials: None,
//!     authenticator_selection: Some(AuthenticatorSelectionCriteria {
//!         resident_key: Some(ResidentKeyRequirement::Required),
//!         ..Default::default()
//!     }),
//!     attestation: AttestationConveyancePreference::None,
//!     extensions: None,
//! };
//! let created = container
//!     .create(CredentialCreationOptions::from(creation))
//!     .await
//!     .unwrap();
//! assert!(matches!(created, Some(Credential::PublicKey(_))));
//!
//! // The credential is discoverable, so the Relying Party does not need to name it.
//! let request = PublicKeyCredentialRequestOptions::new(random_vec(32));
//! let assertion = container
//!     .get(CredentialRequestOptions::from(request))
//!     .await
//!     .unwrap();
//! assert!(matches!(assertion, Some(Credential::PublicKey(_))));
//! # })
//! ```
//!
//! ### Example: Using the Authenticator on its own
//!
//! The client data hash and RP ID are normally produced by the container. Here they are made up.
//!
//! ```
//! # use credman::{
//! #     authenticator::{
//! #         get_assertion, make_credential, Aaguid, Authenticator, AuthenticatorError,
//! #         MemoryStore, Options, UiHint, UserCheck, UserValidationMethod,
//! #     },
//! #     types::{crypto::sha256, rand::random_vec, webauthn::*, Bytes},
//! # };
//! # use coset::iana;
//! #
//! # struct AlwaysYes;
//! # #[async_trait::async_trait]
//! # impl UserValidationMethod for AlwaysYes {
//! #     async fn check_user<'a>(
//! #         &self,
//! #         _hint: UiHint<'a>,
//! #         presence: bool,
//! #         verification: bool,
//! #     ) -> Result<UserCheck, AuthenticatorError> {
//! #         Ok(UserCheck { presence, verification })
//! #     }
//! #
//! #     fn is_presence_enabled(&self) -> bool {
//! #         true
//! #     }
//! #
//! #     fn is_verification_enabled(&self) -> Option<bool> {
//! #         Some(true)
//! #     }
//! # }
//! #
//! # tokio_test::block_on(async {
//! let client_data_hash: Bytes = sha256(b"client data").to_vec().into();
//! let rp_id = String::from("acme.example");
//! let mut authenticator = Authenticator::new(Aaguid::new_empty(), MemoryStore::new(), AlwaysYes);
//!
//! let created = authenticator
//!     .make_credential(make_credential::Request {
//!         client_data_hash: client_data_hash.clone(),
//!         rp_id: rp_id.clone(),
//!         rp: PublicKeyCredentialRpEntity {
//!             id: Some(rp_id.clone()),
//!             name: "ACME".into(),
//!             icon: None,
//!         },
//!         user: PublicKeyCredentialUserEntity {
//!             id: random_vec(16).into(),
//!             name: "alice@acme.example".into(),
//!             display_name: "Alice".into(),
//!             icon: None,
//!         },
//!         pub_key_cred_params: vec![PublicKeyCredentialParameters::public_key(
//!             iana::Algorithm::ES256,
//!         )],
//!         exclude_list: None,
//!         options: Options { rk: true, up: true, uv: true },
//!     })
//!     .await
//!     .unwrap();
//!
//! let response = authenticator
//!     .get_assertion(get_assertion::Request {
//!         rp_id,
//!         client_data_hash,
//!         allow_list: None,
//!         options: Options { rk: false, up: true, uv: true },
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(response.credential_id.as_slice(), created.credential_id());
//! # })
//! ```

pub use credman_authenticator as authenticator;
pub use credman_client as client;
pub use credman_types as types;
