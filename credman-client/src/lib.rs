//! # Credman Client
//!
//! This crate defines a [`CredentialsContainer`], the credential management capability a user
//! agent exposes to one origin: `get`, `store`, `create` and `prevent_silent_access`.
//!
//! Public key credentials are handled by an [`Authenticator`], while the container itself marshals
//! the request envelopes, checks the RP ID against the origin, builds the client data and bounds
//! every ceremony with an abort signal and a timeout. Password and federated credentials are kept
//! in a [`PasswordStore`] and handed out through a [`CredentialMediator`].
//!
//! This crate does not perform any networking with relying parties.
//!
//! [`Authenticator`]: credman_authenticator::Authenticator

mod container;
mod error;
mod extensions;
mod mediator;
mod password_store;
mod rp_id_verifier;
mod timeout;

pub use self::{
    container::CredentialsContainer,
    error::{CredentialError, SecurityError},
    mediator::{CredentialMediator, NoUserInterface},
    password_store::{MemoryPasswordStore, PasswordStore},
    rp_id_verifier::RpIdVerifier,
    timeout::TimeoutPolicy,
};

#[cfg(any(test, feature = "testable"))]
pub use self::mediator::MockCredentialMediator;
