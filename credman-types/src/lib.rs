//! # Credman Types
//!
//! Rust type definitions for the [Credential Management] and [WebAuthn] data model.
//!
//! The model centers on the [`Credential`] union, whose variants are discriminated by their
//! `type` tag, and the two request envelopes handed to a credentials container:
//! [`CredentialRequestOptions`] for `get()` and [`CredentialCreationOptions`] for `create()`.
//!
//! Binary members (challenges, credential ids, attestation objects, ...) are carried as opaque
//! [`Bytes`]. Nothing in this crate parses authenticator data or verifies attestations.
//!
//! [Credential Management]: https://w3c.github.io/webappsec-credential-management/
//! [WebAuthn]: https://w3c.github.io/webauthn/

mod utils;

mod abort;
mod credential;
mod options;
pub mod webauthn;

// Re-exports
pub use self::{
    abort::{AbortController, AbortSignal},
    credential::*,
    options::*,
};
pub use utils::{
    bytes::{Bytes, NotBase64Encoded},
    crypto, encoding, rand,
};
