//! Client extension processing.
//!
//! Only `credProps` (registration) and `appid` (authentication) produce outputs. Every other
//! extension, recognised or not, is ignored without an output as WebAuthn requires.

use credman_types::webauthn::{
    AuthenticationExtensionsClientInputs, AuthenticationExtensionsClientOutputs,
    CredentialPropertiesOutput,
};

fn log_ignored(inputs: &AuthenticationExtensionsClientInputs, supported: &str) {
    for id in inputs.identifiers() {
        if id != supported {
            log::debug!("ignoring unsupported extension {id}");
        }
    }
}

/// Outputs of a registration creating a credential that is `discoverable` or not.
pub(crate) fn registration_outputs(
    inputs: Option<&AuthenticationExtensionsClientInputs>,
    discoverable: bool,
) -> AuthenticationExtensionsClientOutputs {
    let Some(inputs) = inputs else {
        return Default::default();
    };
    log_ignored(inputs, "credProps");

    AuthenticationExtensionsClientOutputs {
        cred_props: (inputs.cred_props == Some(true)).then_some(CredentialPropertiesOutput {
            rk: Some(discoverable),
        }),
        ..Default::default()
    }
}

/// Outputs of an authentication, which always uses the RP ID rather than a legacy AppID.
pub(crate) fn assertion_outputs(
    inputs: Option<&AuthenticationExtensionsClientInputs>,
) -> AuthenticationExtensionsClientOutputs {
    let Some(inputs) = inputs else {
        return Default::default();
    };
    log_ignored(inputs, "appid");

    AuthenticationExtensionsClientOutputs {
        appid: inputs.appid.as_ref().map(|_| false),
        ..Default::default()
    }
}
