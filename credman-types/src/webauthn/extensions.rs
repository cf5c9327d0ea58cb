//! Extension inputs and outputs.
//!
//! Every extension has an independent optional input and an independent optional output. The
//! recognised extensions are typed members, anything else lands in the `unknown` maps untouched.
//!
//! <https://w3c.github.io/webauthn/#sctn-extensions>

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::Bytes;

/// Client extension inputs, keyed by extension identifier.
///
/// <https://w3c.github.io/webauthn/#dictdef-authenticationextensionsclientinputs>
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AuthenticationExtensionsClientInputs {
    /// FIDO AppID: the U2F application identifier of credentials registered with the legacy API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appid: Option<String>,

    /// Simple transaction authorization: a prompt string to show the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_auth_simple: Option<String>,

    /// Generic transaction authorization: typed content to show the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_auth_generic: Option<TxAuthGenericArg>,

    /// Authenticator selection: the AAGUIDs of the acceptable authenticators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authn_sel: Option<Vec<Bytes>>,

    /// Ask which extensions the authenticator supports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exts: Option<bool>,

    /// Ask for a user verification index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uvi: Option<bool>,

    /// Ask for the location of the client device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<bool>,

    /// Ask for the user verification methods used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uvm: Option<bool>,

    /// Ask for the properties of the created credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cred_props: Option<bool>,

    /// Acceptable biometric performance of the authenticator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biometric_perf_bounds: Option<AuthenticatorBiometricPerfBounds>,

    /// Extensions this crate does not recognise, in their original order.
    #[serde(flatten)]
    pub unknown: IndexMap<String, serde_json::Value>,
}

impl AuthenticationExtensionsClientInputs {
    /// The identifiers of every extension present in this input, recognised ones first.
    pub fn identifiers(&self) -> Vec<&str> {
        let known = [
            ("appid", self.appid.is_some()),
            ("txAuthSimple", self.tx_auth_simple.is_some()),
            ("txAuthGeneric", self.tx_auth_generic.is_some()),
            ("authnSel", self.authn_sel.is_some()),
            ("exts", self.exts.is_some()),
            ("uvi", self.uvi.is_some()),
            ("loc", self.loc.is_some()),
            ("uvm", self.uvm.is_some()),
            ("credProps", self.cred_props.is_some()),
            ("biometricPerfBounds", self.biometric_perf_bounds.is_some()),
        ];
        known
            .into_iter()
            .filter_map(|(id, present)| present.then_some(id))
            .chain(self.unknown.keys().map(String::as_str))
            .collect()
    }

    /// Whether no extension is requested.
    pub fn is_empty(&self) -> bool {
        self.identifiers().is_empty()
    }
}

/// Client extension outputs, keyed by extension identifier.
///
/// <https://w3c.github.io/webauthn/#dictdef-authenticationextensionsclientoutputs>
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AuthenticationExtensionsClientOutputs {
    /// Whether the AppID was used instead of the RP ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appid: Option<bool>,

    /// The prompt that was displayed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_auth_simple: Option<String>,

    /// Hash of the content that was displayed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_auth_generic: Option<Bytes>,

    /// Whether the authenticator selection list was honoured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authn_sel: Option<bool>,

    /// The extension identifiers the authenticator supports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exts: Option<Vec<String>>,

    /// The user verification index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uvi: Option<Bytes>,

    /// The location of the client device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Coordinates>,

    /// User verification methods: one `[method, key protection, matcher protection]` entry per
    /// factor. A flat list of numbers is read as one single-number entry per number.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::utils::serde::uvm_entries"
    )]
    pub uvm: Option<Vec<Vec<u32>>>,

    /// Properties of the created credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cred_props: Option<CredentialPropertiesOutput>,

    /// Whether the biometric performance bounds were honoured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biometric_perf_bounds: Option<bool>,

    /// Outputs of extensions this crate does not recognise.
    #[serde(flatten)]
    pub unknown: IndexMap<String, serde_json::Value>,
}

/// Input of the generic transaction authorization extension.
///
/// <https://www.w3.org/TR/webauthn-1/#sctn-generic-txauth-extension>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct TxAuthGenericArg {
    /// MIME type of [`Self::content`].
    pub content_type: String,
    /// The content to display.
    pub content: Bytes,
}

/// Geolocation of the client device, as the Geolocation API reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct Coordinates {
    /// Decimal degrees.
    pub latitude: f64,
    /// Decimal degrees.
    pub longitude: f64,
    /// Meters above the WGS84 ellipsoid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Meters.
    pub accuracy: f64,
    /// Meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_accuracy: Option<f64>,
    /// Degrees clockwise from true north.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    /// Meters per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

/// Bounds on the false acceptance and false rejection rates of a biometric authenticator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[typeshare]
pub struct AuthenticatorBiometricPerfBounds {
    /// Maximum false acceptance rate.
    #[serde(rename = "FAR", default, skip_serializing_if = "Option::is_none")]
    pub far: Option<f64>,
    /// Maximum false rejection rate.
    #[serde(rename = "FRR", default, skip_serializing_if = "Option::is_none")]
    pub frr: Option<f64>,
}

/// Output of the `credProps` extension.
///
/// <https://w3c.github.io/webauthn/#dictdef-credentialpropertiesoutput>
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare]
pub struct CredentialPropertiesOutput {
    /// Whether the created credential is client-side discoverable. Absent when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rk: Option<bool>,
}

/// Authenticator extension inputs, extension identifier to value.
pub type AuthenticationExtensionsAuthenticatorInputs = IndexMap<String, String>;
