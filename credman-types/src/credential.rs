//! The credential union and the records password and federated credentials are built from.
//!
//! <https://w3c.github.io/webappsec-credential-management/#the-credential-interface>

use std::fmt;

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::webauthn::PublicKeyCredential;


/// The discriminator of [`Credential`], its `type` member on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[typeshare(serialized_as = "String")]
pub enum CredentialType {
    /// `"password"`
    Password,
    /// `"federated"`
    Federated,
    /// `"public-key"`
    PublicKey,
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CredentialType::Password => "password",
            CredentialType::Federated => "federated",
            CredentialType::PublicKey => "public-key",
        })
    }
}

/// A credential of any of the three kinds a credentials container deals with.
///
/// The `type` member selects the variant so a serialized credential only ever carries the members
/// of its own kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Credential {
    /// A username and password pair.
    #[serde(rename = "password")]
    Password(PasswordCredential),
    /// An assertion that the user signed in with a federated identity provider.
    #[serde(rename = "federated")]
    Federated(FederatedCredential),
    /// The result of a WebAuthn ceremony.
    #[serde(rename = "public-key")]
    PublicKey(PublicKeyCredential),
}

impl Credential {
    /// The credential's identifier. A username for passwords, the account identifier at the
    /// provider for federated credentials, the base64url credential ID for public keys.
    pub fn id(&self) -> &str {
        match self {
            Credential::Password(c) => &c.id,
            Credential::Federated(c) => &c.id,
            Credential::PublicKey(c) => &c.id,
        }
    }

    /// The kind of this credential.
    pub fn ty(&self) -> CredentialType {
        match self {
            Credential::Password(_) => CredentialType::Password,
            Credential::Federated(_) => CredentialType::Federated,
            Credential::PublicKey(_) => CredentialType::PublicKey,
        }
    }

    /// Display data shared by password and federated credentials.
    pub fn user_data(&self) -> Option<&CredentialUserData> {
        match self {
            Credential::Password(c) => Some(&c.user_data),
            Credential::Federated(c) => Some(&c.user_data),
            Credential::PublicKey(_) => None,
        }
    }
}

impl From<PasswordCredential> for Credential {
    fn from(value: PasswordCredential) -> Self {
        Credential::Password(value)
    }
}

impl From<FederatedCredential> for Credential {
    fn from(value: FederatedCredential) -> Self {
        Credential::Federated(value)
    }
}

impl From<PublicKeyCredential> for Credential {
    fn from(value: PublicKeyCredential) -> Self {
        Credential::PublicKey(value)
    }
}

/// Display data that helps the user pick a credential in an account chooser.
///
/// <https://w3c.github.io/webappsec-credential-management/#credentialuserdata>
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare]
pub struct CredentialUserData {
    /// A human-readable name for the account. Empty when unknown.
    #[serde(default)]
    pub name: String,

    /// A URL pointing to an image for the account. Empty when unknown.
    #[serde(rename = "iconURL", default)]
    pub icon_url: String,
}

/// A username and password pair. Build one with [`PasswordCredential::new`] or
/// [`PasswordCredential::from_form`].
///
/// <https://w3c.github.io/webappsec-credential-management/#passwordcredential-interface>
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare]
pub struct PasswordCredential {
    /// The username.
    pub id: String,

    /// The password.
    pub password: String,

    /// Display data.
    #[serde(flatten)]
    pub user_data: CredentialUserData,
}

impl fmt::Debug for PasswordCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredential")
            .field("id", &self.id)
            .field("password", &"<redacted>")
            .field("user_data", &self.user_data)
            .finish()
    }
}

impl PasswordCredential {
    /// Build a password credential from a data record.
    pub fn new(data: PasswordCredentialData) -> Result<Self, CredentialInitError> {
        if data.id.is_empty() {
            return Err(CredentialInitError::MissingId);
        }
        if data.password.is_empty() {
            return Err(CredentialInitError::MissingPassword);
        }
        if data.origin.is_empty() {
            return Err(CredentialInitError::MissingOrigin);
        }
        Ok(Self {
            id: data.id,
            password: data.password,
            user_data: CredentialUserData {
                name: data.name.unwrap_or_default(),
                icon_url: data.icon_url.unwrap_or_default(),
            },
        })
    }

    /// Build a password credential from the fields of a sign-in or sign-up form submitted at
    /// `origin`.
    pub fn from_form(form: &FormData, origin: &str) -> Result<Self, CredentialInitError> {
        Self::new(form.to_password_data(origin))
    }
}

/// The record a [`PasswordCredential`] is built from.
///
/// <https://w3c.github.io/webappsec-credential-management/#dictdef-passwordcredentialdata>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PasswordCredentialData {
    /// The username.
    pub id: String,

    /// A human-readable name for the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// A URL pointing to an image for the account.
    #[serde(rename = "iconURL", default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    /// The origin the credential belongs to.
    pub origin: String,

    /// The password.
    pub password: String,
}

/// Either a data record or a submitted form.
///
/// <https://w3c.github.io/webappsec-credential-management/#typedefdef-passwordcredentialinit>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PasswordCredentialInit {
    /// An explicit record.
    Data(PasswordCredentialData),
    /// A form whose fields are described by their autocomplete tokens.
    Form(FormData),
}

impl PasswordCredentialInit {
    /// The origin the init source claims, forms always belong to the submitting origin.
    pub fn origin(&self) -> Option<&str> {
        match self {
            PasswordCredentialInit::Data(data) => Some(&data.origin),
            PasswordCredentialInit::Form(_) => None,
        }
    }

    /// Build the credential, taking `origin` as the origin of a form.
    pub fn into_credential(self, origin: &str) -> Result<PasswordCredential, CredentialInitError> {
        match self {
            PasswordCredentialInit::Data(data) => PasswordCredential::new(data),
            PasswordCredentialInit::Form(form) => PasswordCredential::from_form(&form, origin),
        }
    }
}

impl From<PasswordCredentialData> for PasswordCredentialInit {
    fn from(value: PasswordCredentialData) -> Self {
        PasswordCredentialInit::Data(value)
    }
}

impl From<FormData> for PasswordCredentialInit {
    fn from(value: FormData) -> Self {
        PasswordCredentialInit::Form(value)
    }
}

/// The submitted controls of a form, each tagged with its `autocomplete` attribute.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare]
pub struct FormData {
    /// The form's controls, in tree order.
    pub fields: Vec<FormField>,
}

/// A single form control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare]
pub struct FormField {
    /// The control's `autocomplete` attribute, e.g. `section-login username`.
    pub autocomplete: String,
    /// The submitted value.
    pub value: String,
}

impl FormData {
    /// Append a control.
    pub fn field(mut self, autocomplete: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(FormField {
            autocomplete: autocomplete.into(),
            value: value.into(),
        });
        self
    }

    /// The first non empty value of a control whose autocomplete detail token is one of `tokens`,
    /// in order of `tokens`.
    fn value_of(&self, tokens: &[&str]) -> Option<&str> {
        tokens.iter().find_map(|token| {
            self.fields
                .iter()
                .filter(|f| f.autocomplete.split_ascii_whitespace().last() == Some(*token))
                .map(|f| f.value.as_str())
                .find(|v| !v.is_empty())
        })
    }

    /// Read the form into a data record. A `new-password` control wins over a `current-password`
    /// one so sign-up and password change forms store the new value.
    ///
    /// <https://w3c.github.io/webappsec-credential-management/#abstract-opdef-create-a-passwordcredential-from-an-htmlformelement>
    pub fn to_password_data(&self, origin: &str) -> PasswordCredentialData {
        PasswordCredentialData {
            id: self.value_of(&["username"]).unwrap_or_default().to_owned(),
            name: self.value_of(&["name", "nickname"]).map(str::to_owned),
            icon_url: self.value_of(&["photo"]).map(str::to_owned),
            origin: origin.to_owned(),
            password: self
                .value_of(&["new-password", "current-password"])
                .unwrap_or_default()
                .to_owned(),
        }
    }
}

/// A sign in with a federated identity provider.
///
/// <https://w3c.github.io/webappsec-credential-management/#federatedcredential-interface>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare]
pub struct FederatedCredential {
    /// The account identifier at the provider.
    pub id: String,

    /// The origin of the identity provider, e.g. `https://accounts.example.com`.
    pub provider: String,

    /// The protocol spoken with the provider, e.g. `openidconnect`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    /// Display data.
    #[serde(flatten)]
    pub user_data: CredentialUserData,
}

impl FederatedCredential {
    /// Build a federated credential from its init record.
    pub fn new(init: FederatedCredentialInit) -> Result<Self, CredentialInitError> {
        if init.id.is_empty() {
            return Err(CredentialInitError::MissingId);
        }
        if init.provider.is_empty() {
            return Err(CredentialInitError::MissingProvider);
        }
        if init.origin.is_empty() {
            return Err(CredentialInitError::MissingOrigin);
        }
        Ok(Self {
            id: init.id,
            provider: init.provider,
            protocol: init.protocol.filter(|p| !p.is_empty()),
            user_data: CredentialUserData {
                name: init.name.unwrap_or_default(),
                icon_url: init.icon_url.unwrap_or_default(),
            },
        })
    }
}

/// The record a [`FederatedCredential`] is built from.
///
/// <https://w3c.github.io/webappsec-credential-management/#dictdef-federatedcredentialinit>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct FederatedCredentialInit {
    /// The account identifier at the provider.
    pub id: String,

    /// A human-readable name for the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// A URL pointing to an image for the account.
    #[serde(rename = "iconURL", default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    /// The origin the credential belongs to.
    pub origin: String,

    /// The origin of the identity provider.
    pub provider: String,

    /// The protocol spoken with the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// A password or federated credential could not be built from its init record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[typeshare]
pub enum CredentialInitError {
    /// `id` is empty, or a form has no `username` control.
    MissingId,
    /// `password` is empty, or a form has neither a `new-password` nor a `current-password`
    /// control.
    MissingPassword,
    /// `origin` is empty.
    MissingOrigin,
    /// `provider` is empty.
    MissingProvider,
}

impl fmt::Display for CredentialInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CredentialInitError::MissingId => "the credential id is empty",
            CredentialInitError::MissingPassword => "the password is empty",
            CredentialInitError::MissingOrigin => "the origin is empty",
            CredentialInitError::MissingProvider => "the provider is empty",
        })
    }
}

impl std::error::Error for CredentialInitError {}
