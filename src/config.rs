//! Configuration types for the Workday client.

use crate::error::ClientError;
use crate::security::Credential;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for a client session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Credentials carried in the WS-Security header
    pub credentials: CredentialsConfig,

    /// Remote service location and protocol
    pub service: ServiceConfig,

    /// Transport settings
    pub settings: SettingsConfig,
}

impl ClientConfig {
    /// Parse a YAML document. Does not validate.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ClientError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML file. Does not validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Check that every field a session needs is present.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.credentials.username.trim().is_empty() {
            return Err(ClientError::Config("credentials.username is required".into()));
        }
        if self.credentials.password.is_empty() {
            return Err(ClientError::Config("credentials.password is required".into()));
        }

        let endpoint = self.service.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ClientError::Config("service.endpoint is required".into()));
        }
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ClientError::Config(format!(
                "service.endpoint must be an http(s) URL, got '{}'",
                endpoint
            )));
        }
        if self.service.api_version.trim().is_empty() {
            return Err(ClientError::Config("service.api_version is required".into()));
        }

        if self.settings.timeout_secs == 0 || self.settings.connect_timeout_secs == 0 {
            return Err(ClientError::Config("timeouts must be greater than zero".into()));
        }

        Ok(())
    }

    /// The immutable credential for this session.
    pub fn credential(&self) -> Credential {
        Credential::new(
            self.credentials.username.clone(),
            self.credentials.password.clone(),
            self.credentials.password_type,
        )
    }
}

/// WS-Security credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Integration system user, usually `user@tenant`
    pub username: String,

    /// Password in clear; digested per call when `password_type` is `PasswordDigest`
    pub password: String,

    /// How the password travels in the UsernameToken
    pub password_type: PasswordType,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("password_type", &self.password_type)
            .finish()
    }
}

/// WS-Security UsernameToken password types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PasswordType {
    /// Plain text password
    #[default]
    #[serde(rename = "PasswordText", alias = "PlainText")]
    PasswordText,
    /// Digested password (SHA-1 over nonce, created and password)
    #[serde(rename = "PasswordDigest", alias = "Digest")]
    PasswordDigest,
}

impl PasswordType {
    /// Value of the `Type` attribute on `wsse:Password`.
    pub fn type_uri(&self) -> &'static str {
        match self {
            Self::PasswordText => crate::security::PASSWORD_TEXT_URI,
            Self::PasswordDigest => crate::security::PASSWORD_DIGEST_URI,
        }
    }
}

impl std::str::FromStr for PasswordType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PasswordText" | "PlainText" => Ok(Self::PasswordText),
            "PasswordDigest" | "Digest" => Ok(Self::PasswordDigest),
            other => Err(ClientError::Config(format!(
                "unrecognized password type '{}'",
                other
            ))),
        }
    }
}

/// Remote service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// SOAP endpoint URL
    pub endpoint: String,

    /// Interface description location, informational only
    pub wsdl: Option<String>,

    /// Value of the `wd:version` attribute on request elements
    pub api_version: String,

    /// Envelope version used on the wire
    pub soap_version: SoapVersion,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            wsdl: None,
            api_version: "v40.1".to_string(),
            soap_version: SoapVersion::Soap11,
        }
    }
}

/// SOAP versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SoapVersion {
    /// SOAP 1.1 (namespace: http://schemas.xmlsoap.org/soap/envelope/)
    #[default]
    #[serde(rename = "1.1")]
    Soap11,
    /// SOAP 1.2 (namespace: http://www.w3.org/2003/05/soap-envelope)
    #[serde(rename = "1.2")]
    Soap12,
}

/// Transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Log raw request and response bodies at debug level
    pub debug_transport: bool,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            debug_transport: false,
            timeout_secs: 60,
            connect_timeout_secs: 10,
        }
    }
}
