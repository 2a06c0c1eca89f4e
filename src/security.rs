//! WS-Security UsernameToken generation.
//!
//! A fresh [`SecurityHeader`] is built for every call: new nonce, new
//! timestamp, and in digest mode a new password digest. Headers are never
//! cached or reused.

use crate::config::PasswordType;
use crate::envelope::{end, start, text_element};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use quick_xml::events::BytesStart;
use quick_xml::Writer;
use rand::rngs::OsRng;
use rand::RngCore;
use sha1::{Digest, Sha1};

pub const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
pub const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
pub const PASSWORD_TEXT_URI: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordText";
pub const PASSWORD_DIGEST_URI: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordDigest";
pub const BASE64_BINARY_URI: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary";

/// `Created` timestamp layout, always UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Nonce length in bytes.
pub const NONCE_LEN: usize = 16;

/// Session credential. Immutable once the client is built.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    username: String,
    password: String,
    password_type: PasswordType,
}

impl Credential {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        password_type: PasswordType,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            password_type,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn password_type(&self) -> PasswordType {
        self.password_type
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("password_type", &self.password_type)
            .finish()
    }
}

/// Single-use random value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    /// Draw a new nonce from the operating system RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Base64 form carried in `wsse:Nonce`.
    pub fn encoded(&self) -> String {
        STANDARD.encode(self.0)
    }
}

/// Compute `base64(SHA1(nonce || created || password))`.
///
/// The nonce enters the hash as raw bytes, not as its base64 text.
pub fn password_digest(nonce: &[u8], created: &str, password: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(nonce);
    hasher.update(created.as_bytes());
    hasher.update(password.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// Format an instant the way `wsu:Created` expects it.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Authentication header for exactly one call.
#[derive(Clone, PartialEq, Eq)]
pub struct SecurityHeader {
    username: String,
    password_type: PasswordType,
    password_value: String,
    nonce: Nonce,
    created: Option<String>,
}

impl SecurityHeader {
    /// Build a header with a fresh nonce and the current time.
    pub fn build(credential: &Credential) -> Self {
        Self::with_nonce(credential, Nonce::generate(), Utc::now())
    }

    /// Build a header from an explicit nonce and instant.
    pub fn with_nonce(credential: &Credential, nonce: Nonce, instant: DateTime<Utc>) -> Self {
        match credential.password_type() {
            PasswordType::PasswordDigest => {
                let created = format_timestamp(instant);
                let digest = password_digest(nonce.as_bytes(), &created, credential.password());
                Self {
                    username: credential.username().to_string(),
                    password_type: PasswordType::PasswordDigest,
                    password_value: digest,
                    nonce,
                    created: Some(created),
                }
            }
            // Some servers insist on a nonce even for plain text tokens.
            PasswordType::PasswordText => Self {
                username: credential.username().to_string(),
                password_type: PasswordType::PasswordText,
                password_value: credential.password().to_string(),
                nonce,
                created: None,
            },
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_type(&self) -> PasswordType {
        self.password_type
    }

    /// Plain password or digest, depending on the mode.
    pub fn password_value(&self) -> &str {
        &self.password_value
    }

    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    /// `wsu:Created` value, present in digest mode only.
    pub fn created(&self) -> Option<&str> {
        self.created.as_deref()
    }

    /// Write the `wsse:Security` element.
    ///
    /// `envelope_prefix` is the prefix bound to the SOAP envelope namespace,
    /// used for the `mustUnderstand` attribute.
    pub fn write_xml<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
        envelope_prefix: &str,
    ) -> Result<(), quick_xml::Error> {
        let must_understand = format!("{}:mustUnderstand", envelope_prefix);
        let mut security = BytesStart::new("wsse:Security");
        security.push_attribute(("xmlns:wsse", WSSE_NS));
        security.push_attribute(("xmlns:wsu", WSU_NS));
        security.push_attribute((must_understand.as_str(), "1"));
        start(writer, security)?;

        start(writer, BytesStart::new("wsse:UsernameToken"))?;
        text_element(writer, BytesStart::new("wsse:Username"), &self.username)?;

        let mut password = BytesStart::new("wsse:Password");
        password.push_attribute(("Type", self.password_type.type_uri()));
        text_element(writer, password, &self.password_value)?;

        let mut nonce = BytesStart::new("wsse:Nonce");
        nonce.push_attribute(("EncodingType", BASE64_BINARY_URI));
        text_element(writer, nonce, &self.nonce.encoded())?;

        if let Some(ref created) = self.created {
            text_element(writer, BytesStart::new("wsu:Created"), created)?;
        }

        end(writer, "wsse:UsernameToken")?;
        end(writer, "wsse:Security")?;
        Ok(())
    }
}

impl std::fmt::Debug for SecurityHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityHeader")
            .field("username", &self.username)
            .field("password_type", &self.password_type)
            .field("password_value", &"<redacted>")
            .field("nonce", &self.nonce.encoded())
            .field("created", &self.created)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn digest_credential() -> Credential {
        Credential::new("isu_hr@acme", "secret", PasswordType::PasswordDigest)
    }

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn render(header: &SecurityHeader) -> String {
        let mut writer = Writer::new(Vec::new());
        header.write_xml(&mut writer, "SOAP-ENV").unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_password_digest_known_vector() {
        let digest = password_digest(b"0123456789abcdef", "2026-01-01T00:00:00Z", "secret");
        assert_eq!(digest, "AHdjPQqhLugJUej2bfmGQqPj3Vo=");

        let nonce: Vec<u8> = (0u8..16).collect();
        let digest = password_digest(&nonce, "2024-03-15T12:30:45Z", "Tr0ub4dor&3");
        assert_eq!(digest, "47L9+juqppMXvy3sehQseWVOc/c=");
    }

    #[test]
    fn test_password_digest_deterministic() {
        let a = password_digest(b"nonce", "2026-01-01T00:00:00Z", "pw");
        let b = password_digest(b"nonce", "2026-01-01T00:00:00Z", "pw");
        assert_eq!(a, b);
        assert_ne!(a, password_digest(b"nonce", "2026-01-01T00:00:01Z", "pw"));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(fixed_instant()), "2026-01-01T00:00:00Z");
    }

    #[test]
    fn test_digest_header() {
        let nonce = Nonce::from_bytes(*b"0123456789abcdef");
        let header = SecurityHeader::with_nonce(&digest_credential(), nonce, fixed_instant());

        assert_eq!(header.username(), "isu_hr@acme");
        assert_eq!(header.password_value(), "AHdjPQqhLugJUej2bfmGQqPj3Vo=");
        assert_eq!(header.nonce().encoded(), "MDEyMzQ1Njc4OWFiY2RlZg==");
        assert_eq!(header.created(), Some("2026-01-01T00:00:00Z"));
    }

    #[test]
    fn test_plaintext_header_has_nonce_but_no_created() {
        let credential = Credential::new("isu_hr@acme", "secret", PasswordType::PasswordText);
        let header = SecurityHeader::build(&credential);

        assert_eq!(header.password_value(), "secret");
        assert_eq!(header.password_type(), PasswordType::PasswordText);
        assert!(header.created().is_none());
        assert_eq!(header.nonce().as_bytes().len(), NONCE_LEN);

        let xml = render(&header);
        assert!(xml.contains("#PasswordText"));
        assert!(!xml.contains("wsu:Created"));
        assert!(xml.contains("<wsse:Nonce"));
    }

    #[test]
    fn test_consecutive_builds_use_fresh_nonces() {
        let credential = digest_credential();
        let first = SecurityHeader::build(&credential);
        let second = SecurityHeader::build(&credential);
        assert_ne!(first.nonce(), second.nonce());
        assert_ne!(first.password_value(), second.password_value());
    }

    #[test]
    fn test_write_xml_digest() {
        let nonce = Nonce::from_bytes(*b"0123456789abcdef");
        let header = SecurityHeader::with_nonce(&digest_credential(), nonce, fixed_instant());
        let xml = render(&header);

        assert!(xml.starts_with("<wsse:Security"));
        assert!(xml.contains(r#"SOAP-ENV:mustUnderstand="1""#));
        assert!(xml.contains("<wsse:Username>isu_hr@acme</wsse:Username>"));
        assert!(xml.contains(&format!(
            r#"<wsse:Password Type="{}">AHdjPQqhLugJUej2bfmGQqPj3Vo=</wsse:Password>"#,
            PASSWORD_DIGEST_URI
        )));
        assert!(xml.contains(&format!(
            r#"<wsse:Nonce EncodingType="{}">MDEyMzQ1Njc4OWFiY2RlZg==</wsse:Nonce>"#,
            BASE64_BINARY_URI
        )));
        assert!(xml.contains("<wsu:Created>2026-01-01T00:00:00Z</wsu:Created>"));
        assert!(xml.ends_with("</wsse:Security>"));
    }

    #[test]
    fn test_write_xml_escapes_password() {
        let credential = Credential::new("u", "a<b&c", PasswordType::PasswordText);
        let xml = render(&SecurityHeader::build(&credential));
        assert!(xml.contains("a&lt;b&amp;c"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credential = digest_credential();
        assert!(!format!("{:?}", credential).contains("secret"));
        let header = SecurityHeader::build(&Credential::new(
            "u",
            "plain-secret",
            PasswordType::PasswordText,
        ));
        assert!(!format!("{:?}", header).contains("plain-secret"));
    }
}
