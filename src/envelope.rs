//! SOAP request serialization.
//!
//! Uses quick-xml's `Writer`, which escapes text and attribute values.

use crate::config::SoapVersion;
use crate::parser::{SOAP_11_NS, SOAP_12_NS};
use crate::payload::{Field, Record, Value};
use crate::security::SecurityHeader;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

/// Workday business services namespace.
pub const WORKDAY_NS: &str = "urn:com.workday/bsvc";

/// Prefix bound to [`WORKDAY_NS`] on every request.
pub const WORKDAY_PREFIX: &str = "wd";

/// Everything needed to render one outbound envelope.
#[derive(Debug)]
pub struct RequestEnvelope<'a> {
    pub version: SoapVersion,
    pub header: &'a SecurityHeader,
    /// Local name of the body element, e.g. `Put_Worker_Photo_Request`
    pub request_element: &'a str,
    /// Value of `wd:version` on the body element
    pub api_version: &'a str,
    pub payload: &'a Record,
}

impl RequestEnvelope<'_> {
    /// Render the complete envelope text.
    pub fn render(&self) -> Result<String, quick_xml::Error> {
        let (prefix, ns) = envelope_namespace(self.version);
        let envelope_tag = format!("{}:Envelope", prefix);
        let header_tag = format!("{}:Header", prefix);
        let body_tag = format!("{}:Body", prefix);
        let xmlns_env = format!("xmlns:{}", prefix);
        let xmlns_wd = format!("xmlns:{}", WORKDAY_PREFIX);

        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut envelope = BytesStart::new(envelope_tag.as_str());
        envelope.push_attribute((xmlns_env.as_str(), ns));
        envelope.push_attribute((xmlns_wd.as_str(), WORKDAY_NS));
        start(&mut writer, envelope)?;

        start(&mut writer, BytesStart::new(header_tag.as_str()))?;
        self.header.write_xml(&mut writer, prefix)?;
        end(&mut writer, &header_tag)?;

        start(&mut writer, BytesStart::new(body_tag.as_str()))?;
        let request_tag = qualify(self.request_element);
        let version_attr = qualify("version");
        let mut request = BytesStart::new(request_tag.as_str());
        request.push_attribute((version_attr.as_str(), self.api_version));
        start(&mut writer, request)?;
        write_record(&mut writer, self.payload)?;
        end(&mut writer, &request_tag)?;
        end(&mut writer, &body_tag)?;

        end(&mut writer, &envelope_tag)?;

        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }
}

/// Envelope prefix and namespace for a SOAP version.
pub fn envelope_namespace(version: SoapVersion) -> (&'static str, &'static str) {
    match version {
        SoapVersion::Soap11 => ("SOAP-ENV", SOAP_11_NS),
        SoapVersion::Soap12 => ("env", SOAP_12_NS),
    }
}

/// HTTP `Content-Type` for a request. SOAP 1.2 carries the action here.
pub fn content_type(version: SoapVersion, action: &str) -> String {
    match version {
        SoapVersion::Soap11 => "text/xml; charset=utf-8".to_string(),
        SoapVersion::Soap12 => format!("application/soap+xml; charset=utf-8; action=\"{}\"", action),
    }
}

fn qualify(name: &str) -> String {
    format!("{}:{}", WORKDAY_PREFIX, name)
}

fn write_record<W: Write>(writer: &mut Writer<W>, record: &Record) -> Result<(), quick_xml::Error> {
    for field in record.fields() {
        write_field(writer, field)?;
    }
    Ok(())
}

fn write_field<W: Write>(writer: &mut Writer<W>, field: &Field) -> Result<(), quick_xml::Error> {
    write_value(writer, &field.name, &field.attributes, &field.value)
}

fn write_value<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attributes: &[(String, String)],
    value: &Value,
) -> Result<(), quick_xml::Error> {
    // Lists repeat the element; nothing wraps them.
    if let Value::List(items) = value {
        for item in items {
            write_value(writer, name, attributes, item)?;
        }
        return Ok(());
    }

    let tag = qualify(name);
    let qualified_attrs: Vec<(String, &str)> = attributes
        .iter()
        .map(|(k, v)| (qualify(k), v.as_str()))
        .collect();
    let mut element = BytesStart::new(tag.as_str());
    for (k, v) in &qualified_attrs {
        element.push_attribute((k.as_str(), *v));
    }

    match value {
        Value::Record(record) => {
            start(writer, element)?;
            write_record(writer, record)?;
            end(writer, &tag)
        }
        scalar => {
            let text = scalar.scalar_text().unwrap_or_default();
            text_element(writer, element, &text)
        }
    }
}

pub(crate) fn start<W: Write>(
    writer: &mut Writer<W>,
    element: BytesStart<'_>,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(element))?;
    Ok(())
}

pub(crate) fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Write `<name attrs>text</name>`.
pub(crate) fn text_element<W: Write>(
    writer: &mut Writer<W>,
    element: BytesStart<'_>,
    text: &str,
) -> Result<(), quick_xml::Error> {
    let end_tag = element.to_end().into_owned();
    writer.write_event(Event::Start(element))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(end_tag))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PasswordType;
    use crate::security::{Credential, Nonce};
    use chrono::{TimeZone, Utc};

    fn header() -> SecurityHeader {
        let credential = Credential::new("isu_hr@acme", "secret", PasswordType::PasswordDigest);
        SecurityHeader::with_nonce(
            &credential,
            Nonce::from_bytes(*b"0123456789abcdef"),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    fn render(version: SoapVersion, payload: &Record) -> String {
        let header = header();
        RequestEnvelope {
            version,
            header: &header,
            request_element: "Put_Worker_Photo_Request",
            api_version: "v40.1",
            payload,
        }
        .render()
        .unwrap()
    }

    #[test]
    fn test_render_soap_11_envelope() {
        let payload = Record::new().with("Filename", "me.png");
        let xml = render(SoapVersion::Soap11, &payload);

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(&format!(r#"xmlns:SOAP-ENV="{}""#, SOAP_11_NS)));
        assert!(xml.contains(r#"xmlns:wd="urn:com.workday/bsvc""#));
        assert!(xml.contains("<SOAP-ENV:Header><wsse:Security"));
        assert!(xml.contains(r#"SOAP-ENV:mustUnderstand="1""#));
        assert!(xml.contains(
            r#"<SOAP-ENV:Body><wd:Put_Worker_Photo_Request wd:version="v40.1"><wd:Filename>me.png</wd:Filename></wd:Put_Worker_Photo_Request></SOAP-ENV:Body>"#
        ));
        assert!(xml.ends_with("</SOAP-ENV:Envelope>"));
    }

    #[test]
    fn test_render_soap_12_envelope() {
        let xml = render(SoapVersion::Soap12, &Record::new());
        assert!(xml.contains(&format!(r#"xmlns:env="{}""#, SOAP_12_NS)));
        assert!(xml.contains(r#"env:mustUnderstand="1""#));
        assert!(xml.contains("<env:Body>"));
    }

    #[test]
    fn test_attributes_bools_and_binary() {
        let payload = Record::new()
            .field(Field::new("Usage_Data", Record::new()).with_attribute("Public", "true"))
            .with("Run_Now", true)
            .with("File", Value::Binary(b"\x89PNG fake".to_vec()));
        let xml = render(SoapVersion::Soap11, &payload);

        assert!(xml.contains(r#"<wd:Usage_Data wd:Public="true"></wd:Usage_Data>"#));
        assert!(xml.contains("<wd:Run_Now>true</wd:Run_Now>"));
        assert!(xml.contains("<wd:File>iVBORyBmYWtl</wd:File>"));
    }

    #[test]
    fn test_list_repeats_element() {
        let payload = Record::new().with(
            "Email",
            Value::List(vec![Value::text("a@b.com"), Value::text("c@d.com")]),
        );
        let xml = render(SoapVersion::Soap11, &payload);
        assert!(xml.contains("<wd:Email>a@b.com</wd:Email><wd:Email>c@d.com</wd:Email>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let payload = Record::new().with("User_Name", "o'brien<&>");
        let xml = render(SoapVersion::Soap11, &payload);
        assert!(xml.contains("&lt;&amp;&gt;"));
        assert!(!xml.contains("o'brien<&>"));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(
            content_type(SoapVersion::Soap11, "Put_Worker_Photo"),
            "text/xml; charset=utf-8"
        );
        assert_eq!(
            content_type(SoapVersion::Soap12, "Put_Worker_Photo"),
            "application/soap+xml; charset=utf-8; action=\"Put_Worker_Photo\""
        );
    }
}
