//! SOAP response inspection.
//!
//! Uses quick-xml which is safe against XXE by default (doesn't expand entities).
//! Only what the invoker needs is extracted: envelope version, the first body
//! element, and the fault code and message when the body is a Fault.

use crate::config::SoapVersion;
use crate::error::CallError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// SOAP namespace URIs.
pub const SOAP_11_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SOAP_12_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// Parsed response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapResponse {
    /// Detected SOAP version
    pub version: SoapVersion,
    /// Local name of the first body element
    pub operation: Option<String>,
    /// Fault, when the body carries one
    pub fault: Option<SoapFault>,
}

impl SoapResponse {
    pub fn is_fault(&self) -> bool {
        self.fault.is_some()
    }
}

/// SOAP Fault contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoapFault {
    /// `faultcode` (1.1) or `Code/Value` (1.2)
    pub code: String,
    /// `faultstring` (1.1) or `Reason/Text` (1.2)
    pub message: String,
    /// First `Message` element inside the fault detail
    pub detail: Option<String>,
}

impl SoapFault {
    /// Message with the detail appended when it adds information.
    pub fn full_message(&self) -> String {
        match self.detail {
            Some(ref detail) if !detail.is_empty() && *detail != self.message => {
                if self.message.is_empty() {
                    detail.clone()
                } else {
                    format!("{} ({})", self.message, detail)
                }
            }
            _ => self.message.clone(),
        }
    }
}

impl From<SoapFault> for CallError {
    fn from(fault: SoapFault) -> Self {
        CallError::fault(fault.code.clone(), fault.full_message())
    }
}

/// Parse a response body as a SOAP envelope.
pub fn parse_response(xml: &str) -> Result<SoapResponse, CallError> {
    if xml.trim().is_empty() {
        return Err(CallError::protocol("Empty response body"));
    }

    check_xxe_patterns(xml)?;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut version: Option<SoapVersion> = None;
    let mut operation: Option<String> = None;
    let mut fault: Option<SoapFault> = None;
    let mut stack: Vec<String> = Vec::new();

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let local_name = local_name_str(e);
                on_element(&local_name, e, &stack, &mut version, &mut operation, &mut fault);
                stack.push(local_name);
            }

            Ok(Event::Empty(ref e)) => {
                let local_name = local_name_str(e);
                on_element(&local_name, e, &stack, &mut version, &mut operation, &mut fault);
            }

            Ok(Event::End(_)) => {
                stack.pop();
            }

            Ok(Event::Text(ref e)) => {
                if let Some(ref mut fault) = fault {
                    let text = e.unescape().map_err(|err| {
                        CallError::protocol(format!("Invalid text content: {}", err))
                    })?;
                    capture_fault_text(fault, &stack, &text);
                }
            }

            Ok(Event::Eof) => break,

            Err(e) => {
                return Err(CallError::protocol(format!("XML parse error: {}", e)));
            }

            _ => {}
        }

        buf.clear();
    }

    let version = version.ok_or_else(|| {
        CallError::protocol("No valid SOAP Envelope found with recognized namespace")
    })?;

    Ok(SoapResponse {
        version,
        operation,
        fault,
    })
}

fn on_element(
    local_name: &str,
    e: &BytesStart,
    stack: &[String],
    version: &mut Option<SoapVersion>,
    operation: &mut Option<String>,
    fault: &mut Option<SoapFault>,
) {
    // Envelope
    if stack.is_empty() && local_name == "Envelope" {
        *version = envelope_version(e);
        return;
    }

    // First child of Body
    let in_body = stack.len() == 2 && stack[1] == "Body";
    if in_body && operation.is_none() {
        *operation = Some(local_name.to_string());
        if local_name == "Fault" {
            *fault = Some(SoapFault::default());
        }
    }
}

fn capture_fault_text(fault: &mut SoapFault, stack: &[String], text: &str) {
    let current = stack.last().map(String::as_str).unwrap_or("");
    let parent = stack
        .len()
        .checked_sub(2)
        .and_then(|i| stack.get(i))
        .map(String::as_str)
        .unwrap_or("");
    let in_detail = stack.iter().any(|s| s == "detail" || s == "Detail");

    match (current, parent) {
        ("faultcode", _) => fault.code = text.to_string(),
        ("faultstring", _) => fault.message = text.to_string(),
        // SOAP 1.2: Subcode values sit one level deeper and are ignored.
        ("Value", "Code") if fault.code.is_empty() => fault.code = text.to_string(),
        ("Text", "Reason") if fault.message.is_empty() => fault.message = text.to_string(),
        ("Message", _) if in_detail && fault.detail.is_none() => {
            fault.detail = Some(text.to_string())
        }
        _ => {}
    }
}

/// Detect the SOAP version from the namespaces declared on the Envelope.
fn envelope_version(e: &BytesStart) -> Option<SoapVersion> {
    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref()).unwrap_or("");
        if key == "xmlns" || key.starts_with("xmlns:") {
            match std::str::from_utf8(&attr.value).unwrap_or("") {
                SOAP_11_NS => return Some(SoapVersion::Soap11),
                SOAP_12_NS => return Some(SoapVersion::Soap12),
                _ => {}
            }
        }
    }
    None
}

/// Check for XXE attack patterns.
fn check_xxe_patterns(xml: &str) -> Result<(), CallError> {
    if xml.contains("<!DOCTYPE") || xml.contains("<!doctype") {
        return Err(CallError::protocol("DOCTYPE declarations are not allowed"));
    }

    if xml.contains("<!ENTITY") || xml.contains("<!entity") {
        return Err(CallError::protocol("Entity declarations are not allowed"));
    }

    Ok(())
}

/// Extract local name from element.
fn local_name_str(e: &BytesStart) -> String {
    let name = e.local_name();
    std::str::from_utf8(name.as_ref())
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUCCESS_11: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<env:Envelope xmlns:env="http://schemas.xmlsoap.org/soap/envelope/">
  <env:Body>
    <wd:Put_Worker_Photo_Response xmlns:wd="urn:com.workday/bsvc" wd:version="v40.1">
      <wd:Worker_Reference>
        <wd:ID wd:type="Employee_ID">5001</wd:ID>
      </wd:Worker_Reference>
    </wd:Put_Worker_Photo_Response>
  </env:Body>
</env:Envelope>"#;

    const FAULT_11: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
  <SOAP-ENV:Body>
    <SOAP-ENV:Fault xmlns:wd="urn:com.workday/bsvc">
      <faultcode>SOAP-ENV:Client.validationError</faultcode>
      <faultstring>Validation error occurred. Invalid ID value.</faultstring>
      <detail>
        <wd:Validation_Fault>
          <wd:Validation_Error>
            <wd:Message>Invalid ID value. '9999' is not a valid ID value for type = 'Employee_ID'</wd:Message>
          </wd:Validation_Error>
        </wd:Validation_Fault>
      </detail>
    </SOAP-ENV:Fault>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#;

    const FAULT_12: &str = r#"<?xml version="1.0"?>
<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope">
  <env:Body>
    <env:Fault>
      <env:Code>
        <env:Value>env:Sender</env:Value>
        <env:Subcode><env:Value>wd:Invalid</env:Value></env:Subcode>
      </env:Code>
      <env:Reason><env:Text xml:lang="en">Invalid username or password</env:Text></env:Reason>
    </env:Fault>
  </env:Body>
</env:Envelope>"#;

    #[test]
    fn test_parse_success_response() {
        let response = parse_response(SUCCESS_11).unwrap();
        assert_eq!(response.version, SoapVersion::Soap11);
        assert_eq!(response.operation.as_deref(), Some("Put_Worker_Photo_Response"));
        assert!(!response.is_fault());
    }

    #[test]
    fn test_parse_soap_11_fault() {
        let response = parse_response(FAULT_11).unwrap();
        let fault = response.fault.unwrap();
        assert_eq!(fault.code, "SOAP-ENV:Client.validationError");
        assert_eq!(fault.message, "Validation error occurred. Invalid ID value.");
        assert!(fault.detail.as_deref().unwrap().contains("'9999'"));

        let err = CallError::from(fault);
        assert_eq!(err.kind(), "SOAP_FAULT");
        assert!(err.to_string().contains("'9999'"));
    }

    #[test]
    fn test_parse_soap_12_fault() {
        let response = parse_response(FAULT_12).unwrap();
        assert_eq!(response.version, SoapVersion::Soap12);
        let fault = response.fault.unwrap();
        assert_eq!(fault.code, "env:Sender");
        assert_eq!(fault.message, "Invalid username or password");
        assert_eq!(fault.full_message(), "Invalid username or password");
    }

    #[test]
    fn test_empty_body_rejected() {
        let err = parse_response("   ").unwrap_err();
        assert_eq!(err.kind(), "PROTOCOL");
    }

    #[test]
    fn test_non_soap_rejected() {
        let err = parse_response("<html><body>Bad Gateway</body></html>").unwrap_err();
        assert!(matches!(err, CallError::Protocol { .. }));
    }

    #[test]
    fn test_malformed_xml_rejected() {
        let err = parse_response(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body></soap:Envelope>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "PROTOCOL");
    }

    #[test]
    fn test_xxe_rejected() {
        let payload = r#"<?xml version="1.0"?>
<!DOCTYPE foo [<!ENTITY xxe SYSTEM "file:///etc/passwd">]>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>&xxe;</soap:Body>
</soap:Envelope>"#;
        let err = parse_response(payload).unwrap_err();
        assert!(err.to_string().contains("DOCTYPE"));
    }

    #[test]
    fn test_fault_full_message_without_string() {
        let fault = SoapFault {
            code: "c".to_string(),
            message: String::new(),
            detail: Some("detail only".to_string()),
        };
        assert_eq!(fault.full_message(), "detail only");
    }
}
