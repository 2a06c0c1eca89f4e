//! Call invocation pipeline.
//!
//! One invocation: build a fresh security header, render the envelope, send
//! it, and fold whatever happened into a [`CallRecord`]. Failures are never
//! returned as `Err`; they land in [`CallRecord::error`].

use crate::config::{ClientConfig, SoapVersion};
use crate::envelope::{content_type, RequestEnvelope};
use crate::error::CallError;
use crate::operations::Operation;
use crate::parser::parse_response;
use crate::payload::Record;
use crate::security::{Credential, SecurityHeader};
use crate::transport::{OutboundRequest, Transport, TransportResponse};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Raw request/response pair of one invocation, plus the failure if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    /// Remote operation name
    pub operation: String,
    /// Envelope as sent; empty when nothing was rendered
    pub request_text: String,
    /// Body as received; empty when nothing came back
    pub response_text: String,
    /// HTTP status, when a response arrived
    pub status: Option<u16>,
    pub error: Option<CallError>,
    pub duration_ms: u64,
}

impl CallRecord {
    /// Record for input rejected before anything was sent.
    pub fn local_failure(operation: Operation, error: CallError) -> Self {
        Self {
            operation: operation.name().to_string(),
            request_text: String::new(),
            response_text: String::new(),
            status: None,
            error: Some(error),
            duration_ms: 0,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Stateless pipeline bound to one endpoint and transport.
pub struct CallInvoker {
    transport: Box<dyn Transport>,
    endpoint: String,
    soap_version: SoapVersion,
    api_version: String,
}

impl CallInvoker {
    pub fn new(config: &ClientConfig, transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            endpoint: config.service.endpoint.trim().to_string(),
            soap_version: config.service.soap_version,
            api_version: config.service.api_version.clone(),
        }
    }

    /// Perform one remote call. Always returns a record.
    #[instrument(skip_all, fields(operation = %operation))]
    pub async fn invoke(
        &self,
        operation: Operation,
        payload: &Record,
        credential: &Credential,
    ) -> CallRecord {
        let started = Instant::now();

        let request_text = {
            let header = SecurityHeader::build(credential);
            let envelope = RequestEnvelope {
                version: self.soap_version,
                header: &header,
                request_element: operation.request_element(),
                api_version: &self.api_version,
                payload,
            };
            match envelope.render() {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Failed to render request envelope");
                    return CallRecord::local_failure(
                        operation,
                        CallError::local(format!("failed to serialize request: {}", e)),
                    );
                }
            }
        };

        let request = OutboundRequest {
            endpoint: self.endpoint.clone(),
            soap_action: match self.soap_version {
                SoapVersion::Soap11 => Some(operation.name().to_string()),
                SoapVersion::Soap12 => None,
            },
            content_type: content_type(self.soap_version, operation.name()),
            body: request_text,
        };

        let (status, response_text, error) = match self.transport.send(&request).await {
            Ok(response) => {
                let error = classify_response(&response);
                (Some(response.status), response.body, error)
            }
            Err(e) => (None, String::new(), Some(CallError::transport(e.0))),
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        match error {
            None => info!(status, duration_ms, "Call completed"),
            Some(ref e) => warn!(
                status,
                duration_ms,
                error_kind = e.kind(),
                error = %e,
                "Call failed"
            ),
        }

        CallRecord {
            operation: operation.name().to_string(),
            request_text: request.body,
            response_text,
            status,
            error,
            duration_ms,
        }
    }
}

/// Decide whether a delivered response is a failure.
///
/// A Fault wins over the HTTP status, and the HTTP status wins over an
/// unparseable body.
fn classify_response(response: &TransportResponse) -> Option<CallError> {
    match parse_response(&response.body) {
        Ok(parsed) => match parsed.fault {
            Some(fault) => Some(fault.into()),
            None if !response.is_success() => Some(CallError::HttpStatus {
                status: response.status,
            }),
            None => {
                debug!(response_element = ?parsed.operation, "Response parsed");
                None
            }
        },
        Err(_) if !response.is_success() => Some(CallError::HttpStatus {
            status: response.status,
        }),
        Err(e) => Some(e),
    }
}
