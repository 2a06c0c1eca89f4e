//! Outbound transport.
//!
//! The invoker hands a fully rendered envelope to a [`Transport`] and gets
//! back the raw status and body. [`HttpTransport`] is the production
//! implementation; tests plug in their own.

use crate::config::ClientConfig;
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

/// A rendered request ready to send.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub endpoint: String,
    /// `SOAPAction` header value; SOAP 1.2 carries the action in the content type
    pub soap_action: Option<String>,
    pub content_type: String,
    pub body: String,
}

/// Raw reply from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request was not delivered or no reply came back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &OutboundRequest) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    debug_bodies: bool,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.settings.timeout_secs))
            .connect_timeout(Duration::from_secs(config.settings.connect_timeout_secs))
            .user_agent(concat!("zentinel-workday-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            debug_bodies: config.settings.debug_transport,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<TransportResponse, TransportError> {
        if self.debug_bodies {
            debug!(
                endpoint = %request.endpoint,
                soap_action = ?request.soap_action,
                body = %request.body,
                "Sending SOAP request"
            );
        } else {
            trace!(
                endpoint = %request.endpoint,
                bytes = request.body.len(),
                "Sending SOAP request"
            );
        }

        let mut builder = self
            .client
            .post(&request.endpoint)
            .header(header::CONTENT_TYPE, request.content_type.as_str());
        if let Some(ref action) = request.soap_action {
            builder = builder.header("SOAPAction", format!("\"{}\"", action));
        }

        let response = builder
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(format!("failed to read response body: {}", e)))?;

        if self.debug_bodies {
            debug!(status, body = %body, "Received SOAP response");
        } else {
            trace!(status, bytes = body.len(), "Received SOAP response");
        }

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_success_range() {
        let ok = TransportResponse {
            status: 200,
            body: String::new(),
        };
        let fault = TransportResponse {
            status: 500,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!fault.is_success());
    }

    #[test]
    fn test_http_transport_builds_from_default_settings() {
        let config = ClientConfig::default();
        assert!(HttpTransport::new(&config).is_ok());
    }
}
