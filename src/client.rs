//! Workday client session.
//!
//! Methods take `&mut self`, so a single client never has two calls in
//! flight. Every call returns its [`CallRecord`] by value; the last-call
//! accessors are a convenience copy of the most recent record.

use crate::config::ClientConfig;
use crate::error::{CallError, ClientError};
use crate::invoker::{CallInvoker, CallRecord};
use crate::operations::{
    account_create_payload, account_update_payload, contact_info_payload, generate_password,
    photo_filename, photo_payload, read_photo, AccountCreate, AccountUpdate, ContactInfoUpdate,
    Operation, PhotoUpdate, GENERATED_PASSWORD_LEN,
};
use crate::payload::Record;
use crate::security::Credential;
use crate::transport::{HttpTransport, Transport};
use tracing::{debug, info};

/// Authenticated session against one Workday endpoint.
pub struct WorkdayClient {
    credential: Credential,
    invoker: CallInvoker,
    last_call: Option<CallRecord>,
}

impl WorkdayClient {
    /// Validate the configuration and build an HTTP-backed client.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(config, transport)
    }

    /// Validate the configuration and build a client over a custom transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: impl Transport + 'static,
    ) -> Result<Self, ClientError> {
        config.validate()?;

        info!(
            endpoint = %config.service.endpoint,
            wsdl = ?config.service.wsdl,
            username = %config.credentials.username,
            password_type = ?config.credentials.password_type,
            soap_version = ?config.service.soap_version,
            "Workday client initialized"
        );

        Ok(Self {
            credential: config.credential(),
            invoker: CallInvoker::new(&config, Box::new(transport)),
            last_call: None,
        })
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Invoke an operation with a prepared payload.
    pub async fn invoke(&mut self, operation: Operation, payload: &Record) -> CallRecord {
        let record = self.invoker.invoke(operation, payload, &self.credential).await;
        self.remember(record)
    }

    /// Update a worker's work email and/or landline phone.
    pub async fn update_contact_info(&mut self, input: &ContactInfoUpdate) -> CallRecord {
        debug!(
            worker_id = %input.worker_id,
            email = input.email.is_some(),
            phone = input.phone.is_some(),
            "Building contact information request"
        );
        let payload = contact_info_payload(input);
        self.invoke(Operation::MaintainContactInformation, &payload)
            .await
    }

    /// Upload a worker photo read from `input.source`.
    pub async fn update_photo(&mut self, input: &PhotoUpdate) -> CallRecord {
        let content = match read_photo(&input.source).await {
            Ok(content) => content,
            Err(e) => {
                let record = CallRecord::local_failure(Operation::PutWorkerPhoto, e);
                return self.remember(record);
            }
        };
        debug!(
            worker_id = %input.worker_id,
            bytes = content.len(),
            "Building worker photo request"
        );
        let payload = photo_payload(&input.worker_id, &photo_filename(input), content);
        self.invoke(Operation::PutWorkerPhoto, &payload).await
    }

    /// Create an account with a generated password.
    ///
    /// No existence check is made; the service rejects duplicates.
    pub async fn create_account(&mut self, input: &AccountCreate) -> CallRecord {
        if let Err(e) = check_username(&input.username) {
            return self.remember(CallRecord::local_failure(Operation::AddWorkdayAccount, e));
        }
        let password = generate_password(GENERATED_PASSWORD_LEN);
        let payload = account_create_payload(input, &password);
        self.invoke(Operation::AddWorkdayAccount, &payload).await
    }

    /// Change the username of an existing account.
    pub async fn update_account(&mut self, input: &AccountUpdate) -> CallRecord {
        if let Err(e) = check_username(&input.username) {
            return self.remember(CallRecord::local_failure(Operation::UpdateWorkdayAccount, e));
        }
        let payload = account_update_payload(input);
        self.invoke(Operation::UpdateWorkdayAccount, &payload).await
    }

    /// Most recent record, if any call has been made.
    pub fn last_call(&self) -> Option<&CallRecord> {
        self.last_call.as_ref()
    }

    pub fn last_request(&self) -> Option<&str> {
        self.last_call.as_ref().map(|r| r.request_text.as_str())
    }

    pub fn last_response(&self) -> Option<&str> {
        self.last_call.as_ref().map(|r| r.response_text.as_str())
    }

    pub fn last_error(&self) -> Option<&CallError> {
        self.last_call.as_ref().and_then(|r| r.error.as_ref())
    }

    fn remember(&mut self, record: CallRecord) -> CallRecord {
        self.last_call = Some(record.clone());
        record
    }
}

fn check_username(username: &str) -> Result<(), CallError> {
    if username.trim().is_empty() {
        return Err(CallError::local("username must not be empty"));
    }
    Ok(())
}
