//! WS-Security authenticated SOAP client for Workday HR operations.
//!
//! Every outgoing call carries a freshly generated WS-Security
//! UsernameToken, and every call returns a record of the raw request and
//! response text together with any failure.
//!
//! # Features
//!
//! - UsernameToken headers in plain text or digest mode (fresh nonce per call)
//! - Worker references for employees and contingent workers
//! - Contact information, worker photo, and account create/update operations
//! - SOAP Fault, HTTP status, and transport failures captured per call
//!
//! # Example
//!
//! ```ignore
//! use zentinel_workday_client::{ClientConfig, WorkdayClient};
//! use zentinel_workday_client::operations::AccountUpdate;
//!
//! let config = ClientConfig::from_file("client.yaml")?;
//! let mut client = WorkdayClient::new(config)?;
//! let record = client
//!     .update_account(&AccountUpdate {
//!         worker_id: "CON900".into(),
//!         username: "csmith".into(),
//!     })
//!     .await;
//! if let Some(err) = record.error {
//!     eprintln!("{}", err);
//! }
//! ```

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod invoker;
pub mod operations;
pub mod parser;
pub mod payload;
pub mod reference;
pub mod security;
pub mod transport;

pub use client::WorkdayClient;
pub use config::{ClientConfig, PasswordType, SoapVersion};
pub use error::{CallError, ClientError};
pub use invoker::{CallInvoker, CallRecord};
pub use operations::Operation;
pub use reference::{resolve, ReferenceStyle, WorkerReference};
pub use security::{Credential, SecurityHeader};
