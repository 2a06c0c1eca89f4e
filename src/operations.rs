//! Payload builders for the supported Workday operations.
//!
//! Each builder returns the body of the request element; the envelope and
//! security header are added by the invoker. Optional inputs that are absent
//! are left out of the payload entirely.

use crate::error::CallError;
use crate::payload::{Field, Record, Value};
use crate::reference::{resolve, ReferenceStyle};
use chrono::{NaiveDate, Utc};
use rand::rngs::OsRng;
use rand::Rng;
use std::path::{Path, PathBuf};

/// Usage tag applied to email and phone entries.
pub const WORK_USAGE_TYPE: &str = "Work";

/// Device type applied to phone entries.
pub const LANDLINE_DEVICE_TYPE: &str = "Landline";

/// Length of generated account passwords.
pub const GENERATED_PASSWORD_LEN: usize = 16;

const PASSWORD_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()-_=+";

/// Remote operations this client knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    MaintainContactInformation,
    PutWorkerPhoto,
    AddWorkdayAccount,
    UpdateWorkdayAccount,
}

impl Operation {
    /// Remote operation name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MaintainContactInformation => "Maintain_Contact_Information",
            Self::PutWorkerPhoto => "Put_Worker_Photo",
            Self::AddWorkdayAccount => "Add_Workday_Account",
            Self::UpdateWorkdayAccount => "Update_Workday_Account",
        }
    }

    /// Local name of the body element.
    pub fn request_element(&self) -> &'static str {
        match self {
            Self::MaintainContactInformation => {
                "Maintain_Contact_Information_for_Person_Event_Request"
            }
            Self::PutWorkerPhoto => "Put_Worker_Photo_Request",
            Self::AddWorkdayAccount => "Workday_Account_for_Worker_Add",
            Self::UpdateWorkdayAccount => "Workday_Account_for_Worker_Update",
        }
    }

    /// Worker reference shape the operation's schema expects.
    pub fn reference_style(&self) -> ReferenceStyle {
        match self {
            Self::MaintainContactInformation | Self::PutWorkerPhoto => ReferenceStyle::SimpleId,
            Self::AddWorkdayAccount | Self::UpdateWorkdayAccount => {
                ReferenceStyle::IntegrationReference
            }
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Phone number parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneNumber {
    /// International dialing code, e.g. `1`
    pub country_code: Option<String>,
    pub area_code: Option<String>,
    pub number: String,
    pub extension: Option<String>,
}

/// Input for a contact information update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactInfoUpdate {
    pub worker_id: String,
    pub email: Option<String>,
    pub phone: Option<PhoneNumber>,
    /// Defaults to today (UTC)
    pub effective_date: Option<NaiveDate>,
}

/// Input for a photo update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpdate {
    pub worker_id: String,
    pub source: PathBuf,
    /// Defaults to the source file name
    pub filename: Option<String>,
}

/// Input for account creation. The password is generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCreate {
    pub worker_id: String,
    pub username: String,
}

/// Input for an account username change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountUpdate {
    pub worker_id: String,
    pub username: String,
}

fn usage_data() -> Field {
    let type_reference = Record::new().field(
        Field::new("ID", WORK_USAGE_TYPE).with_attribute("type", "Communication_Usage_Type_ID"),
    );
    let type_data = Field::new(
        "Type_Data",
        Record::new().with("Type_Reference", type_reference),
    )
    .with_attribute("Primary", "true");
    Field::new("Usage_Data", Record::new().field(type_data)).with_attribute("Public", "true")
}

fn email_block(address: &str) -> Field {
    Field::new(
        "Email_Address_Data",
        Record::new()
            .with("Email_Address", address)
            .field(usage_data()),
    )
}

fn phone_block(phone: &PhoneNumber) -> Field {
    let device = Record::new().field(
        Field::new("ID", LANDLINE_DEVICE_TYPE).with_attribute("type", "Phone_Device_Type_ID"),
    );
    Field::new(
        "Phone_Data",
        Record::new()
            .with_opt("International_Phone_Code", phone.country_code.as_deref())
            .with_opt("Area_Code", phone.area_code.as_deref())
            .with("Phone_Number", phone.number.as_str())
            .with_opt("Phone_Extension", phone.extension.as_deref())
            .with("Phone_Device_Type_Reference", device)
            .field(usage_data()),
    )
}

/// Payload for `Maintain_Contact_Information`.
pub fn contact_info_payload(input: &ContactInfoUpdate) -> Record {
    let reference = resolve(&input.worker_id, ReferenceStyle::SimpleId);
    let effective_date = input
        .effective_date
        .unwrap_or_else(|| Utc::now().date_naive());

    let mut contact = Record::new();
    if let Some(ref email) = input.email {
        contact.push(email_block(email));
    }
    if let Some(ref phone) = input.phone {
        contact.push(phone_block(phone));
    }

    Record::new()
        .with(
            "Business_Process_Parameters",
            Record::new().with("Auto_Complete", true).with("Run_Now", true),
        )
        .with(
            "Maintain_Contact_Information_Data",
            Record::new()
                .field(reference.to_field())
                .with("Effective_Date", effective_date.format("%Y-%m-%d").to_string())
                .with("Worker_Contact_Information_Data", contact),
        )
}

/// Payload for `Put_Worker_Photo`. Content is carried as raw bytes.
pub fn photo_payload(worker_id: &str, filename: &str, content: Vec<u8>) -> Record {
    let reference = resolve(worker_id, ReferenceStyle::SimpleId);
    Record::new().field(reference.to_field()).with(
        "Worker_Photo_Data",
        Record::new()
            .with("Filename", filename)
            .with("File", Value::Binary(content)),
    )
}

/// Read photo content, rejecting unreadable or empty sources.
pub async fn read_photo(path: &Path) -> Result<Vec<u8>, CallError> {
    let content = tokio::fs::read(path).await.map_err(|e| {
        CallError::local(format!("cannot read photo '{}': {}", path.display(), e))
    })?;
    if content.is_empty() {
        return Err(CallError::local(format!(
            "photo '{}' is empty",
            path.display()
        )));
    }
    Ok(content)
}

/// File name sent with a photo.
pub fn photo_filename(update: &PhotoUpdate) -> String {
    update
        .filename
        .clone()
        .or_else(|| {
            update
                .source
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "photo".to_string())
}

/// Payload for `Add_Workday_Account`.
pub fn account_create_payload(input: &AccountCreate, password: &str) -> Record {
    let reference = resolve(&input.worker_id, ReferenceStyle::IntegrationReference);
    Record::new().field(reference.to_field()).with(
        "Workday_Account_for_Worker_Data",
        Record::new()
            .with("User_Name", input.username.as_str())
            .with("Password", password),
    )
}

/// Payload for `Update_Workday_Account`. Only the username changes.
pub fn account_update_payload(input: &AccountUpdate) -> Record {
    let reference = resolve(&input.worker_id, ReferenceStyle::IntegrationReference);
    Record::new().field(reference.to_field()).with(
        "Workday_Account_for_Worker_Data",
        Record::new().with("User_Name", input.username.as_str()),
    )
}

/// Random password drawn uniformly from the full alphabet.
pub fn generate_password(len: usize) -> String {
    (0..len)
        .map(|_| PASSWORD_ALPHABET[OsRng.gen_range(0..PASSWORD_ALPHABET.len())] as char)
        .collect()
}
