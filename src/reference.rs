//! Worker reference resolution.
//!
//! Workday addresses a worker either by a typed ID or through an integration
//! system reference. Which wrapper and which type tag to use depends on the
//! operation and on whether the identifier belongs to a contractor.

use crate::payload::{Field, Record};

/// Integration system that owns employee IDs.
pub const INTEGRATION_SYSTEM_ID: &str = "wd-emplid";

/// Reference shape required by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceStyle {
    /// `Worker_Reference/ID[@type]`
    SimpleId,
    /// `Worker_Reference/<kind>_Reference/Integration_ID_Reference/ID[@System_ID]`
    IntegrationReference,
}

/// Worker classification derived from the identifier text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerKind {
    Employee,
    ContingentWorker,
}

impl WorkerKind {
    /// Anything other than ASCII digits marks a contractor.
    pub fn classify(identifier: &str) -> Self {
        if is_contractor(identifier) {
            Self::ContingentWorker
        } else {
            Self::Employee
        }
    }
}

/// Type tag of a [`WorkerReference::SimpleId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdType {
    EmployeeId,
    ContingentWorkerId,
}

impl IdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmployeeId => "Employee_ID",
            Self::ContingentWorkerId => "Contingent_Worker_ID",
        }
    }
}

/// Wrapper tag of a [`WorkerReference::IntegrationReference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceType {
    EmployeeReference,
    ContingentWorkerReference,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmployeeReference => "Employee_Reference",
            Self::ContingentWorkerReference => "Contingent_Worker_Reference",
        }
    }
}

/// A worker reference in one of the two schema shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerReference {
    SimpleId {
        value: String,
        id_type: IdType,
    },
    IntegrationReference {
        value: String,
        system_id: &'static str,
        reference_type: ReferenceType,
    },
}

impl WorkerReference {
    pub fn value(&self) -> &str {
        match self {
            Self::SimpleId { value, .. } | Self::IntegrationReference { value, .. } => value,
        }
    }

    pub fn kind(&self) -> WorkerKind {
        match self {
            Self::SimpleId {
                id_type: IdType::EmployeeId,
                ..
            }
            | Self::IntegrationReference {
                reference_type: ReferenceType::EmployeeReference,
                ..
            } => WorkerKind::Employee,
            _ => WorkerKind::ContingentWorker,
        }
    }

    /// Render as the `Worker_Reference` field.
    pub fn to_field(&self) -> Field {
        let inner = match self {
            Self::SimpleId { value, id_type } => Record::new()
                .field(Field::new("ID", value.as_str()).with_attribute("type", id_type.as_str())),
            Self::IntegrationReference {
                value,
                system_id,
                reference_type,
            } => {
                let id = Field::new("ID", value.as_str()).with_attribute("System_ID", *system_id);
                let integration = Record::new().field(id);
                Record::new().with(
                    reference_type.as_str(),
                    Record::new().with("Integration_ID_Reference", integration),
                )
            }
        };
        Field::new("Worker_Reference", inner)
    }
}

/// True when the identifier contains any non-numeric character.
pub fn is_contractor(identifier: &str) -> bool {
    identifier.chars().any(|c| !c.is_ascii_digit())
}

/// Build the reference shape an operation asks for.
pub fn resolve(identifier: &str, style: ReferenceStyle) -> WorkerReference {
    let kind = WorkerKind::classify(identifier);
    match style {
        ReferenceStyle::SimpleId => WorkerReference::SimpleId {
            value: identifier.to_string(),
            id_type: match kind {
                WorkerKind::Employee => IdType::EmployeeId,
                WorkerKind::ContingentWorker => IdType::ContingentWorkerId,
            },
        },
        ReferenceStyle::IntegrationReference => WorkerReference::IntegrationReference {
            value: identifier.to_string(),
            system_id: INTEGRATION_SYSTEM_ID,
            reference_type: match kind {
                WorkerKind::Employee => ReferenceType::EmployeeReference,
                WorkerKind::ContingentWorker => ReferenceType::ContingentWorkerReference,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_contractor() {
        assert!(!is_contractor("12345"));
        assert!(is_contractor("CON12345"));
        assert!(is_contractor("123-45"));
        assert!(is_contractor("12 345"));
        assert!(!is_contractor(""));
    }

    #[test]
    fn test_resolve_simple_id_employee() {
        let reference = resolve("12345", ReferenceStyle::SimpleId);
        assert_eq!(
            reference,
            WorkerReference::SimpleId {
                value: "12345".to_string(),
                id_type: IdType::EmployeeId,
            }
        );
        assert_eq!(reference.kind(), WorkerKind::Employee);
    }

    #[test]
    fn test_resolve_simple_id_contractor() {
        let reference = resolve("CON12345", ReferenceStyle::SimpleId);
        assert!(matches!(
            reference,
            WorkerReference::SimpleId {
                id_type: IdType::ContingentWorkerId,
                ..
            }
        ));
        assert_eq!(reference.value(), "CON12345");
    }

    #[test]
    fn test_resolve_integration_reference() {
        let reference = resolve("12345", ReferenceStyle::IntegrationReference);
        assert_eq!(
            reference,
            WorkerReference::IntegrationReference {
                value: "12345".to_string(),
                system_id: "wd-emplid",
                reference_type: ReferenceType::EmployeeReference,
            }
        );

        let contractor = resolve("CON900", ReferenceStyle::IntegrationReference);
        assert_eq!(contractor.kind(), WorkerKind::ContingentWorker);
    }

    #[test]
    fn test_simple_id_field_shape() {
        let field = resolve("CON1", ReferenceStyle::SimpleId).to_field();
        assert_eq!(field.name, "Worker_Reference");
        let id = field.value.as_record().unwrap().get("ID").unwrap();
        assert_eq!(id.value.as_text(), Some("CON1"));
        assert_eq!(id.attribute("type"), Some("Contingent_Worker_ID"));
    }

    #[test]
    fn test_integration_field_shape() {
        let field = resolve("5001", ReferenceStyle::IntegrationReference).to_field();
        let record = field.value.as_record().unwrap();
        let id = record
            .path(&["Employee_Reference", "Integration_ID_Reference", "ID"])
            .unwrap();
        assert_eq!(id.value.as_text(), Some("5001"));
        assert_eq!(id.attribute("System_ID"), Some(INTEGRATION_SYSTEM_ID));
    }
}
