//! Normalized column identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::table::SqlType;

/// Semantic type of a normalized column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Integer,
    Decimal,
    Date,
}

impl ColumnKind {
    /// Sink column type for this kind.
    pub fn sql_type(self) -> SqlType {
        match self {
            Self::Text => SqlType::Varchar(255),
            Self::Integer => SqlType::Int,
            Self::Decimal => SqlType::Float,
            Self::Date => SqlType::Date,
        }
    }
}

/// A column of the normalized encounter dataset.
///
/// The identifier of each variant is the standardized form of the source
/// header (trimmed, lower-cased, spaces replaced by underscores).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NormalizedColumn {
    Name,
    Age,
    Gender,
    BloodType,
    MedicalCondition,
    DateOfAdmission,
    Doctor,
    Hospital,
    InsuranceProvider,
    BillingAmount,
    RoomNumber,
    AdmissionType,
    DischargeDate,
    Medication,
    TestResults,
}

impl NormalizedColumn {
    /// All columns in source extract order.
    pub const ALL: [Self; 15] = [
        Self::Name,
        Self::Age,
        Self::Gender,
        Self::BloodType,
        Self::MedicalCondition,
        Self::DateOfAdmission,
        Self::Doctor,
        Self::Hospital,
        Self::InsuranceProvider,
        Self::BillingAmount,
        Self::RoomNumber,
        Self::AdmissionType,
        Self::DischargeDate,
        Self::Medication,
        Self::TestResults,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Age => "age",
            Self::Gender => "gender",
            Self::BloodType => "blood_type",
            Self::MedicalCondition => "medical_condition",
            Self::DateOfAdmission => "date_of_admission",
            Self::Doctor => "doctor",
            Self::Hospital => "hospital",
            Self::InsuranceProvider => "insurance_provider",
            Self::BillingAmount => "billing_amount",
            Self::RoomNumber => "room_number",
            Self::AdmissionType => "admission_type",
            Self::DischargeDate => "discharge_date",
            Self::Medication => "medication",
            Self::TestResults => "test_results",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Self::Age | Self::RoomNumber => ColumnKind::Integer,
            Self::BillingAmount => ColumnKind::Decimal,
            Self::DateOfAdmission | Self::DischargeDate => ColumnKind::Date,
            _ => ColumnKind::Text,
        }
    }

    /// Looks up a column by its standardized identifier.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.as_str() == name)
    }
}

impl fmt::Display for NormalizedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
