//! Fixed-shape normalized and fact rows.

use chrono::NaiveDate;
use serde::Serialize;

use crate::column::{ColumnKind, NormalizedColumn};
use crate::value::FieldValue;

/// One encounter row after cleaning.
///
/// Integer, decimal, and date fields are `None` when the source value could
/// not be parsed; text fields are trimmed and empty when missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub name: String,
    pub age: Option<i64>,
    pub gender: String,
    pub blood_type: String,
    pub medical_condition: String,
    pub date_of_admission: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
    pub doctor: String,
    pub hospital: String,
    pub insurance_provider: String,
    pub billing_amount: Option<f64>,
    pub room_number: Option<i64>,
    pub admission_type: String,
    pub medication: String,
    pub test_results: String,
}

impl NormalizedRecord {
    /// Returns the typed value of one column.
    pub fn value(&self, column: NormalizedColumn) -> FieldValue {
        match column {
            NormalizedColumn::Name => FieldValue::text(&self.name),
            NormalizedColumn::Age => FieldValue::integer(self.age),
            NormalizedColumn::Gender => FieldValue::text(&self.gender),
            NormalizedColumn::BloodType => FieldValue::text(&self.blood_type),
            NormalizedColumn::MedicalCondition => FieldValue::text(&self.medical_condition),
            NormalizedColumn::DateOfAdmission => FieldValue::date(self.date_of_admission),
            NormalizedColumn::Doctor => FieldValue::text(&self.doctor),
            NormalizedColumn::Hospital => FieldValue::text(&self.hospital),
            NormalizedColumn::InsuranceProvider => FieldValue::text(&self.insurance_provider),
            NormalizedColumn::BillingAmount => FieldValue::decimal(self.billing_amount),
            NormalizedColumn::RoomNumber => FieldValue::integer(self.room_number),
            NormalizedColumn::AdmissionType => FieldValue::text(&self.admission_type),
            NormalizedColumn::DischargeDate => FieldValue::date(self.discharge_date),
            NormalizedColumn::Medication => FieldValue::text(&self.medication),
            NormalizedColumn::TestResults => FieldValue::text(&self.test_results),
        }
    }

    /// Projects several columns into a key tuple.
    pub fn project(&self, columns: &[NormalizedColumn]) -> Vec<FieldValue> {
        columns.iter().map(|column| self.value(*column)).collect()
    }
}

/// One admission fact referencing the four dimensions by surrogate key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactRecord {
    pub admission_id: i64,
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub hospital_id: Option<i64>,
    pub insurance_id: Option<i64>,
    pub billing_amount: Option<f64>,
    pub room_number: Option<i64>,
    pub admission_type: String,
    pub discharge_date: Option<NaiveDate>,
    pub medication: String,
    pub test_results: String,
}

impl FactRecord {
    /// Fact columns in positional binding order.
    pub const COLUMNS: [(&'static str, ColumnKind); 11] = [
        ("admission_id", ColumnKind::Integer),
        ("patient_id", ColumnKind::Integer),
        ("doctor_id", ColumnKind::Integer),
        ("hospital_id", ColumnKind::Integer),
        ("insurance_id", ColumnKind::Integer),
        ("billing_amount", ColumnKind::Decimal),
        ("room_number", ColumnKind::Integer),
        ("admission_type", ColumnKind::Text),
        ("discharge_date", ColumnKind::Date),
        ("medication", ColumnKind::Text),
        ("test_results", ColumnKind::Text),
    ];

    /// Values in the same order as [`FactRecord::COLUMNS`].
    pub fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Integer(self.admission_id),
            FieldValue::integer(self.patient_id),
            FieldValue::integer(self.doctor_id),
            FieldValue::integer(self.hospital_id),
            FieldValue::integer(self.insurance_id),
            FieldValue::decimal(self.billing_amount),
            FieldValue::integer(self.room_number),
            FieldValue::text(&self.admission_type),
            FieldValue::date(self.discharge_date),
            FieldValue::text(&self.medication),
            FieldValue::text(&self.test_results),
        ]
    }
}
