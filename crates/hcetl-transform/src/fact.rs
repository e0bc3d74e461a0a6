//! Fact assembly.

use hcetl_model::{DimensionTable, FactRecord, JoinReport, NormalizedRecord, StarDimensions};
use tracing::{info, warn};

/// Fact rows plus the count of unresolved dimension references.
#[derive(Debug, Clone, Default)]
pub struct FactAssembly {
    pub facts: Vec<FactRecord>,
    pub joins: JoinReport,
}

/// Produces one fact per normalized record, in input order.
///
/// Each record is resolved against every dimension by its natural key. This
/// is a left join: a record whose key is missing from a dimension still
/// yields a fact, with that surrogate key left null and the miss counted in
/// [`FactAssembly::joins`]. `admission_id` is the one-based input position.
pub fn assemble_facts(records: &[NormalizedRecord], dimensions: &StarDimensions) -> FactAssembly {
    let mut joins = JoinReport::default();
    let facts: Vec<FactRecord> = records
        .iter()
        .enumerate()
        .map(|(idx, record)| FactRecord {
            admission_id: idx as i64 + 1,
            patient_id: resolve(&dimensions.patient, record, &mut joins),
            doctor_id: resolve(&dimensions.doctor, record, &mut joins),
            hospital_id: resolve(&dimensions.hospital, record, &mut joins),
            insurance_id: resolve(&dimensions.insurance, record, &mut joins),
            billing_amount: record.billing_amount,
            room_number: record.room_number,
            admission_type: record.admission_type.clone(),
            discharge_date: record.discharge_date,
            medication: record.medication.clone(),
            test_results: record.test_results.clone(),
        })
        .collect();

    for (dimension, count) in joins.unmatched() {
        warn!(dimension = %dimension, count, "facts with unresolved dimension key");
    }
    info!(rows = facts.len(), "assembled facts");

    FactAssembly { facts, joins }
}

fn resolve(table: &DimensionTable, record: &NormalizedRecord, joins: &mut JoinReport) -> Option<i64> {
    let id = table.lookup(&record.project(&table.key_columns));
    if id.is_none() {
        joins.record_unmatched(&table.name);
    }
    id
}
