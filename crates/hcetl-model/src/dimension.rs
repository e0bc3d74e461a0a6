//! Dimension specifications and surrogate-keyed dimension tables.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::column::{ColumnKind, NormalizedColumn};
use crate::error::SchemaError;
use crate::value::FieldValue;

/// Which columns form a dimension's natural key and which ride along.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionSpec {
    /// Dimension name used in logs and reports (e.g. "patient").
    pub name: String,
    /// Name of the surrogate key column (e.g. "patient_id").
    pub id_column: String,
    /// Natural-key columns, by standardized identifier.
    pub natural_key: Vec<String>,
    /// Carried attribute columns, by standardized identifier.
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl DimensionSpec {
    pub fn new(
        name: impl Into<String>,
        id_column: impl Into<String>,
        natural_key: &[&str],
        attributes: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            id_column: id_column.into(),
            natural_key: natural_key.iter().map(|c| (*c).to_string()).collect(),
            attributes: attributes.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// Patient: keyed by (name, date_of_admission).
    pub fn patient() -> Self {
        Self::new(
            "patient",
            "patient_id",
            &["name", "date_of_admission"],
            &["age", "gender", "blood_type", "medical_condition"],
        )
    }

    pub fn doctor() -> Self {
        Self::new("doctor", "doctor_id", &["doctor"], &[])
    }

    pub fn hospital() -> Self {
        Self::new("hospital", "hospital_id", &["hospital"], &[])
    }

    pub fn insurance_provider() -> Self {
        Self::new("insurance_provider", "insurance_id", &["insurance_provider"], &[])
    }

    /// Resolves the key and attribute identifiers to normalized columns.
    pub fn resolve(&self) -> Result<(Vec<NormalizedColumn>, Vec<NormalizedColumn>), SchemaError> {
        if self.natural_key.is_empty() {
            return Err(SchemaError::EmptyNaturalKey {
                dimension: self.name.clone(),
            });
        }
        let resolve_all = |names: &[String]| {
            names
                .iter()
                .map(|name| {
                    NormalizedColumn::from_name(name).ok_or_else(|| SchemaError::UnknownColumn {
                        dimension: self.name.clone(),
                        column: name.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        };
        Ok((
            resolve_all(self.natural_key.as_slice())?,
            resolve_all(self.attributes.as_slice())?,
        ))
    }
}

/// One deduplicated dimension row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionRow {
    pub id: i64,
    pub key: Vec<FieldValue>,
    pub attributes: Vec<FieldValue>,
}

/// A deduplicated reference table with dense surrogate ids.
///
/// Rows can only be added through [`DimensionTable::insert_first_seen`], which
/// keeps ids a contiguous `1..=N` sequence in first-seen order and ignores
/// later rows whose natural key is already present.
#[derive(Debug, Clone)]
pub struct DimensionTable {
    pub name: String,
    pub id_column: String,
    pub key_columns: Vec<NormalizedColumn>,
    pub attribute_columns: Vec<NormalizedColumn>,
    rows: Vec<DimensionRow>,
    index: HashMap<Vec<FieldValue>, i64>,
}

impl DimensionTable {
    pub fn new(
        name: impl Into<String>,
        id_column: impl Into<String>,
        key_columns: Vec<NormalizedColumn>,
        attribute_columns: Vec<NormalizedColumn>,
    ) -> Self {
        Self {
            name: name.into(),
            id_column: id_column.into(),
            key_columns,
            attribute_columns,
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Adds a row unless its natural key was already seen.
    ///
    /// Returns the surrogate id of the key and whether a new row was created.
    pub fn insert_first_seen(
        &mut self,
        key: Vec<FieldValue>,
        attributes: Vec<FieldValue>,
    ) -> (i64, bool) {
        if let Some(id) = self.index.get(&key) {
            return (*id, false);
        }
        let id = self.rows.len() as i64 + 1;
        self.index.insert(key.clone(), id);
        self.rows.push(DimensionRow {
            id,
            key,
            attributes,
        });
        (id, true)
    }

    /// Resolves a natural key to its surrogate id.
    pub fn lookup(&self, key: &[FieldValue]) -> Option<i64> {
        self.index.get(key).copied()
    }

    /// The row with the given surrogate id.
    pub fn row(&self, id: i64) -> Option<&DimensionRow> {
        let idx = usize::try_from(id.checked_sub(1)?).ok()?;
        self.rows.get(idx)
    }

    pub fn rows(&self) -> &[DimensionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Output columns: surrogate id, natural key, then carried attributes.
    pub fn columns(&self) -> Vec<(String, ColumnKind)> {
        let mut columns =
            Vec::with_capacity(1 + self.key_columns.len() + self.attribute_columns.len());
        columns.push((self.id_column.clone(), ColumnKind::Integer));
        for column in self.key_columns.iter().chain(&self.attribute_columns) {
            columns.push((column.as_str().to_string(), column.kind()));
        }
        columns
    }

    /// Row values in the same order as [`DimensionTable::columns`].
    pub fn row_values(row: &DimensionRow) -> Vec<FieldValue> {
        let mut values = Vec::with_capacity(1 + row.key.len() + row.attributes.len());
        values.push(FieldValue::Integer(row.id));
        values.extend(row.key.iter().cloned());
        values.extend(row.attributes.iter().cloned());
        values
    }
}

/// The four dimensions of the encounter star schema.
#[derive(Debug, Clone)]
pub struct StarDimensions {
    pub patient: DimensionTable,
    pub doctor: DimensionTable,
    pub hospital: DimensionTable,
    pub insurance: DimensionTable,
}

impl StarDimensions {
    pub fn iter(&self) -> impl Iterator<Item = &DimensionTable> {
        [&self.patient, &self.doctor, &self.hospital, &self.insurance].into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_seen_wins_and_ids_are_dense() {
        let mut table = DimensionTable::new(
            "doctor",
            "doctor_id",
            vec![NormalizedColumn::Doctor],
            Vec::new(),
        );
        assert_eq!(table.insert_first_seen(vec![FieldValue::text("A")], vec![]), (1, true));
        assert_eq!(table.insert_first_seen(vec![FieldValue::text("B")], vec![]), (2, true));
        assert_eq!(table.insert_first_seen(vec![FieldValue::text("A")], vec![]), (1, false));
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(&[FieldValue::text("B")]), Some(2));
        assert_eq!(table.lookup(&[FieldValue::text("C")]), None);
    }

    #[test]
    fn row_by_surrogate_id() {
        let mut table = DimensionTable::new(
            "hospital",
            "hospital_id",
            vec![NormalizedColumn::Hospital],
            Vec::new(),
        );
        table.insert_first_seen(vec![FieldValue::text("North")], vec![]);
        table.insert_first_seen(vec![FieldValue::text("South")], vec![]);

        let row = table.row(2).unwrap();
        assert_eq!(row.id, 2);
        assert_eq!(row.key, vec![FieldValue::text("South")]);
        assert!(table.row(0).is_none());
        assert!(table.row(3).is_none());
        assert!(table.row(-1).is_none());
    }

    #[test]
    fn patient_spec_resolves() {
        let (key, attributes) = DimensionSpec::patient().resolve().unwrap();
        assert_eq!(
            key,
            vec![NormalizedColumn::Name, NormalizedColumn::DateOfAdmission]
        );
        assert_eq!(attributes.len(), 4);
    }

    #[test]
    fn unknown_column_is_a_schema_error() {
        let spec = DimensionSpec::new("ward", "ward_id", &["ward"], &[]);
        assert!(matches!(
            spec.resolve(),
            Err(SchemaError::UnknownColumn { column, .. }) if column == "ward"
        ));
    }

    #[test]
    fn empty_key_is_a_schema_error() {
        let spec = DimensionSpec::new("nothing", "nothing_id", &[], &["age"]);
        assert!(matches!(spec.resolve(), Err(SchemaError::EmptyNaturalKey { .. })));
    }
}
