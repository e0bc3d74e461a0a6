//! Sink-ready tables for the star schema.

use hcetl_model::{
    ColumnDef, DimensionTable, FactRecord, StarDimensions, TableData, TableSchema,
};
use serde::{Deserialize, Serialize};

/// Target schema and table names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetNames {
    pub schema: String,
    pub fact_table: String,
    pub patient_table: String,
    pub doctor_table: String,
    pub hospital_table: String,
    pub insurance_table: String,
}

impl Default for TargetNames {
    fn default() -> Self {
        Self {
            schema: "main".to_string(),
            fact_table: "fact_admissions".to_string(),
            patient_table: "dim_patient".to_string(),
            doctor_table: "dim_doctor".to_string(),
            hospital_table: "dim_hospital".to_string(),
            insurance_table: "dim_insurance".to_string(),
        }
    }
}

impl TargetNames {
    /// Table name for a dimension, by dimension name.
    ///
    /// Dimensions outside the standard four fall back to `dim_<name>`.
    pub fn dimension_table(&self, dimension: &str) -> String {
        match dimension {
            "patient" => self.patient_table.clone(),
            "doctor" => self.doctor_table.clone(),
            "hospital" => self.hospital_table.clone(),
            "insurance_provider" | "insurance" => self.insurance_table.clone(),
            other => format!("dim_{other}"),
        }
    }
}

/// Every table of one run, dimensions first.
#[derive(Debug, Clone)]
pub struct StarTables {
    pub dimensions: Vec<TableData>,
    pub fact: TableData,
}

impl StarTables {
    /// Tables in load order: dimensions, then the fact table.
    pub fn iter(&self) -> impl Iterator<Item = &TableData> {
        self.dimensions.iter().chain(std::iter::once(&self.fact))
    }
}

pub fn dimension_table_data(table: &DimensionTable, schema: &str, name: &str) -> TableData {
    let columns = table
        .columns()
        .into_iter()
        .enumerate()
        .map(|(idx, (column, kind))| ColumnDef {
            name: column,
            sql_type: kind.sql_type(),
            primary_key: idx == 0,
        })
        .collect();
    TableData {
        schema: TableSchema {
            schema: schema.to_string(),
            name: name.to_string(),
            columns,
        },
        rows: table.rows().iter().map(DimensionTable::row_values).collect(),
    }
}

pub fn fact_table_data(facts: &[FactRecord], schema: &str, name: &str) -> TableData {
    let columns = FactRecord::COLUMNS
        .iter()
        .map(|(column, kind)| ColumnDef {
            name: (*column).to_string(),
            sql_type: kind.sql_type(),
            primary_key: *column == "admission_id",
        })
        .collect();
    TableData {
        schema: TableSchema {
            schema: schema.to_string(),
            name: name.to_string(),
            columns,
        },
        rows: facts.iter().map(FactRecord::values).collect(),
    }
}

/// Builds sink-ready tables for the four dimensions and the facts.
pub fn star_tables(
    dimensions: &StarDimensions,
    facts: &[FactRecord],
    names: &TargetNames,
) -> StarTables {
    StarTables {
        dimensions: dimensions
            .iter()
            .map(|table| {
                dimension_table_data(table, &names.schema, &names.dimension_table(&table.name))
            })
            .collect(),
        fact: fact_table_data(facts, &names.schema, &names.fact_table),
    }
}
