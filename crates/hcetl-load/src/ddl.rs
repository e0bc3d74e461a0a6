//! DDL and insert statement generation.
//!
//! Identifiers are restricted to ASCII letters, digits, and underscores and
//! are always double-quoted, so no configured name can change the statement.

use hcetl_model::TableSchema;

use crate::error::{Result, SinkError};

/// Validates and double-quotes one identifier.
pub fn quote_identifier(name: &str) -> Result<String> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SinkError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{name}\""))
}

fn qualified(schema: &TableSchema) -> Result<String> {
    Ok(format!(
        "{}.{}",
        quote_identifier(&schema.schema)?,
        quote_identifier(&schema.name)?
    ))
}

pub fn drop_table_sql(schema: &TableSchema) -> Result<String> {
    Ok(format!("DROP TABLE IF EXISTS {}", qualified(schema)?))
}

pub fn create_table_sql(schema: &TableSchema) -> Result<String> {
    let mut lines = Vec::with_capacity(schema.columns.len());
    for column in &schema.columns {
        let key = if column.primary_key { " PRIMARY KEY" } else { "" };
        lines.push(format!(
            "    {} {}{key}",
            quote_identifier(&column.name)?,
            column.sql_type
        ));
    }
    Ok(format!(
        "CREATE TABLE {} (\n{}\n)",
        qualified(schema)?,
        lines.join(",\n")
    ))
}

/// Multi-row insert with positional placeholders for `rows` rows.
pub fn insert_sql(schema: &TableSchema, rows: usize) -> Result<String> {
    let columns = schema
        .columns
        .iter()
        .map(|c| quote_identifier(&c.name))
        .collect::<Result<Vec<_>>>()?;
    let placeholders = format!("({})", vec!["?"; columns.len()].join(", "));
    let values = vec![placeholders; rows.max(1)].join(", ");
    Ok(format!(
        "INSERT INTO {} ({}) VALUES {values}",
        qualified(schema)?,
        columns.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcetl_model::{ColumnDef, SqlType};

    fn doctor() -> TableSchema {
        TableSchema {
            schema: "main".into(),
            name: "dim_doctor".into(),
            columns: vec![
                ColumnDef {
                    name: "doctor_id".into(),
                    sql_type: SqlType::Int,
                    primary_key: true,
                },
                ColumnDef {
                    name: "doctor".into(),
                    sql_type: SqlType::Varchar(255),
                    primary_key: false,
                },
            ],
        }
    }

    #[test]
    fn rejects_unsafe_identifiers() {
        assert!(quote_identifier("dim_patient").is_ok());
        assert!(quote_identifier("1abc").is_err());
        assert!(quote_identifier("a\"; DROP TABLE x; --").is_err());
        assert!(quote_identifier("").is_err());
    }

    #[test]
    fn insert_has_one_group_per_row() {
        assert_eq!(
            insert_sql(&doctor(), 2).unwrap(),
            r#"INSERT INTO "main"."dim_doctor" ("doctor_id", "doctor") VALUES (?, ?), (?, ?)"#
        );
    }

    #[test]
    fn drop_is_conditional() {
        assert_eq!(
            drop_table_sql(&doctor()).unwrap(),
            r#"DROP TABLE IF EXISTS "main"."dim_doctor""#
        );
    }
}
