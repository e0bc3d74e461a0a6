//! Tests for sinks and the retrying loader.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use hcetl_load::{
    CsvDirSink, LoadOptions, MemorySink, RetryPolicy, Sink, SinkError, SqliteSink, StarTables,
    TargetNames, create_table_sql, load_star, load_table, star_tables,
};
use hcetl_model::{
    DimensionTable, FactRecord, FieldValue, NormalizedColumn, StarDimensions, TableSchema,
};

fn dimension(name: &str, id: &str, column: NormalizedColumn, keys: &[&str]) -> DimensionTable {
    let mut table = DimensionTable::new(name, id, vec![column], Vec::new());
    for key in keys {
        table.insert_first_seen(vec![FieldValue::text(*key)], Vec::new());
    }
    table
}

fn sample_star(names: &TargetNames) -> StarTables {
    let mut patient = DimensionTable::new(
        "patient",
        "patient_id",
        vec![NormalizedColumn::Name, NormalizedColumn::DateOfAdmission],
        vec![NormalizedColumn::Age],
    );
    let admitted = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    patient.insert_first_seen(
        vec![FieldValue::text("Jane Doe"), FieldValue::Date(admitted)],
        vec![FieldValue::Integer(41)],
    );
    let dimensions = StarDimensions {
        patient,
        doctor: dimension("doctor", "doctor_id", NormalizedColumn::Doctor, &["Dr Who", "Dr No"]),
        hospital: dimension("hospital", "hospital_id", NormalizedColumn::Hospital, &["North"]),
        insurance: dimension(
            "insurance_provider",
            "insurance_id",
            NormalizedColumn::InsuranceProvider,
            &["Aetna"],
        ),
    };
    let facts = vec![
        FactRecord {
            admission_id: 1,
            patient_id: Some(1),
            doctor_id: Some(1),
            hospital_id: Some(1),
            insurance_id: Some(1),
            billing_amount: Some(1234.5),
            room_number: Some(101),
            admission_type: "Urgent".into(),
            discharge_date: NaiveDate::from_ymd_opt(2024, 2, 5),
            medication: "Ibuprofen".into(),
            test_results: "Normal".into(),
        },
        FactRecord {
            admission_id: 2,
            patient_id: Some(1),
            doctor_id: Some(2),
            hospital_id: None,
            insurance_id: Some(1),
            billing_amount: None,
            room_number: None,
            admission_type: "Elective".into(),
            discharge_date: None,
            medication: "Aspirin".into(),
            test_results: "Abnormal".into(),
        },
    ];
    star_tables(&dimensions, &facts, names)
}

fn count(sink: &SqliteSink, table: &str) -> i64 {
    sink.connection()
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .unwrap()
}

#[test]
fn sqlite_load_writes_dimensions_then_facts() {
    let tables = sample_star(&TargetNames::default());
    let mut sink = SqliteSink::open_in_memory().unwrap();

    let report = load_star(&mut sink, &tables, &LoadOptions::default()).unwrap();

    let order: Vec<_> = report.tables.iter().map(|t| t.table.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "main.dim_patient",
            "main.dim_doctor",
            "main.dim_hospital",
            "main.dim_insurance",
            "main.fact_admissions",
        ]
    );
    assert_eq!(report.total_rows(), 1 + 2 + 1 + 1 + 2);
    assert_eq!(count(&sink, "dim_doctor"), 2);

    let (billing, discharge, hospital): (Option<f64>, Option<String>, Option<i64>) = sink
        .connection()
        .query_row(
            "SELECT billing_amount, discharge_date, hospital_id FROM fact_admissions \
             WHERE admission_id = 2",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!((billing, discharge, hospital), (None, None, None));

    let admitted: String = sink
        .connection()
        .query_row("SELECT date_of_admission FROM dim_patient", [], |row| row.get(0))
        .unwrap();
    assert_eq!(admitted, "2024-02-01");
}

#[test]
fn reloading_replaces_tables() {
    let tables = sample_star(&TargetNames::default());
    let mut sink = SqliteSink::open_in_memory().unwrap();
    let options = LoadOptions {
        batch_size: 1,
        ..LoadOptions::default()
    };

    load_star(&mut sink, &tables, &options).unwrap();
    load_star(&mut sink, &tables, &options).unwrap();

    assert_eq!(count(&sink, "fact_admissions"), 2);
}

#[test]
fn non_main_schema_is_attached() {
    let names = TargetNames {
        schema: "warehouse".into(),
        ..TargetNames::default()
    };
    let tables = sample_star(&names);
    let mut sink = SqliteSink::open_in_memory().unwrap();

    load_star(&mut sink, &tables, &LoadOptions::default()).unwrap();

    assert_eq!(count(&sink, "warehouse.fact_admissions"), 2);
}

#[test]
fn sqlite_file_sink_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("healthcare.db");
    let tables = sample_star(&TargetNames::default());
    {
        let mut sink = SqliteSink::open(&path).unwrap();
        load_star(&mut sink, &tables, &LoadOptions::default()).unwrap();
    }
    let sink = SqliteSink::open(&path).unwrap();
    assert_eq!(count(&sink, "dim_patient"), 1);
}

#[test]
fn invalid_table_name_is_rejected() {
    let names = TargetNames {
        fact_table: "fact admissions".into(),
        ..TargetNames::default()
    };
    let tables = sample_star(&names);
    let mut sink = SqliteSink::open_in_memory().unwrap();

    let err = load_star(&mut sink, &tables, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, SinkError::InvalidIdentifier(name) if name == "fact admissions"));
}

#[test]
fn csv_dir_sink_writes_one_file_per_table() {
    let dir = tempfile::tempdir().unwrap();
    let tables = sample_star(&TargetNames::default());
    let mut sink = CsvDirSink::new(dir.path().join("out"));

    load_star(&mut sink, &tables, &LoadOptions::default()).unwrap();

    let facts = std::fs::read_to_string(dir.path().join("out/main.fact_admissions.csv")).unwrap();
    let lines: Vec<&str> = facts.lines().collect();
    assert_eq!(
        lines[0],
        "admission_id,patient_id,doctor_id,hospital_id,insurance_id,billing_amount,\
         room_number,admission_type,discharge_date,medication,test_results"
    );
    assert_eq!(lines[1], "1,1,1,1,1,1234.5,101,Urgent,2024-02-05,Ibuprofen,Normal");
    assert_eq!(lines[2], "2,1,2,,1,,,Elective,,Aspirin,Abnormal");
}

fn empty_star(names: &TargetNames) -> StarTables {
    let dimensions = StarDimensions {
        patient: DimensionTable::new(
            "patient",
            "patient_id",
            vec![NormalizedColumn::Name, NormalizedColumn::DateOfAdmission],
            vec![NormalizedColumn::Age],
        ),
        doctor: dimension("doctor", "doctor_id", NormalizedColumn::Doctor, &[]),
        hospital: dimension("hospital", "hospital_id", NormalizedColumn::Hospital, &[]),
        insurance: dimension(
            "insurance_provider",
            "insurance_id",
            NormalizedColumn::InsuranceProvider,
            &[],
        ),
    };
    star_tables(&dimensions, &[], names)
}

#[test]
fn csv_dir_sink_flushes_empty_tables_before_returning() {
    let dir = tempfile::tempdir().unwrap();
    let tables = empty_star(&TargetNames::default());
    let mut sink = CsvDirSink::new(dir.path());

    let report = load_star(&mut sink, &tables, &LoadOptions::default()).unwrap();
    assert_eq!(report.total_rows(), 0);

    // The sink is still alive: everything must already be on disk.
    let facts = std::fs::read_to_string(dir.path().join("main.fact_admissions.csv")).unwrap();
    assert!(facts.starts_with("admission_id,patient_id,doctor_id"));
    assert_eq!(facts.lines().count(), 1);
    let doctors = std::fs::read_to_string(dir.path().join("main.dim_doctor.csv")).unwrap();
    assert_eq!(doctors, "doctor_id,doctor\n");
    drop(sink);
}

#[test]
fn csv_dir_sink_reload_keeps_only_new_rows() {
    let dir = tempfile::tempdir().unwrap();
    let tables = sample_star(&TargetNames::default());
    let mut sink = CsvDirSink::new(dir.path());

    load_star(&mut sink, &tables, &LoadOptions::default()).unwrap();
    load_star(&mut sink, &tables, &LoadOptions::default()).unwrap();
    drop(sink);

    let facts = std::fs::read_to_string(dir.path().join("main.fact_admissions.csv")).unwrap();
    assert_eq!(facts.lines().count(), 3);
}

#[test]
fn insert_without_provision_fails() {
    let tables = sample_star(&TargetNames::default());
    let mut sink = MemorySink::new();
    let err = sink
        .insert(&tables.fact.schema, &tables.fact.rows, 10)
        .unwrap_err();
    assert!(matches!(err, SinkError::NotProvisioned(_)));
}

#[test]
fn row_width_mismatch_is_rejected() {
    let tables = sample_star(&TargetNames::default());
    let mut sink = MemorySink::new();
    sink.provision(&tables.fact.schema).unwrap();
    let err = sink
        .insert(&tables.fact.schema, &[vec![FieldValue::Integer(1)]], 10)
        .unwrap_err();
    assert!(matches!(err, SinkError::RowShape { expected: 11, actual: 1, .. }));
}

/// Fails the first `failures` provisions with the given error.
struct FlakySink {
    inner: MemorySink,
    failures: u32,
    retryable: bool,
    provisions: u32,
}

impl Sink for FlakySink {
    fn describe(&self) -> String {
        "flaky".into()
    }

    fn provision(&mut self, schema: &TableSchema) -> hcetl_load::Result<()> {
        self.provisions += 1;
        if self.provisions <= self.failures {
            return Err(if self.retryable {
                SinkError::Io {
                    path: PathBuf::from("db"),
                    source: std::io::Error::other("connection reset"),
                }
            } else {
                SinkError::InvalidIdentifier("bad".into())
            });
        }
        self.inner.provision(schema)
    }

    fn insert(
        &mut self,
        schema: &TableSchema,
        rows: &[Vec<FieldValue>],
        batch_size: usize,
    ) -> hcetl_load::Result<usize> {
        self.inner.insert(schema, rows, batch_size)
    }
}

fn fast_retries(max_attempts: u32) -> LoadOptions {
    LoadOptions {
        batch_size: 100,
        retry: RetryPolicy {
            max_attempts,
            backoff: Duration::from_millis(1),
        },
    }
}

#[test]
fn retryable_failures_are_retried() {
    let tables = sample_star(&TargetNames::default());
    let mut sink = FlakySink {
        inner: MemorySink::new(),
        failures: 2,
        retryable: true,
        provisions: 0,
    };

    let load = load_table(&mut sink, &tables.fact, &fast_retries(3)).unwrap();

    assert_eq!(load.attempts, 3);
    assert_eq!(load.rows, 2);
    assert_eq!(sink.inner.rows("main.fact_admissions").unwrap().len(), 2);
}

#[test]
fn retries_are_bounded() {
    let tables = sample_star(&TargetNames::default());
    let mut sink = FlakySink {
        inner: MemorySink::new(),
        failures: 5,
        retryable: true,
        provisions: 0,
    };

    assert!(load_table(&mut sink, &tables.fact, &fast_retries(3)).is_err());
    assert_eq!(sink.provisions, 3);
}

#[test]
fn permanent_failures_are_not_retried() {
    let tables = sample_star(&TargetNames::default());
    let mut sink = FlakySink {
        inner: MemorySink::new(),
        failures: 1,
        retryable: false,
        provisions: 0,
    };

    assert!(load_table(&mut sink, &tables.fact, &fast_retries(3)).is_err());
    assert_eq!(sink.provisions, 1);
}

#[test]
fn fact_table_ddl() {
    let tables = sample_star(&TargetNames::default());
    insta::assert_snapshot!(create_table_sql(&tables.fact.schema).unwrap(), @r#"
    CREATE TABLE "main"."fact_admissions" (
        "admission_id" INT PRIMARY KEY,
        "patient_id" INT,
        "doctor_id" INT,
        "hospital_id" INT,
        "insurance_id" INT,
        "billing_amount" FLOAT,
        "room_number" INT,
        "admission_type" VARCHAR(255),
        "discharge_date" DATE,
        "medication" VARCHAR(255),
        "test_results" VARCHAR(255)
    )
    "#);
}

#[test]
fn patient_table_ddl() {
    let tables = sample_star(&TargetNames::default());
    insta::assert_snapshot!(create_table_sql(&tables.dimensions[0].schema).unwrap(), @r#"
    CREATE TABLE "main"."dim_patient" (
        "patient_id" INT PRIMARY KEY,
        "name" VARCHAR(255),
        "date_of_admission" DATE,
        "age" INT
    )
    "#);
}
