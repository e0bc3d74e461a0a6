use hcetl_ingest::RawDataset;
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};

pub const HEADERS: [&str; 15] = [
    "Name",
    "Age",
    "Gender",
    "Blood Type",
    "Medical Condition",
    "Date of Admission",
    "Doctor",
    "Hospital",
    "Insurance Provider",
    "Billing Amount",
    "Room Number",
    "Admission Type",
    "Discharge Date",
    "Medication",
    "Test Results",
];

/// A plausible source row; individual cells are overridden per test.
pub fn row(name: &str, admitted: &str) -> [String; 15] {
    [
        name,
        "41",
        "Female",
        "A+",
        "Asthma",
        admitted,
        "Dr Who",
        "General Hospital,",
        "Aetna",
        "1,234.50",
        "101",
        "Urgent",
        "05-02-2024",
        "Ibuprofen",
        "Normal",
    ]
    .map(str::to_string)
}

pub fn raw_with_headers(headers: &[&str], rows: &[[String; 15]]) -> RawDataset {
    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let cells: Vec<String> = rows.iter().map(|row| row[idx].clone()).collect();
            Series::new((*header).into(), cells).into_column()
        })
        .collect();
    RawDataset::new(DataFrame::new(columns).unwrap())
}

pub fn raw(rows: &[[String; 15]]) -> RawDataset {
    raw_with_headers(&HEADERS, rows)
}
