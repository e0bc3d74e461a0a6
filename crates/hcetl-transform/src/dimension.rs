//! Dimension extraction.

use hcetl_model::{DimensionSpec, DimensionTable, NormalizedRecord, SchemaError, StarDimensions};
use tracing::{debug, info};

/// Specifications for the four star-schema dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarDimensionSpecs {
    pub patient: DimensionSpec,
    pub doctor: DimensionSpec,
    pub hospital: DimensionSpec,
    pub insurance: DimensionSpec,
}

impl Default for StarDimensionSpecs {
    fn default() -> Self {
        Self {
            patient: DimensionSpec::patient(),
            doctor: DimensionSpec::doctor(),
            hospital: DimensionSpec::hospital(),
            insurance: DimensionSpec::insurance_provider(),
        }
    }
}

/// Builds one dimension table from the normalized records.
///
/// Rows are deduplicated on the natural key. The first occurrence of a key
/// supplies the carried attributes; later occurrences with different
/// attributes are dropped. Surrogate ids are dense and follow first-seen
/// order, so the output is deterministic for a given input order.
///
/// # Errors
///
/// Returns a [`SchemaError`] if the spec names an unknown column or has an
/// empty natural key.
pub fn build_dimension(
    records: &[NormalizedRecord],
    spec: &DimensionSpec,
) -> Result<DimensionTable, SchemaError> {
    let (key_columns, attribute_columns) = spec.resolve()?;
    let mut table = DimensionTable::new(
        spec.name.as_str(),
        spec.id_column.as_str(),
        key_columns,
        attribute_columns,
    );

    let mut conflicting = 0usize;
    for record in records {
        let key = record.project(&table.key_columns);
        let attributes = record.project(&table.attribute_columns);
        if let Some(id) = table.lookup(&key) {
            if table.row(id).is_some_and(|kept| kept.attributes != attributes) {
                conflicting += 1;
            }
            continue;
        }
        table.insert_first_seen(key, attributes);
    }

    if conflicting > 0 {
        debug!(
            dimension = %table.name,
            conflicting,
            "later rows disagreed with first-seen attributes"
        );
    }
    info!(
        dimension = %table.name,
        input_rows = records.len(),
        rows = table.len(),
        "built dimension"
    );
    Ok(table)
}

/// Builds the four dimensions, optionally in parallel.
///
/// The dimensions are independent of each other, so the parallel build
/// produces exactly the same tables as the sequential one.
pub fn build_star_dimensions(
    records: &[NormalizedRecord],
    specs: &StarDimensionSpecs,
    parallel: bool,
) -> Result<StarDimensions, SchemaError> {
    let build = |spec: &DimensionSpec| build_dimension(records, spec);

    let (patient, doctor, hospital, insurance) = if parallel {
        let ((patient, doctor), (hospital, insurance)) = rayon::join(
            || rayon::join(|| build(&specs.patient), || build(&specs.doctor)),
            || rayon::join(|| build(&specs.hospital), || build(&specs.insurance)),
        );
        (patient, doctor, hospital, insurance)
    } else {
        (
            build(&specs.patient),
            build(&specs.doctor),
            build(&specs.hospital),
            build(&specs.insurance),
        )
    };

    Ok(StarDimensions {
        patient: patient?,
        doctor: doctor?,
        hospital: hospital?,
        insurance: insurance?,
    })
}
