use polars::prelude::DataFrame;

/// A raw extract: untyped cells under headers exactly as found in the source.
#[derive(Debug, Clone)]
pub struct RawDataset {
    frame: DataFrame,
}

impl RawDataset {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }
}

impl From<DataFrame> for RawDataset {
    fn from(frame: DataFrame) -> Self {
        Self::new(frame)
    }
}

/// An already-materialized dataset is its own source.
impl crate::Source for RawDataset {
    fn describe(&self) -> String {
        format!("in-memory frame ({} rows)", self.height())
    }

    fn read(&self) -> crate::Result<RawDataset> {
        Ok(self.clone())
    }
}
