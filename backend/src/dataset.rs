use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// One CSV row keyed by header, in file column order.
pub type Record = IndexMap<String, Value>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("malformed dataset: {0}")]
    Csv(#[from] csv::Error),
}

/// Static table served by the preview endpoint. Never consulted for
/// inference.
#[derive(Debug, Clone, Default)]
pub struct ReferenceDataset {
    records: Vec<Record>,
}

impl ReferenceDataset {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| DatasetError::Open {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_csv_reader(reader)
    }

    pub fn from_reader<R: Read>(input: R) -> Result<Self, DatasetError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(input);
        Self::from_csv_reader(reader)
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, DatasetError> {
        let headers = reader.headers()?.clone();
        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let record: Record = headers
                .iter()
                .zip(row.iter())
                .map(|(name, cell)| (name.to_string(), cell_value(cell)))
                .collect();
            records.push(record);
        }
        Ok(ReferenceDataset { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn head(&self, n: usize) -> &[Record] {
        &self.records[..n.min(self.records.len())]
    }
}

fn cell_value(cell: &str) -> Value {
    if let Ok(int) = cell.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = cell.parse::<f64>() {
        // NaN and inf have no JSON form; keep the text.
        if float.is_finite() {
            return Value::from(float);
        }
    }
    Value::from(cell)
}
