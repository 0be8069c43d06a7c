//! Forest fire CSV loading and encoding
//!
//! Columns are looked up by header name, so order and extra columns don't
//! matter. Continuous features and `area` must parse as floats; month and
//! day are kept as raw labels until encoding.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use super::TrainError;
use crate::encoder::{CategoryEncoder, CategoryEncoders};
use crate::layout::{FeatureKind, FeatureVector, DAY_INDEX, FEATURE_COUNT, FEATURE_LAYOUT, MONTH_INDEX};

/// Burned area column; a row is a fire when area > 0
pub const TARGET_COLUMN: &str = "area";

/// One CSV row before category encoding
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// Continuous features in layout order; encoded slots are 0.0
    pub features: [f64; FEATURE_COUNT],
    pub month: String,
    pub day: String,
    pub area: f64,
}

impl RawRow {
    pub fn is_fire(&self) -> bool {
        self.area > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawDataset {
    pub source: String,
    pub rows: Vec<RawRow>,
}

/// Model-ready rows, labels and the encoders that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedDataset {
    pub rows: Vec<FeatureVector>,
    pub labels: Vec<bool>,
    pub encoders: CategoryEncoders,
}

impl RawDataset {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TrainError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TrainError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, &path.display().to_string())
    }

    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self, TrainError> {
        let mut csv = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

        let headers = csv.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| TrainError::MissingColumn(name.to_string()))
        };

        let mut feature_columns = [0usize; FEATURE_COUNT];
        for (slot, spec) in feature_columns.iter_mut().zip(FEATURE_LAYOUT) {
            *slot = column(spec.name)?;
        }
        let area_column = column(TARGET_COLUMN)?;

        let mut rows = Vec::new();
        for record in csv.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());

            let mut features = [0.0; FEATURE_COUNT];
            for (i, spec) in FEATURE_LAYOUT.iter().enumerate() {
                if spec.kind == FeatureKind::Continuous {
                    features[i] = parse_float(&record, feature_columns[i], spec.name, line)?;
                }
            }

            rows.push(RawRow {
                features,
                month: field(&record, feature_columns[MONTH_INDEX]).to_string(),
                day: field(&record, feature_columns[DAY_INDEX]).to_string(),
                area: parse_float(&record, area_column, TARGET_COLUMN, line)?,
            });
        }

        log::info!("Loaded {} rows from {}", rows.len(), source);

        Ok(Self {
            source: source.to_string(),
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Label rows by `area > 0` and encode month/day to indices
    pub fn encode(&self) -> EncodedDataset {
        let encoders = CategoryEncoders {
            month: CategoryEncoder::fit(self.rows.iter().map(|r| r.month.as_str())),
            day: CategoryEncoder::fit(self.rows.iter().map(|r| r.day.as_str())),
        };

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut values = row.features;
                values[MONTH_INDEX] = encode_index(&encoders.month, &row.month);
                values[DAY_INDEX] = encode_index(&encoders.day, &row.day);
                FeatureVector::new(values)
            })
            .collect();

        let labels = self.rows.iter().map(RawRow::is_fire).collect();

        EncodedDataset { rows, labels, encoders }
    }
}

fn encode_index(encoder: &CategoryEncoder, label: &str) -> f64 {
    // Encoders are fitted on these same rows, so every label is known
    encoder.encode(label).unwrap_or_default() as f64
}

fn field<'r>(record: &'r StringRecord, column: usize) -> &'r str {
    record.get(column).unwrap_or("")
}

fn parse_float(record: &StringRecord, column: usize, name: &str, line: u64) -> Result<f64, TrainError> {
    let raw = field(record, column);
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TrainError::InvalidValue {
            line,
            column: name.to_string(),
            value: raw.to_string(),
        })
}
