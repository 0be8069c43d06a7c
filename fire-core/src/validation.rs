//! Request validation - JSON payload → FireWeather
//!
//! Every field of FEATURE_LAYOUT is required. Presence of all fields is
//! checked first, then each value is coerced in layout order, so the first
//! missing field wins over any type error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::encoder::{CategoryEncoder, CategoryEncoders};
use crate::layout::{FeatureKind, FireWeather, FEATURE_COUNT, FEATURE_LAYOUT};

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Client-side request errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("No data provided")]
    EmptyPayload,

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid data type for '{field}': {reason}")]
    InvalidType { field: String, reason: String },
}

impl ValidationError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidType {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// How strictly field values are coerced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Numbers, numeric strings and known month/day labels
    #[default]
    Lenient,
    /// JSON numbers only; month/day must be integral
    Strict,
}

impl std::str::FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(ValidationMode::Lenient),
            "strict" => Ok(ValidationMode::Strict),
            other => Err(format!("unknown validation mode '{}'", other)),
        }
    }
}

/// Configurable payload validator
#[derive(Debug, Clone, Default)]
pub struct Validator {
    mode: ValidationMode,
    encoders: Option<CategoryEncoders>,
}

impl Validator {
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode, encoders: None }
    }

    /// Allow month/day labels to be resolved through the training encoders
    pub fn with_encoders(mut self, encoders: CategoryEncoders) -> Self {
        self.encoders = Some(encoders);
        self
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Validate a raw request body
    pub fn validate_body(&self, body: &[u8]) -> ValidationResult<FireWeather> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ValidationError::EmptyPayload);
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;

        self.validate(Some(&value))
    }

    /// Validate an already parsed payload
    pub fn validate(&self, payload: Option<&Value>) -> ValidationResult<FireWeather> {
        let object = match payload {
            None | Some(Value::Null) => return Err(ValidationError::EmptyPayload),
            Some(Value::Object(map)) if map.is_empty() => return Err(ValidationError::EmptyPayload),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(ValidationError::MalformedBody(format!(
                    "expected a JSON object, got {}",
                    describe(other)
                )))
            }
        };

        if let Some(missing) = FEATURE_LAYOUT.iter().find(|spec| !object.contains_key(spec.name)) {
            return Err(ValidationError::MissingField(missing.name.to_string()));
        }

        let values = self.coerce_all(object)?;

        Ok(FireWeather {
            ffmc: values[0],
            dmc: values[1],
            dc: values[2],
            isi: values[3],
            temp: values[4],
            rh: values[5],
            wind: values[6],
            rain: values[7],
            month: values[8] as i64,
            day: values[9] as i64,
        })
    }

    fn coerce_all(&self, object: &Map<String, Value>) -> ValidationResult<[f64; FEATURE_COUNT]> {
        let mut values = [0.0; FEATURE_COUNT];

        for (slot, spec) in values.iter_mut().zip(FEATURE_LAYOUT) {
            let raw = &object[spec.name];
            *slot = match spec.kind {
                FeatureKind::Continuous => self.coerce_float(spec.name, raw)?,
                FeatureKind::Encoded => {
                    let encoder = self.encoders.as_ref().and_then(|e| e.for_feature(spec.name));
                    self.coerce_int(spec.name, raw, encoder)? as f64
                }
            };
        }

        Ok(values)
    }

    fn coerce_float(&self, field: &str, raw: &Value) -> ValidationResult<f64> {
        let value = match (raw, self.mode) {
            (Value::Number(n), _) => n
                .as_f64()
                .ok_or_else(|| ValidationError::invalid(field, "number is not representable"))?,
            (Value::String(s), ValidationMode::Lenient) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::invalid(field, format!("could not convert string to float: '{}'", s)))?,
            (other, _) => {
                return Err(ValidationError::invalid(
                    field,
                    format!("expected a number, got {}", describe(other)),
                ))
            }
        };

        if !value.is_finite() {
            return Err(ValidationError::invalid(field, "value must be finite"));
        }

        Ok(value)
    }

    fn coerce_int(
        &self,
        field: &str,
        raw: &Value,
        encoder: Option<&CategoryEncoder>,
    ) -> ValidationResult<i64> {
        match (raw, self.mode) {
            (Value::Number(n), mode) => {
                if let Some(i) = n.as_i64() {
                    return Ok(i);
                }
                let f = n
                    .as_f64()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .ok_or_else(|| ValidationError::invalid(field, "integer out of range"))?;
                if mode == ValidationMode::Strict && f.fract() != 0.0 {
                    return Err(ValidationError::invalid(field, format!("expected an integer, got {}", f)));
                }
                Ok(f.trunc() as i64)
            }
            (Value::String(s), ValidationMode::Lenient) => {
                if let Ok(i) = s.trim().parse::<i64>() {
                    return Ok(i);
                }
                encoder
                    .and_then(|e| e.encode(s))
                    .map(|index| index as i64)
                    .ok_or_else(|| {
                        ValidationError::invalid(field, format!("invalid literal for int(): '{}'", s))
                    })
            }
            (other, _) => Err(ValidationError::invalid(
                field,
                format!("expected an integer, got {}", describe(other)),
            )),
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
