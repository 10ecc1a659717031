//! Response body decoders selected by content type.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// How a response body will be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Json,
    Csv,
    Other,
}

impl ContentKind {
    /// Classify a `Content-Type` value. Matching is exact: parameters such as
    /// `; charset=utf-8` or a different case select `Other`.
    pub fn classify(content_type: Option<&str>) -> Self {
        match content_type {
            Some(JSON_CONTENT_TYPE) => ContentKind::Json,
            Some(CSV_CONTENT_TYPE) => ContentKind::Csv,
            _ => ContentKind::Other,
        }
    }
}

/// Decoded response payload.
///
/// JSON bodies fill the caller's target type. CSV bodies always produce
/// string rows in place of the target.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// `Data` of a JSON envelope; `None` when the envelope has no `Data`.
    Json(Option<T>),
    Rows(Vec<Vec<String>>),
    Undecoded,
}

impl<T> Decoded<T> {
    pub fn into_json(self) -> Option<T> {
        match self {
            Decoded::Json(data) => data,
            _ => None,
        }
    }

    pub fn into_rows(self) -> Option<Vec<Vec<String>>> {
        match self {
            Decoded::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn is_undecoded(&self) -> bool {
        matches!(self, Decoded::Undecoded)
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(rename = "Count", default)]
    count: i64,
    #[serde(rename = "Total", default)]
    total: i64,
    #[serde(rename = "Data", default = "Option::default")]
    data: Option<T>,
}

/// Decode a `{"Count":..,"Total":..,"Data":..}` envelope.
///
/// Returns `(count, total, data)`. Missing counters read as zero; signed
/// counters are passed through as sent.
pub fn decode_json_envelope<T: DeserializeOwned>(
    body: &[u8],
) -> Result<(i64, i64, Option<T>), ApiError> {
    let envelope: Envelope<T> = serde_json::from_slice(body)?;
    Ok((envelope.count, envelope.total, envelope.data))
}

/// Parse every line of `body` as a CSV record. The first line is data, not a
/// header, and all records must have the same number of fields.
pub fn decode_csv_rows(body: &[u8]) -> Result<Vec<Vec<String>>, ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(body);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}
