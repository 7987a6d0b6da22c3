//! MongoDB Extended JSON decoding
//!
//! Change streams and collection scans hand over documents in Extended JSON:
//! driver-native types are wrapped in single-key objects whose key carries a
//! `$` sigil, e.g. `{"$oid": "..."}` or `{"$date": {"$numberLong": "..."}}`.
//! [`ExtendedJsonConverter`] walks a document recursively and rewrites every
//! tagged value into a plain JSON value the sink can store in a dynamic
//! object column.
//!
//! Datetime-like tags (`$date`, `$timestamp`) are rendered through a
//! configurable [`DatetimeFormat`]. Every other tag has a fixed rule:
//!
//! | Tag | Result |
//! |-----|--------|
//! | `$oid`, `$symbol`, `$code` | payload string |
//! | `$numberInt` | integer |
//! | `$numberDouble` | float, non-finite values stay text |
//! | `$numberLong`, `$numberDecimal` | payload string, avoiding precision loss |
//! | `$binary` | UUID string for subtype `04`, canonical Base64 otherwise |
//! | `$regularExpression` | `Regex('<pattern>', <flags>)` |
//! | `$maxKey` / `$minKey` | `MaxKey()` / `MinKey()` |
//! | `$undefined` | `null` |
//!
//! A single-key object with an unrecognized `$` key is kept verbatim, as are
//! multi-key objects (their values are decoded recursively, which also covers
//! `{"$code": ..., "$scope": ...}` and DBRef shapes).

use base64::alphabet;
use base64::engine::{DecodePaddingMode, Engine as _, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::warn;
use uuid::Uuid;

use crate::common::TransformChain;

/// Tolerates unpadded input and stray trailing bits, re-encodes canonically.
const BASE64_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Output representation for decoded datetime values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatetimeFormat {
    /// RFC 3339 text in UTC, e.g. `2024-07-11T23:17:42Z`.
    Native,
    /// Numeric epoch, floored to whole seconds before optional scaling.
    Epoch {
        /// Scale the epoch value to milliseconds.
        milliseconds: bool,
    },
    /// ISO 8601 text without a UTC offset, e.g. `2024-07-11T23:17:42.987000`.
    Iso8601,
}

impl Default for DatetimeFormat {
    fn default() -> Self {
        Self::Epoch { milliseconds: true }
    }
}

/// Decodes MongoDB Extended JSON documents into plain sink-ready JSON.
///
/// ```
/// use brackish_codec::mongodb::{DatetimeFormat, ExtendedJsonConverter};
/// use serde_json::json;
///
/// let converter = ExtendedJsonConverter::default();
/// let decoded = converter.decode_document(json!({
///     "_id": {"$oid": "56027fcae4b09385a85f9344"},
///     "created": {"$date": "2024-07-11T23:17:42Z"},
/// }));
/// assert_eq!(
///     decoded,
///     json!({"_id": "56027fcae4b09385a85f9344", "created": 1720739862000i64})
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExtendedJsonConverter {
    datetime_format: DatetimeFormat,
    transform: Option<TransformChain>,
}

impl ExtendedJsonConverter {
    /// Create a converter rendering datetimes in the given format.
    pub fn new(datetime_format: DatetimeFormat) -> Self {
        Self {
            datetime_format,
            transform: None,
        }
    }

    /// Attach a transform chain applied per document in [`decode_documents`](Self::decode_documents).
    pub fn with_transform(mut self, transform: TransformChain) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Decode one document.
    pub fn decode_document(&self, document: Value) -> Value {
        self.decode_value(document)
    }

    /// Decode a batch of documents, running the transform chain on each.
    ///
    /// Documents dropped by the chain are omitted from the result.
    pub fn decode_documents(&self, documents: &[Value]) -> Vec<Value> {
        let decoded = documents
            .iter()
            .map(|document| self.decode_document(document.clone()));
        match &self.transform {
            Some(chain) => decoded
                .filter_map(|document| chain.apply(document))
                .collect(),
            None => decoded.collect(),
        }
    }

    /// Decode one value, recursing into containers.
    pub fn decode_value(&self, value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let tagged = map.len() == 1
                    && map.keys().next().is_some_and(|key| key.starts_with('$'));
                if tagged {
                    return self.decode_extended(map);
                }
                Value::Object(
                    map.into_iter()
                        .map(|(key, value)| (key, self.decode_value(value)))
                        .collect(),
                )
            }
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.decode_value(item))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Decode a single-entry `$`-tagged object.
    fn decode_extended(&self, map: Map<String, Value>) -> Value {
        let (tag, payload) = match map.iter().next() {
            Some((tag, payload)) => (tag.clone(), payload.clone()),
            None => return Value::Object(map),
        };
        match tag.as_str() {
            // All of these decode to their payload unchanged. $numberLong and
            // $numberDecimal stay text so values beyond f64 keep their digits.
            "$oid" | "$symbol" | "$code" | "$numberLong" | "$numberDecimal" => payload,
            "$date" => self.decode_date(&payload),
            "$numberInt" => match payload.as_str().and_then(|text| text.parse::<i64>().ok()) {
                Some(number) => Value::from(number),
                None => {
                    warn!("Invalid $numberInt value: {payload}");
                    payload
                }
            },
            "$numberDouble" => {
                let number = payload
                    .as_str()
                    .and_then(|text| text.parse::<f64>().ok())
                    .and_then(Number::from_f64);
                match number {
                    Some(number) => Value::Number(number),
                    None => {
                        warn!("Non-finite or invalid $numberDouble value: {payload}");
                        payload
                    }
                }
            }
            "$binary" => match self.decode_binary(&payload) {
                Some(decoded) => decoded,
                None => Value::Object(map),
            },
            "$timestamp" => {
                let datetime = payload
                    .get("t")
                    .and_then(Value::as_i64)
                    .and_then(|seconds| DateTime::from_timestamp(seconds, 0));
                match datetime {
                    Some(datetime) => self.render_datetime(datetime),
                    None => {
                        warn!("Decoding $timestamp value failed, falling back to zero: {payload}");
                        Value::from(0)
                    }
                }
            }
            "$regularExpression" => {
                let pattern = payload.get("pattern").and_then(Value::as_str).unwrap_or_default();
                let options = payload.get("options").and_then(Value::as_str).unwrap_or_default();
                Value::String(format!("Regex('{pattern}', {})", regex_flags(options)))
            }
            "$maxKey" => Value::String("MaxKey()".into()),
            "$minKey" => Value::String("MinKey()".into()),
            "$undefined" => Value::Null,
            // Unknown sigil: keep the object verbatim.
            _ => Value::Object(map),
        }
    }

    /// Decode a `$date` payload in canonical or legacy encoding.
    ///
    /// Values that cannot be parsed or fall outside the representable
    /// datetime range decode to zero rather than failing the whole document.
    fn decode_date(&self, payload: &Value) -> Value {
        let datetime = match payload {
            Value::String(text) => parse_datetime(text),
            Value::Number(number) => number.as_i64().and_then(DateTime::from_timestamp_millis),
            Value::Object(inner) => inner
                .get("$numberLong")
                .and_then(Value::as_str)
                .and_then(|text| text.parse::<i64>().ok())
                .and_then(DateTime::from_timestamp_millis),
            _ => None,
        };
        match datetime {
            Some(datetime) => self.render_datetime(datetime),
            None => {
                warn!("Decoding $date value failed, falling back to zero: {payload}");
                Value::from(0)
            }
        }
    }

    /// Decode a `$binary` payload. Returns None when the payload shape is off.
    fn decode_binary(&self, payload: &Value) -> Option<Value> {
        let text = payload.get("base64")?.as_str()?;
        let subtype = payload.get("subType").and_then(Value::as_str).unwrap_or("00");
        let bytes = match BASE64_LENIENT.decode(text) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!("Decoding $binary payload failed: {error}");
                return Some(Value::String(text.to_owned()));
            }
        };
        if subtype == "04" {
            if let Ok(uuid) = Uuid::from_slice(&bytes) {
                return Some(Value::String(uuid.to_string()));
            }
        }
        Some(Value::String(BASE64_LENIENT.encode(bytes)))
    }

    fn render_datetime(&self, datetime: DateTime<Utc>) -> Value {
        match self.datetime_format {
            DatetimeFormat::Native => {
                Value::String(datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            DatetimeFormat::Epoch { milliseconds } => {
                let seconds = datetime.timestamp();
                Value::from(if milliseconds { seconds * 1000 } else { seconds })
            }
            DatetimeFormat::Iso8601 => Value::String(format_iso8601(&datetime)),
        }
    }
}

fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// ISO 8601 without offset, fractional seconds only when nonzero.
fn format_iso8601(datetime: &DateTime<Utc>) -> String {
    let mut formatted = datetime.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string();
    let micros = datetime.timestamp_subsec_micros();
    if micros > 0 {
        formatted.push_str(&format!(".{micros:06}"));
    }
    formatted
}

/// Regex option letters folded into their numeric flag representation.
fn regex_flags(options: &str) -> i64 {
    options.chars().fold(0, |flags, option| {
        flags
            | match option {
                'i' => 2,
                'l' => 4,
                'm' => 8,
                's' => 16,
                'u' => 32,
                'x' => 64,
                _ => 0,
            }
    })
}
