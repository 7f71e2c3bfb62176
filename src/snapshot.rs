use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;
use chrono::DateTime;
use parquet::data_type::Decimal;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use tracing::debug;

use crate::error::Result;

/// A single upstream cell, typed only as loosely as the snapshot format allows.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Numeric view; text is parsed so string-encoded ratings still count.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Int(n) => Some(*n as f64),
            RawValue::Float(f) if f.is_finite() => Some(*f),
            RawValue::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawValue::Int(n) => Some(*n),
            RawValue::Float(f) if f.is_finite() => Some(f.round() as i64),
            RawValue::Text(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Null => None,
            RawValue::Bool(b) => Some(b.to_string()),
            RawValue::Int(n) => Some(n.to_string()),
            RawValue::Float(f) => Some(f.to_string()),
            RawValue::Text(s) => Some(s.clone()),
        }
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

/// Non-finite floats become `Null`; everything else passes through unchanged.
pub fn sanitize(value: RawValue) -> RawValue {
    match value {
        RawValue::Float(f) if !f.is_finite() => RawValue::Null,
        other => other,
    }
}

/// One decoded snapshot row keyed by upstream column name.
///
/// Only the field mapper reads these; everything downstream works with the
/// typed records in [`crate::records`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    values: BTreeMap<String, RawValue>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<RawValue>) -> Self {
        self.insert(key, value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: RawValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, RawValue)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, RawValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Decode a Parquet snapshot body into rows. Any row the reader cannot
/// materialise fails the whole snapshot.
pub fn decode_parquet(body: Bytes) -> Result<Vec<RawRow>> {
    let reader = SerializedFileReader::new(body)?;
    let iter = reader.get_row_iter(None)?;

    let mut out = Vec::new();
    let mut unsupported: BTreeSet<String> = BTreeSet::new();
    for row in iter {
        let row = row?;
        let raw = row
            .get_column_iter()
            .map(|(name, field)| {
                let value = field_to_raw(field).unwrap_or_else(|| {
                    if unsupported.insert(name.clone()) {
                        debug!(column = %name, "nested snapshot column read as null");
                    }
                    RawValue::Null
                });
                (name.clone(), value)
            })
            .collect::<RawRow>();
        out.push(raw);
    }
    Ok(out)
}

/// `None` for nested kinds the pipeline has no use for.
fn field_to_raw(field: &Field) -> Option<RawValue> {
    let value = match field {
        Field::Null => RawValue::Null,
        Field::Bool(b) => RawValue::Bool(*b),
        Field::Byte(n) => RawValue::Int(i64::from(*n)),
        Field::Short(n) => RawValue::Int(i64::from(*n)),
        Field::Int(n) => RawValue::Int(i64::from(*n)),
        Field::Long(n) => RawValue::Int(*n),
        Field::UByte(n) => RawValue::Int(i64::from(*n)),
        Field::UShort(n) => RawValue::Int(i64::from(*n)),
        Field::UInt(n) => RawValue::Int(i64::from(*n)),
        Field::ULong(n) => i64::try_from(*n).map(RawValue::Int).unwrap_or(RawValue::Null),
        Field::Float16(f) => RawValue::Float(f64::from(*f)),
        Field::Float(f) => RawValue::Float(f64::from(*f)),
        Field::Double(f) => RawValue::Float(*f),
        Field::Decimal(d) => decimal_to_f64(d).map(RawValue::Float).unwrap_or(RawValue::Null),
        Field::Str(s) => RawValue::Text(s.clone()),
        Field::Bytes(b) => b
            .as_utf8()
            .map(|s| RawValue::Text(s.to_string()))
            .unwrap_or(RawValue::Null),
        Field::Date(days) => DateTime::from_timestamp(i64::from(*days) * 86_400, 0)
            .map(|dt| RawValue::Text(dt.date_naive().format("%Y-%m-%d").to_string()))
            .unwrap_or(RawValue::Null),
        Field::TimestampMillis(ms) => DateTime::from_timestamp_millis(*ms)
            .map(|dt| RawValue::Text(dt.to_rfc3339()))
            .unwrap_or(RawValue::Null),
        Field::TimestampMicros(us) => DateTime::from_timestamp_micros(*us)
            .map(|dt| RawValue::Text(dt.to_rfc3339()))
            .unwrap_or(RawValue::Null),
        _ => return None,
    };
    Some(value)
}

/// Unscaled big-endian two's complement bytes over `10^scale`.
fn decimal_to_f64(decimal: &Decimal) -> Option<f64> {
    let bytes = decimal.data();
    if bytes.is_empty() || bytes.len() > 16 {
        return None;
    }
    let fill = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut buf = [fill; 16];
    buf[16 - bytes.len()..].copy_from_slice(bytes);
    let unscaled = i128::from_be_bytes(buf);
    Some(unscaled as f64 / 10f64.powi(decimal.scale()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_drops_non_finite_floats() {
        assert_eq!(sanitize(RawValue::Float(f64::NAN)), RawValue::Null);
        assert_eq!(sanitize(RawValue::Float(f64::INFINITY)), RawValue::Null);
        assert_eq!(sanitize(RawValue::Float(f64::NEG_INFINITY)), RawValue::Null);
        assert_eq!(sanitize(RawValue::Float(1.5)), RawValue::Float(1.5));
        assert_eq!(sanitize(RawValue::Int(7)), RawValue::Int(7));
        assert_eq!(sanitize("W".into()), RawValue::Text("W".to_string()));
    }

    #[test]
    fn numeric_views_accept_text() {
        assert_eq!(RawValue::from("110.5").as_f64(), Some(110.5));
        assert_eq!(RawValue::from("abc").as_f64(), None);
        assert_eq!(RawValue::Float(12345.0).as_i64(), Some(12345));
        assert_eq!(RawValue::Null.as_text(), None);
    }

    #[test]
    fn date_fields_render_iso() {
        // 2024-01-15 is 19737 days after the epoch.
        assert_eq!(
            field_to_raw(&Field::Date(19737)),
            Some(RawValue::Text("2024-01-15".to_string()))
        );
    }

    #[test]
    fn decimal_columns_read_as_floats() {
        assert_eq!(
            field_to_raw(&Field::Decimal(Decimal::from_i32(11_250, 6, 2))),
            Some(RawValue::Float(112.5))
        );
        assert_eq!(
            field_to_raw(&Field::Decimal(Decimal::from_i64(-1_234, 10, 2))),
            Some(RawValue::Float(-12.34))
        );
        assert_eq!(
            field_to_raw(&Field::Decimal(Decimal::from_bytes(
                vec![0xFF, 0x85].into(),
                4,
                1
            ))),
            Some(RawValue::Float(-12.3))
        );
    }

    #[test]
    fn nested_columns_are_unsupported() {
        assert_eq!(field_to_raw(&Field::Group(parquet::record::Row::new(vec![]))), None);
        assert_eq!(field_to_raw(&Field::Null), Some(RawValue::Null));
    }
}
