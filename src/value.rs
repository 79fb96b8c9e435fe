// Dynamic SQL values and the conversions in and out of them.
//
// `SqlValue` is the single currency between parameter bags, the bind layer,
// and the row decoder. Rich types (date/time, UUID, JSON, DECIMAL) are
// carried as their string form, which every supported backend accepts for
// binding and which fields can parse back out of.

use crate::error::Error;

/// A dynamically typed SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl SqlValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "NULL",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "i64",
            SqlValue::Float(_) => "f64",
            SqlValue::Text(_) => "text",
            SqlValue::Bytes(_) => "bytes",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

/// Conversion into a bindable [`SqlValue`].
///
/// Implement this for custom types to use them in parameter bags.
pub trait ToSqlValue {
    fn to_sql(&self) -> SqlValue;
}

/// Conversion out of a decoded [`SqlValue`] into a field type.
pub trait FromSqlValue: Sized {
    fn from_sql(value: SqlValue) -> Result<Self, Error>;
}

/// A positional decode destination; see direct decode.
pub trait ScanTarget {
    fn set(&mut self, value: SqlValue) -> Result<(), Error>;
}

impl<T: FromSqlValue> ScanTarget for T {
    fn set(&mut self, value: SqlValue) -> Result<(), Error> {
        *self = T::from_sql(value)?;
        Ok(())
    }
}

fn convert_err(value: &SqlValue, into: &'static str) -> Error {
    Error::Convert {
        from: value.type_name(),
        into,
    }
}

// ============================================================================
// ToSqlValue
// ============================================================================

impl ToSqlValue for SqlValue {
    fn to_sql(&self) -> SqlValue {
        self.clone()
    }
}

impl ToSqlValue for String {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl ToSqlValue for &str {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

impl ToSqlValue for bool {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }
}

macro_rules! to_sql_int {
    ($($t:ty),*) => {$(
        impl ToSqlValue for $t {
            fn to_sql(&self) -> SqlValue {
                SqlValue::Int(*self as i64)
            }
        }
    )*};
}

to_sql_int!(i8, i16, i32, i64, u8, u16, u32);

impl ToSqlValue for u64 {
    fn to_sql(&self) -> SqlValue {
        match i64::try_from(*self) {
            Ok(v) => SqlValue::Int(v),
            // out of i64 range; carry as text rather than wrap
            Err(_) => SqlValue::Text(self.to_string()),
        }
    }
}

impl ToSqlValue for f32 {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Float(f64::from(*self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Float(*self)
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Bytes(self.clone())
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Bytes(self.to_vec())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql(&self) -> SqlValue {
        match self {
            Some(v) => v.to_sql(),
            None => SqlValue::Null,
        }
    }
}

#[cfg(feature = "chrono")]
impl ToSqlValue for chrono::NaiveDate {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Text(self.format("%Y-%m-%d").to_string())
    }
}

#[cfg(feature = "chrono")]
impl ToSqlValue for chrono::NaiveTime {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Text(self.format("%H:%M:%S%.9f").to_string())
    }
}

#[cfg(feature = "chrono")]
impl ToSqlValue for chrono::NaiveDateTime {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Text(self.format("%Y-%m-%d %H:%M:%S%.9f").to_string())
    }
}

#[cfg(feature = "chrono")]
impl ToSqlValue for chrono::DateTime<chrono::Utc> {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Text(self.format("%Y-%m-%d %H:%M:%S%.9f%:z").to_string())
    }
}

#[cfg(feature = "uuid")]
impl ToSqlValue for uuid::Uuid {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

#[cfg(feature = "json")]
impl ToSqlValue for serde_json::Value {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

#[cfg(feature = "decimal")]
impl ToSqlValue for rust_decimal::Decimal {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

// ============================================================================
// FromSqlValue
// ============================================================================

impl FromSqlValue for SqlValue {
    fn from_sql(value: SqlValue) -> Result<Self, Error> {
        Ok(value)
    }
}

impl FromSqlValue for i64 {
    fn from_sql(value: SqlValue) -> Result<Self, Error> {
        match value {
            SqlValue::Int(v) => Ok(v),
            other => Err(convert_err(&other, "i64")),
        }
    }
}

macro_rules! from_sql_int {
    ($($t:ty),*) => {$(
        impl FromSqlValue for $t {
            fn from_sql(value: SqlValue) -> Result<Self, Error> {
                match value {
                    SqlValue::Int(v) => <$t>::try_from(v)
                        .map_err(|_| convert_err(&SqlValue::Int(v), stringify!($t))),
                    other => Err(convert_err(&other, stringify!($t))),
                }
            }
        }
    )*};
}

from_sql_int!(i8, i16, i32, u8, u16, u32, u64);

impl FromSqlValue for f64 {
    fn from_sql(value: SqlValue) -> Result<Self, Error> {
        match value {
            SqlValue::Float(v) => Ok(v),
            SqlValue::Int(v) => Ok(v as f64),
            other => Err(convert_err(&other, "f64")),
        }
    }
}

impl FromSqlValue for f32 {
    fn from_sql(value: SqlValue) -> Result<Self, Error> {
        f64::from_sql(value).map(|v| v as f32)
    }
}

impl FromSqlValue for bool {
    fn from_sql(value: SqlValue) -> Result<Self, Error> {
        match value {
            SqlValue::Bool(v) => Ok(v),
            // backends without a real boolean type report 0/1 integers
            SqlValue::Int(0) => Ok(false),
            SqlValue::Int(1) => Ok(true),
            other => Err(convert_err(&other, "bool")),
        }
    }
}

impl FromSqlValue for String {
    fn from_sql(value: SqlValue) -> Result<Self, Error> {
        match value {
            SqlValue::Text(v) => Ok(v),
            other => Err(convert_err(&other, "String")),
        }
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql(value: SqlValue) -> Result<Self, Error> {
        match value {
            SqlValue::Bytes(v) => Ok(v),
            SqlValue::Text(v) => Ok(v.into_bytes()),
            other => Err(convert_err(&other, "Vec<u8>")),
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql(value: SqlValue) -> Result<Self, Error> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql(other).map(Some),
        }
    }
}

#[cfg(feature = "chrono")]
impl FromSqlValue for chrono::NaiveDate {
    fn from_sql(value: SqlValue) -> Result<Self, Error> {
        let text = String::from_sql(value)?;
        chrono::NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map_err(|_| convert_err(&SqlValue::Text(text), "NaiveDate"))
    }
}

#[cfg(feature = "chrono")]
impl FromSqlValue for chrono::NaiveTime {
    fn from_sql(value: SqlValue) -> Result<Self, Error> {
        let text = String::from_sql(value)?;
        chrono::NaiveTime::parse_from_str(&text, "%H:%M:%S%.f")
            .map_err(|_| convert_err(&SqlValue::Text(text), "NaiveTime"))
    }
}

#[cfg(feature = "chrono")]
impl FromSqlValue for chrono::NaiveDateTime {
    fn from_sql(value: SqlValue) -> Result<Self, Error> {
        let text = String::from_sql(value)?;
        chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f")
            .or_else(|_| chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f"))
            .map_err(|_| convert_err(&SqlValue::Text(text), "NaiveDateTime"))
    }
}

#[cfg(feature = "chrono")]
impl FromSqlValue for chrono::DateTime<chrono::Utc> {
    fn from_sql(value: SqlValue) -> Result<Self, Error> {
        use chrono::{DateTime, Utc};
        let text = String::from_sql(value)?;
        if let Ok(v) = DateTime::parse_from_rfc3339(&text) {
            return Ok(v.with_timezone(&Utc));
        }
        if let Ok(v) = DateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f%:z") {
            return Ok(v.with_timezone(&Utc));
        }
        chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| convert_err(&SqlValue::Text(text), "DateTime<Utc>"))
    }
}

#[cfg(feature = "uuid")]
impl FromSqlValue for uuid::Uuid {
    fn from_sql(value: SqlValue) -> Result<Self, Error> {
        let text = String::from_sql(value)?;
        uuid::Uuid::parse_str(&text).map_err(|_| convert_err(&SqlValue::Text(text), "Uuid"))
    }
}

#[cfg(feature = "json")]
impl FromSqlValue for serde_json::Value {
    fn from_sql(value: SqlValue) -> Result<Self, Error> {
        let text = String::from_sql(value)?;
        serde_json::from_str(&text).map_err(|_| convert_err(&SqlValue::Text(text), "json::Value"))
    }
}

#[cfg(feature = "decimal")]
impl FromSqlValue for rust_decimal::Decimal {
    fn from_sql(value: SqlValue) -> Result<Self, Error> {
        use std::str::FromStr;
        match value {
            SqlValue::Int(v) => Ok(rust_decimal::Decimal::from(v)),
            SqlValue::Text(v) => rust_decimal::Decimal::from_str(&v)
                .map_err(|_| convert_err(&SqlValue::Text(v), "Decimal")),
            other => Err(convert_err(&other, "Decimal")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ints_narrow_with_range_check() {
        assert_eq!(i32::from_sql(SqlValue::Int(42)).unwrap(), 42);
        assert!(i8::from_sql(SqlValue::Int(300)).is_err());
        assert!(u32::from_sql(SqlValue::Int(-1)).is_err());
    }

    #[test]
    fn floats_accept_ints() {
        assert_eq!(f64::from_sql(SqlValue::Int(3)).unwrap(), 3.0);
        assert_eq!(f64::from_sql(SqlValue::Float(1.5)).unwrap(), 1.5);
    }

    #[test]
    fn bool_accepts_zero_one() {
        assert!(bool::from_sql(SqlValue::Int(1)).unwrap());
        assert!(!bool::from_sql(SqlValue::Int(0)).unwrap());
        assert!(bool::from_sql(SqlValue::Int(2)).is_err());
    }

    #[test]
    fn null_maps_to_none_and_fails_elsewhere() {
        assert_eq!(Option::<i64>::from_sql(SqlValue::Null).unwrap(), None);
        assert_eq!(
            Option::<i64>::from_sql(SqlValue::Int(7)).unwrap(),
            Some(7)
        );
        assert!(i64::from_sql(SqlValue::Null).is_err());
    }

    #[test]
    fn text_is_strict_for_strings() {
        assert_eq!(
            String::from_sql(SqlValue::Text("x".into())).unwrap(),
            "x"
        );
        assert!(String::from_sql(SqlValue::Int(1)).is_err());
    }

    #[test]
    fn scan_target_writes_through() {
        let mut n: i64 = 0;
        let mut s = String::new();
        (&mut n as &mut dyn ScanTarget).set(SqlValue::Int(9)).unwrap();
        (&mut s as &mut dyn ScanTarget)
            .set(SqlValue::Text("hi".into()))
            .unwrap();
        assert_eq!(n, 9);
        assert_eq!(s, "hi");
    }

    #[test]
    fn u64_out_of_range_falls_back_to_text() {
        assert_eq!(
            u64::MAX.to_sql(),
            SqlValue::Text("18446744073709551615".to_string())
        );
        assert_eq!(7u64.to_sql(), SqlValue::Int(7));
    }

    #[cfg(feature = "chrono")]
    #[test]
    fn chrono_round_trips_through_text() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let v = date.to_sql();
        assert_eq!(chrono::NaiveDate::from_sql(v).unwrap(), date);
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_round_trips_through_text() {
        let v = serde_json::json!({"a": [1, 2, 3]});
        let sql = v.to_sql();
        assert_eq!(serde_json::Value::from_sql(sql).unwrap(), v);
    }
}
