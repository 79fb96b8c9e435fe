// Parameter bags and resolution against a bound key list.
//
// A bag supplies values for the keys produced by `bind::bind_params`.
// Resolution either yields exactly one value per key or fails; a partial
// argument list is never returned.

use std::collections::HashMap;

use crate::error::Error;
use crate::value::{SqlValue, ToSqlValue};

/// A struct usable as a named parameter bag.
///
/// Derive with `#[derive(Params)]`; `#[param(rename = "...")]` overrides the
/// key, `#[param(skip)]` excludes a field. The first declared field wins when
/// two map to the same key.
pub trait ParamRecord: Sync {
    fn param(&self, key: &str) -> Option<SqlValue>;
}

/// The caller-supplied parameter source for one binding call.
pub enum Params<'p> {
    /// No parameters. Resolves only against an empty key list.
    Empty,
    /// Named values, keys unique.
    Named(HashMap<String, SqlValue>),
    /// Order-significant values; key names are ignored.
    Positional(Vec<SqlValue>),
    /// A tagged record resolved by field name.
    Record(&'p dyn ParamRecord),
}

impl Default for Params<'_> {
    fn default() -> Self {
        Params::Empty
    }
}

impl std::fmt::Debug for Params<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Params::Empty => f.write_str("Params::Empty"),
            Params::Named(m) => write!(f, "Params::Named({} keys)", m.len()),
            Params::Positional(v) => write!(f, "Params::Positional({} values)", v.len()),
            Params::Record(_) => f.write_str("Params::Record"),
        }
    }
}

impl<'p> Params<'p> {
    pub fn record(record: &'p dyn ParamRecord) -> Self {
        Params::Record(record)
    }

    pub fn positional<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToSqlValue,
    {
        Params::Positional(values.into_iter().map(|v| v.to_sql()).collect())
    }

    /// Produce the positional argument list for `keys`.
    ///
    /// Empty `keys` resolves to an empty list for any bag. Named and record
    /// bags fail fast on the first missing key; positional bags use `keys`
    /// only for its length and fail when too short.
    pub fn resolve(&self, keys: &[String]) -> Result<Vec<SqlValue>, Error> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        match self {
            Params::Empty => Err(Error::MissingParam(keys[0].clone())),
            Params::Named(map) => keys
                .iter()
                .map(|k| {
                    map.get(k)
                        .cloned()
                        .ok_or_else(|| Error::MissingParam(k.clone()))
                })
                .collect(),
            Params::Positional(values) => {
                if values.len() < keys.len() {
                    return Err(Error::ParamCount {
                        need: keys.len(),
                        have: values.len(),
                    });
                }
                Ok(values[..keys.len()].to_vec())
            }
            Params::Record(record) => keys
                .iter()
                .map(|k| {
                    record
                        .param(k)
                        .ok_or_else(|| Error::MissingParam(k.clone()))
                })
                .collect(),
        }
    }
}

impl From<HashMap<String, SqlValue>> for Params<'static> {
    fn from(map: HashMap<String, SqlValue>) -> Self {
        Params::Named(map)
    }
}

impl From<Vec<SqlValue>> for Params<'static> {
    fn from(values: Vec<SqlValue>) -> Self {
        Params::Positional(values)
    }
}

/// Build a [`Params::Named`] bag from `key: value` pairs.
///
/// ```
/// use sqlx_named::params;
///
/// let bag = params! { a: 45, b: 459 };
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::Empty
    };
    ($($key:ident : $value:expr),+ $(,)?) => {{
        let mut map = ::std::collections::HashMap::new();
        $(
            map.insert(
                stringify!($key).to_string(),
                $crate::ToSqlValue::to_sql(&$value),
            );
        )+
        $crate::Params::Named(map)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_keys_resolve_to_empty_args_for_any_bag() {
        assert!(Params::Empty.resolve(&[]).unwrap().is_empty());
        assert!(Params::Positional(vec![SqlValue::Int(1)])
            .resolve(&[])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn named_resolves_in_key_order_with_duplicates() {
        let bag = crate::params! { a: 45, b: 459 };
        let keys = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let args = bag.resolve(&keys).unwrap();
        assert_eq!(
            args,
            vec![SqlValue::Int(45), SqlValue::Int(459), SqlValue::Int(45)]
        );
    }

    #[test]
    fn missing_key_fails_without_partial_result() {
        let bag = crate::params! { a: 1 };
        let keys = vec!["a".to_string(), "b".to_string()];
        match bag.resolve(&keys) {
            Err(Error::MissingParam(name)) => assert_eq!(name, "b"),
            other => panic!("expected MissingParam, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn positional_uses_keys_for_length_only() {
        let bag = Params::positional([1i64, 2, 3]);
        let keys = vec!["x".to_string(), "y".to_string()];
        let args = bag.resolve(&keys).unwrap();
        assert_eq!(args, vec![SqlValue::Int(1), SqlValue::Int(2)]);
    }

    #[test]
    fn short_positional_bag_fails() {
        let bag = Params::positional([1i64]);
        let keys = vec!["x".to_string(), "y".to_string()];
        match bag.resolve(&keys) {
            Err(Error::ParamCount { need, have }) => {
                assert_eq!((need, have), (2, 1));
            }
            other => panic!("expected ParamCount, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn empty_bag_with_required_keys_fails() {
        let keys = vec!["a".to_string()];
        assert!(matches!(
            Params::Empty.resolve(&keys),
            Err(Error::MissingParam(_))
        ));
    }

    #[test]
    fn record_bag_resolves_by_field_name() {
        struct Point {
            x: i64,
            y: i64,
        }
        impl ParamRecord for Point {
            fn param(&self, key: &str) -> Option<SqlValue> {
                match key {
                    "x" => Some(SqlValue::Int(self.x)),
                    "y" => Some(SqlValue::Int(self.y)),
                    _ => None,
                }
            }
        }
        let p = Point { x: 3, y: 4 };
        let bag = Params::record(&p);
        let keys = vec!["y".to_string(), "x".to_string()];
        assert_eq!(
            bag.resolve(&keys).unwrap(),
            vec![SqlValue::Int(4), SqlValue::Int(3)]
        );
        assert!(matches!(
            bag.resolve(&["z".to_string()]),
            Err(Error::MissingParam(_))
        ));
    }
}
