// Backend selection.
//
// Exactly one driver is active at a time; when several features are enabled
// the precedence is postgres, then mysql, then sqlite, matching the cargo
// feature defaults. Each backend exposes the same surface: type aliases for
// the pool/row types, the dialect constant, argument binding, execute-result
// extraction, and dynamic column decoding.

#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "postgres")]
pub(crate) use postgres::*;

#[cfg(all(feature = "mysql", not(feature = "postgres")))]
mod mysql;
#[cfg(all(feature = "mysql", not(feature = "postgres")))]
pub(crate) use mysql::*;

#[cfg(all(feature = "sqlite", not(feature = "postgres"), not(feature = "mysql")))]
mod sqlite;
#[cfg(all(feature = "sqlite", not(feature = "postgres"), not(feature = "mysql")))]
pub(crate) use sqlite::*;
