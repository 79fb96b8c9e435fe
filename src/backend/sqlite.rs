// SQLite backend glue.
//
// SQLite columns are dynamically typed; the declared type name is an
// affinity, so the integer/real/text fallbacks here are broader than on the
// other backends.

use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqlitePool, SqliteQueryResult, SqliteRow};
use sqlx::{Column as _, Row as _, TypeInfo as _};

use crate::bind::Dialect;
use crate::error::Error;
use crate::executor::ExecResult;
use crate::value::SqlValue;

pub(crate) type Backend = Sqlite;
pub(crate) type Pool = SqlitePool;
pub(crate) type Row = SqliteRow;

pub(crate) const DIALECT: Dialect = Dialect::Sqlite;

type SqliteQuery<'q> = Query<'q, Sqlite, <Sqlite as sqlx::database::HasArguments<'q>>::Arguments>;

pub(crate) fn bind_args(mut query: SqliteQuery<'_>, args: Vec<SqlValue>) -> SqliteQuery<'_> {
    for arg in args {
        query = match arg {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Float(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Bytes(v) => query.bind(v),
        };
    }
    query
}

pub(crate) fn exec_result(result: SqliteQueryResult) -> ExecResult {
    ExecResult {
        rows_affected: result.rows_affected(),
        last_insert_id: Some(result.last_insert_rowid()),
    }
}

/// Read one column as a dynamic value, dispatching on the declared type.
pub(crate) fn decode_value(row: &Row, idx: usize) -> Result<SqlValue, Error> {
    let column = &row.columns()[idx];
    let type_name = column.type_info().name();
    let value = match type_name {
        "NULL" => None,
        "BOOLEAN" => row.try_get::<Option<bool>, _>(idx)?.map(SqlValue::Bool),
        "INTEGER" | "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(SqlValue::Int),
        "REAL" | "NUMERIC" => row.try_get::<Option<f64>, _>(idx)?.map(SqlValue::Float),
        "TEXT" => row.try_get::<Option<String>, _>(idx)?.map(SqlValue::Text),
        "BLOB" => row.try_get::<Option<Vec<u8>>, _>(idx)?.map(SqlValue::Bytes),
        #[cfg(feature = "chrono")]
        "DATE" => row
            .try_get::<Option<chrono::NaiveDate>, _>(idx)?
            .map(|v| SqlValue::Text(v.format("%Y-%m-%d").to_string())),
        #[cfg(feature = "chrono")]
        "TIME" => row
            .try_get::<Option<chrono::NaiveTime>, _>(idx)?
            .map(|v| SqlValue::Text(v.format("%H:%M:%S%.9f").to_string())),
        #[cfg(feature = "chrono")]
        "DATETIME" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(idx)?
            .map(|v| SqlValue::Text(v.format("%Y-%m-%d %H:%M:%S%.9f").to_string())),
        other => {
            return row
                .try_get::<Option<String>, _>(idx)
                .map(|v| v.map(SqlValue::Text).unwrap_or(SqlValue::Null))
                .map_err(|e| Error::Decode {
                    column: column.name().to_string(),
                    message: format!("unsupported column type `{other}`: {e}"),
                })
        }
    };
    Ok(value.unwrap_or(SqlValue::Null))
}
