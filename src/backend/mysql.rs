// MySQL backend glue.

use sqlx::mysql::{MySql, MySqlPool, MySqlQueryResult, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column as _, Row as _, TypeInfo as _};

use crate::bind::Dialect;
use crate::error::Error;
use crate::executor::ExecResult;
use crate::value::SqlValue;

pub(crate) type Backend = MySql;
pub(crate) type Pool = MySqlPool;
pub(crate) type Row = MySqlRow;

pub(crate) const DIALECT: Dialect = Dialect::MySql;

type MySqlQuery<'q> = Query<'q, MySql, <MySql as sqlx::database::HasArguments<'q>>::Arguments>;

pub(crate) fn bind_args(mut query: MySqlQuery<'_>, args: Vec<SqlValue>) -> MySqlQuery<'_> {
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

pub(crate) fn exec_result(result: MySqlQueryResult) -> ExecResult {
    ExecResult {
        rows_affected: result.rows_affected(),
        last_insert_id: Some(result.last_insert_id() as i64),
    }
}

/// Read one column as a dynamic value, dispatching on the declared type.
pub(crate) fn decode_value(row: &Row, idx: usize) -> Result<SqlValue, Error> {
    let column = &row.columns()[idx];
    let type_name = column.type_info().name();
    let value = match type_name {
        "BOOLEAN" => row.try_get::<Option<bool>, _>(idx)?.map(SqlValue::Bool),
        "TINYINT" => row
            .try_get::<Option<i8>, _>(idx)?
            .map(|v| SqlValue::Int(i64::from(v))),
        "SMALLINT" => row
            .try_get::<Option<i16>, _>(idx)?
            .map(|v| SqlValue::Int(i64::from(v))),
        "INT" | "MEDIUMINT" => row
            .try_get::<Option<i32>, _>(idx)?
            .map(|v| SqlValue::Int(i64::from(v))),
        "BIGINT" => row.try_get::<Option<i64>, _>(idx)?.map(SqlValue::Int),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "INT UNSIGNED" | "MEDIUMINT UNSIGNED" => row
            .try_get::<Option<u32>, _>(idx)?
            .map(|v| SqlValue::Int(i64::from(v))),
        "BIGINT UNSIGNED" => row
            .try_get::<Option<u64>, _>(idx)?
            .map(|v| match i64::try_from(v) {
                Ok(v) => SqlValue::Int(v),
                Err(_) => SqlValue::Text(v.to_string()),
            }),
        "FLOAT" => row
            .try_get::<Option<f32>, _>(idx)?
            .map(|v| SqlValue::Float(f64::from(v))),
        "DOUBLE" => row.try_get::<Option<f64>, _>(idx)?.map(SqlValue::Float),
        "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" => {
            row.try_get::<Option<String>, _>(idx)?.map(SqlValue::Text)
        }
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            row.try_get::<Option<Vec<u8>>, _>(idx)?.map(SqlValue::Bytes)
        }
        #[cfg(feature = "json")]
        "JSON" => row
            .try_get::<Option<serde_json::Value>, _>(idx)?
            .map(|v| SqlValue::Text(v.to_string())),
        #[cfg(feature = "decimal")]
        "DECIMAL" => row
            .try_get::<Option<rust_decimal::Decimal>, _>(idx)?
            .map(|v| SqlValue::Text(v.to_string())),
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
        #[cfg(feature = "chrono")]
        "TIMESTAMP" => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx)?
            .map(|v| SqlValue::Text(v.format("%Y-%m-%d %H:%M:%S%.9f%:z").to_string())),
        "NULL" => None,
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
