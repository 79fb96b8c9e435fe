// PostgreSQL backend glue.

use sqlx::postgres::{PgPool, PgQueryResult, PgRow, Postgres};
use sqlx::query::Query;
use sqlx::{Column as _, Row as _, TypeInfo as _};

use crate::bind::Dialect;
use crate::error::Error;
use crate::executor::ExecResult;
use crate::value::SqlValue;

pub(crate) type Backend = Postgres;
pub(crate) type Pool = PgPool;
pub(crate) type Row = PgRow;

pub(crate) const DIALECT: Dialect = Dialect::Postgres;

type PgQuery<'q> = Query<'q, Postgres, <Postgres as sqlx::database::HasArguments<'q>>::Arguments>;

pub(crate) fn bind_args(mut query: PgQuery<'_>, args: Vec<SqlValue>) -> PgQuery<'_> {
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

pub(crate) fn exec_result(result: PgQueryResult) -> ExecResult {
    ExecResult {
        rows_affected: result.rows_affected(),
        // postgres has no insert id outside RETURNING
        last_insert_id: None,
    }
}

/// Read one column as a dynamic value, dispatching on the declared type.
pub(crate) fn decode_value(row: &Row, idx: usize) -> Result<SqlValue, Error> {
    let column = &row.columns()[idx];
    let type_name = column.type_info().name();
    let value = match type_name {
        "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(SqlValue::Bool),
        "INT2" => row
            .try_get::<Option<i16>, _>(idx)?
            .map(|v| SqlValue::Int(i64::from(v))),
        "INT4" => row
            .try_get::<Option<i32>, _>(idx)?
            .map(|v| SqlValue::Int(i64::from(v))),
        "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(SqlValue::Int),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(idx)?
            .map(|v| SqlValue::Float(f64::from(v))),
        "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(SqlValue::Float),
        "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => {
            row.try_get::<Option<String>, _>(idx)?.map(SqlValue::Text)
        }
        "BYTEA" => row.try_get::<Option<Vec<u8>>, _>(idx)?.map(SqlValue::Bytes),
        #[cfg(feature = "uuid")]
        "UUID" => row
            .try_get::<Option<uuid::Uuid>, _>(idx)?
            .map(|v| SqlValue::Text(v.to_string())),
        #[cfg(feature = "json")]
        "JSON" | "JSONB" => row
            .try_get::<Option<serde_json::Value>, _>(idx)?
            .map(|v| SqlValue::Text(v.to_string())),
        #[cfg(feature = "decimal")]
        "NUMERIC" => row
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
        "TIMESTAMP" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(idx)?
            .map(|v| SqlValue::Text(v.format("%Y-%m-%d %H:%M:%S%.9f").to_string())),
        #[cfg(feature = "chrono")]
        "TIMESTAMPTZ" => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx)?
            .map(|v| SqlValue::Text(v.format("%Y-%m-%d %H:%M:%S%.9f%:z").to_string())),
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
