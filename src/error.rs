use thiserror::Error;

/// Errors surfaced by binding, resolution, and row decoding.
///
/// Driver errors pass through verbatim in the `Driver` variant; nothing in
/// this crate retries or reinterprets them.
#[derive(Debug, Error)]
pub enum Error {
    /// The dialect has no placeholder convention. Raised at rewrite time.
    #[error("sqlx_named: unsupported dialect")]
    UnsupportedDialect,

    /// A named bag is missing a key the query requires.
    #[error("sqlx_named: missing parameter `{0}`")]
    MissingParam(String),

    /// A positional bag is shorter than the placeholder count.
    #[error("sqlx_named: not enough positional parameters: need {need}, have {have}")]
    ParamCount { need: usize, have: usize },

    /// A result column has no matching field on the destination record.
    #[error("sqlx_named: no field for column `{0}`")]
    ColumnNotFound(String),

    /// Direct decode received a target list whose length does not match the
    /// column count.
    #[error("sqlx_named: column count mismatch: {columns} columns, {targets} targets")]
    TargetCount { columns: usize, targets: usize },

    /// Joined decode ran out of sub-records with columns still unclaimed.
    #[error("sqlx_named: joined destinations exhausted at column `{0}`")]
    JoinExhausted(String),

    /// A column value could not be read into a dynamic value.
    #[error("sqlx_named: cannot decode column `{column}`: {message}")]
    Decode { column: String, message: String },

    /// A dynamic value could not be converted into the requested field type.
    #[error("sqlx_named: cannot convert {from} into {into}")]
    Convert {
        from: &'static str,
        into: &'static str,
    },

    #[error(transparent)]
    Driver(#[from] sqlx::Error),
}
