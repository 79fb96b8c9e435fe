// Direct-connection executor over a connection pool.

use futures::stream::BoxStream;

use crate::backend;
use crate::bind::Dialect;
use crate::error::Error;
use crate::executor::{ExecResult, Executor};
use crate::stmt::Stmt;
use crate::tx::Tx;
use crate::value::SqlValue;

/// A database handle: a cheaply cloneable wrapper over the driver pool.
#[derive(Clone)]
pub struct Db {
    pool: backend::Pool,
}

impl Db {
    pub async fn connect(url: &str) -> Result<Self, Error> {
        Ok(Self {
            pool: backend::Pool::connect(url).await?,
        })
    }

    /// Wrap an already-configured pool.
    pub fn from_pool(pool: backend::Pool) -> Self {
        Self { pool }
    }

    /// The underlying driver pool.
    pub fn pool(&self) -> &backend::Pool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<Tx, Error> {
        Ok(Tx::new(self.pool.begin().await?))
    }

    /// Rewrite the query once and capture its key list for repeated runs.
    pub fn prepare(&self, query: &str) -> Result<Stmt, Error> {
        let (sql, keys) = crate::bind::bind_params(self.dialect(), query)?;
        tracing::debug!(sql = %sql, keys = keys.len(), "prepared statement");
        Ok(Stmt::new(self.clone(), sql.into_owned(), keys))
    }
}

impl Executor for Db {
    fn dialect(&self) -> Dialect {
        backend::DIALECT
    }

    async fn execute_bound(&mut self, sql: &str, args: Vec<SqlValue>) -> Result<ExecResult, Error> {
        let result = backend::bind_args(sqlx::query(sql), args)
            .execute(&self.pool)
            .await?;
        Ok(backend::exec_result(result))
    }

    fn fetch<'e>(
        &'e mut self,
        sql: &'e str,
        args: Vec<SqlValue>,
    ) -> BoxStream<'e, Result<backend::Row, sqlx::Error>> {
        backend::bind_args(sqlx::query(sql), args).fetch(&self.pool)
    }
}
