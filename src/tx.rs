// Transaction executor.
//
// A `Tx` runs every statement on the transaction's dedicated connection.
// Dropping it without `commit` rolls back, per the driver's contract.

use futures::stream::BoxStream;

use crate::backend;
use crate::bind::Dialect;
use crate::error::Error;
use crate::executor::{ExecResult, Executor};
use crate::value::SqlValue;

pub struct Tx {
    inner: sqlx::Transaction<'static, backend::Backend>,
}

impl Tx {
    pub(crate) fn new(inner: sqlx::Transaction<'static, backend::Backend>) -> Self {
        Self { inner }
    }

    pub async fn commit(self) -> Result<(), Error> {
        self.inner.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), Error> {
        self.inner.rollback().await?;
        Ok(())
    }

    // Run a statement verbatim, without placeholder rewriting. Used for
    // savepoint bookkeeping.
    pub(crate) async fn execute_raw(&mut self, sql: &str) -> Result<(), Error> {
        sqlx::query(sql).execute(&mut *self.inner).await?;
        Ok(())
    }
}

impl Executor for Tx {
    fn dialect(&self) -> Dialect {
        backend::DIALECT
    }

    async fn execute_bound(&mut self, sql: &str, args: Vec<SqlValue>) -> Result<ExecResult, Error> {
        let result = backend::bind_args(sqlx::query(sql), args)
            .execute(&mut *self.inner)
            .await?;
        Ok(backend::exec_result(result))
    }

    fn fetch<'e>(
        &'e mut self,
        sql: &'e str,
        args: Vec<SqlValue>,
    ) -> BoxStream<'e, Result<backend::Row, sqlx::Error>> {
        backend::bind_args(sqlx::query(sql), args).fetch(&mut *self.inner)
    }
}
