// The executor facade.
//
// `Executor` composes the rewriter, the resolver, and the row decoder behind
// one interface; `Db` and `Tx` implement it by supplying the three raw
// operations, everything else is provided. Prepared statements expose the
// same operation family with params-only signatures (see `Stmt`).

use std::collections::HashMap;

use futures::stream::BoxStream;

use crate::backend;
use crate::bind::{bind_params, Dialect};
use crate::error::Error;
use crate::params::Params;
use crate::rows::{self, Joined, Record};
use crate::value::{ScanTarget, SqlValue};

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Backend-dependent; `None` on PostgreSQL.
    pub last_insert_id: Option<i64>,
}

/// Uniform query surface over a direct connection and an active transaction.
///
/// All methods take a `${name}`-parameterized query and a [`Params`] bag.
/// Get-style methods decode the first row only and report `false`/`None` when
/// the result is empty; select-style methods decode every row, reusing
/// already-allocated elements of the destination vec before growing it.
#[allow(async_fn_in_trait)]
pub trait Executor: Send {
    fn dialect(&self) -> Dialect;

    /// Run an already-bound statement.
    async fn execute_bound(&mut self, sql: &str, args: Vec<SqlValue>) -> Result<ExecResult, Error>;

    /// Stream rows for an already-bound statement. The stream owns the cursor
    /// and releases it on drop.
    fn fetch<'e>(
        &'e mut self,
        sql: &'e str,
        args: Vec<SqlValue>,
    ) -> BoxStream<'e, Result<backend::Row, sqlx::Error>>;

    /// Rewrite `${name}` markers and resolve the bag into positional args.
    fn bind(&self, query: &str, params: &Params<'_>) -> Result<(String, Vec<SqlValue>), Error> {
        let (text, keys) = bind_params(self.dialect(), query)?;
        let args = params.resolve(&keys)?;
        tracing::debug!(sql = %text, args = args.len(), "bound query");
        Ok((text.into_owned(), args))
    }

    async fn execute(&mut self, query: &str, params: &Params<'_>) -> Result<ExecResult, Error> {
        let (sql, args) = self.bind(query, params)?;
        self.execute_bound(&sql, args).await
    }

    /// Decode the first row into a tagged record. `Ok(false)` means no rows.
    async fn get(
        &mut self,
        query: &str,
        params: &Params<'_>,
        dest: &mut dyn Record,
    ) -> Result<bool, Error> {
        let (sql, args) = self.bind(query, params)?;
        let mut rows = self.fetch(&sql, args);
        rows::get_record(&mut rows, dest).await
    }

    /// Decode the first row into a dynamic map. `Ok(None)` means no rows.
    async fn get_map(
        &mut self,
        query: &str,
        params: &Params<'_>,
    ) -> Result<Option<HashMap<String, SqlValue>>, Error> {
        let (sql, args) = self.bind(query, params)?;
        let mut rows = self.fetch(&sql, args);
        rows::get_map(&mut rows).await
    }

    /// Decode the first row positionally into an explicit target list.
    async fn get_direct(
        &mut self,
        query: &str,
        params: &Params<'_>,
        targets: &mut [&mut dyn ScanTarget],
    ) -> Result<bool, Error> {
        let (sql, args) = self.bind(query, params)?;
        let mut rows = self.fetch(&sql, args);
        rows::get_direct(&mut rows, targets).await
    }

    /// Decode the first row across the sub-records of a joined destination.
    async fn get_joined(
        &mut self,
        query: &str,
        params: &Params<'_>,
        dest: &mut dyn Joined,
    ) -> Result<bool, Error> {
        let (sql, args) = self.bind(query, params)?;
        let mut rows = self.fetch(&sql, args);
        rows::get_joined(&mut rows, dest).await
    }

    async fn select<T: Record + Default>(
        &mut self,
        query: &str,
        params: &Params<'_>,
        dest: &mut Vec<T>,
    ) -> Result<(), Error> {
        let (sql, args) = self.bind(query, params)?;
        let mut rows = self.fetch(&sql, args);
        rows::select_records(&mut rows, dest).await
    }

    async fn select_maps(
        &mut self,
        query: &str,
        params: &Params<'_>,
    ) -> Result<Vec<HashMap<String, SqlValue>>, Error> {
        let (sql, args) = self.bind(query, params)?;
        let mut rows = self.fetch(&sql, args);
        rows::select_maps(&mut rows).await
    }

    async fn select_joined<J: Joined + Default>(
        &mut self,
        query: &str,
        params: &Params<'_>,
        dest: &mut Vec<J>,
    ) -> Result<(), Error> {
        let (sql, args) = self.bind(query, params)?;
        let mut rows = self.fetch(&sql, args);
        rows::select_joined(&mut rows, dest).await
    }
}
