// Prepared statements.
//
// A `Stmt` captures the rewritten SQL and the ordered key list once at
// prepare time; every run only resolves a params bag against the stored
// keys. Server-side statement reuse is the driver's concern (the pool caches
// prepared statements by SQL text).

use std::collections::HashMap;

use crate::error::Error;
use crate::executor::{ExecResult, Executor};
use crate::params::Params;
use crate::rows::{self, Joined, Record};
use crate::value::{ScanTarget, SqlValue};
use crate::Db;

pub struct Stmt {
    db: Db,
    sql: String,
    keys: Vec<String>,
}

impl Stmt {
    pub(crate) fn new(db: Db, sql: String, keys: Vec<String>) -> Self {
        Self { db, sql, keys }
    }

    /// The rewritten SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameter names in placeholder order, duplicates included.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    fn resolve(&self, params: &Params<'_>) -> Result<Vec<SqlValue>, Error> {
        params.resolve(&self.keys)
    }

    pub async fn execute(&mut self, params: &Params<'_>) -> Result<ExecResult, Error> {
        let args = self.resolve(params)?;
        self.db.execute_bound(&self.sql, args).await
    }

    pub async fn get(&mut self, params: &Params<'_>, dest: &mut dyn Record) -> Result<bool, Error> {
        let args = self.resolve(params)?;
        let mut rows = self.db.fetch(&self.sql, args);
        rows::get_record(&mut rows, dest).await
    }

    pub async fn get_map(
        &mut self,
        params: &Params<'_>,
    ) -> Result<Option<HashMap<String, SqlValue>>, Error> {
        let args = self.resolve(params)?;
        let mut rows = self.db.fetch(&self.sql, args);
        rows::get_map(&mut rows).await
    }

    pub async fn get_direct(
        &mut self,
        params: &Params<'_>,
        targets: &mut [&mut dyn ScanTarget],
    ) -> Result<bool, Error> {
        let args = self.resolve(params)?;
        let mut rows = self.db.fetch(&self.sql, args);
        rows::get_direct(&mut rows, targets).await
    }

    pub async fn get_joined(
        &mut self,
        params: &Params<'_>,
        dest: &mut dyn Joined,
    ) -> Result<bool, Error> {
        let args = self.resolve(params)?;
        let mut rows = self.db.fetch(&self.sql, args);
        rows::get_joined(&mut rows, dest).await
    }

    pub async fn select<T: Record + Default>(
        &mut self,
        params: &Params<'_>,
        dest: &mut Vec<T>,
    ) -> Result<(), Error> {
        let args = self.resolve(params)?;
        let mut rows = self.db.fetch(&self.sql, args);
        rows::select_records(&mut rows, dest).await
    }

    pub async fn select_maps(
        &mut self,
        params: &Params<'_>,
    ) -> Result<Vec<HashMap<String, SqlValue>>, Error> {
        let args = self.resolve(params)?;
        let mut rows = self.db.fetch(&self.sql, args);
        rows::select_maps(&mut rows).await
    }

    pub async fn select_joined<J: Joined + Default>(
        &mut self,
        params: &Params<'_>,
        dest: &mut Vec<J>,
    ) -> Result<(), Error> {
        let args = self.resolve(params)?;
        let mut rows = self.db.fetch(&self.sql, args);
        rows::select_joined(&mut rows, dest).await
    }
}
