// The row-decoding engine.
//
// The core works on a column-name list plus a value-at-index source, so it is
// independent of any live database. The `live` half feeds it from backend
// rows pulled off a result stream and carries the get/select bulk variants.

use std::collections::HashMap;

use crate::error::Error;
use crate::value::{ScanTarget, SqlValue};

/// A struct decodable from one result row.
///
/// Derive with `#[derive(Record)]`; `#[row(rename = "...")]` overrides the
/// column name, `#[row(skip)]` excludes a field. Every result column must
/// match a field; an unmatched column is a hard error.
pub trait Record {
    /// Expected column names, in field declaration order.
    fn columns(&self) -> &'static [&'static str];
    /// Store one decoded column value into the matching field.
    fn put(&mut self, column: &str, value: SqlValue) -> Result<(), Error>;
}

impl<T: Record> Record for Box<T> {
    fn columns(&self) -> &'static [&'static str] {
        (**self).columns()
    }

    fn put(&mut self, column: &str, value: SqlValue) -> Result<(), Error> {
        (**self).put(column, value)
    }
}

/// A destination spanning several records decoded from a single row.
///
/// Derive with `#[derive(Joined)]` on a struct whose fields implement
/// [`Record`]. Column order in the result must be the concatenation of each
/// sub-record's expected column order (`SELECT a.*, b.*`); the decoder can
/// only verify this through column-name matching.
pub trait Joined {
    /// The sub-record with the given ordinal, or `None` past the last one.
    fn join_index(&mut self, idx: usize) -> Option<&mut dyn Record>;
}

impl<T: Joined> Joined for Box<T> {
    fn join_index(&mut self, idx: usize) -> Option<&mut dyn Record> {
        (**self).join_index(idx)
    }
}

/// Decode one row into a dynamic map. Duplicate column names overwrite, last
/// write wins.
pub fn decode_map(
    columns: &[String],
    mut value_at: impl FnMut(usize) -> Result<SqlValue, Error>,
    dest: &mut HashMap<String, SqlValue>,
) -> Result<(), Error> {
    for (idx, name) in columns.iter().enumerate() {
        let value = value_at(idx)?;
        dest.insert(name.clone(), value);
    }
    Ok(())
}

/// Decode one row into a tagged record by column name.
pub fn decode_record(
    columns: &[String],
    mut value_at: impl FnMut(usize) -> Result<SqlValue, Error>,
    dest: &mut dyn Record,
) -> Result<(), Error> {
    for (idx, name) in columns.iter().enumerate() {
        let value = value_at(idx)?;
        dest.put(name, value)?;
    }
    Ok(())
}

/// Decode one row positionally into an explicit target list. The column count
/// must equal the target count; no name matching happens here.
pub fn decode_direct(
    columns: usize,
    mut value_at: impl FnMut(usize) -> Result<SqlValue, Error>,
    targets: &mut [&mut dyn ScanTarget],
) -> Result<(), Error> {
    if columns != targets.len() {
        return Err(Error::TargetCount {
            columns,
            targets: targets.len(),
        });
    }
    for (idx, target) in targets.iter_mut().enumerate() {
        target.set(value_at(idx)?)?;
    }
    Ok(())
}

/// Decode one row across consecutive sub-records.
///
/// Columns are claimed left to right: the current sub-record consumes as many
/// columns as it has fields, then the next sub-record takes over. Running out
/// of sub-records with columns left is a hard error, as is a column the
/// current sub-record has no field for.
pub fn decode_joined(
    columns: &[String],
    mut value_at: impl FnMut(usize) -> Result<SqlValue, Error>,
    dest: &mut dyn Joined,
) -> Result<(), Error> {
    let mut idx = 0;
    let mut sub_idx = 0;
    while idx < columns.len() {
        let sub = dest
            .join_index(sub_idx)
            .ok_or_else(|| Error::JoinExhausted(columns[idx].clone()))?;
        sub_idx += 1;
        let want = sub.columns().len();
        let mut taken = 0;
        while taken < want && idx < columns.len() {
            let value = value_at(idx)?;
            sub.put(&columns[idx], value)?;
            idx += 1;
            taken += 1;
        }
    }
    Ok(())
}

#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
mod live {
    use super::*;
    use crate::backend;
    use futures::stream::BoxStream;
    use futures::TryStreamExt;
    use sqlx::{Column as _, Row as _};

    /// A live result stream; dropped on every exit path, which releases the
    /// underlying cursor.
    pub(crate) type RowStream<'e> = BoxStream<'e, Result<backend::Row, sqlx::Error>>;

    fn column_names(row: &backend::Row) -> Vec<String> {
        row.columns().iter().map(|c| c.name().to_string()).collect()
    }

    pub(crate) fn record_from_row(row: &backend::Row, dest: &mut dyn Record) -> Result<(), Error> {
        let names = column_names(row);
        decode_record(&names, |i| backend::decode_value(row, i), dest)
    }

    pub(crate) fn joined_from_row(row: &backend::Row, dest: &mut dyn Joined) -> Result<(), Error> {
        let names = column_names(row);
        decode_joined(&names, |i| backend::decode_value(row, i), dest)
    }

    pub(crate) fn map_from_row(
        row: &backend::Row,
        dest: &mut HashMap<String, SqlValue>,
    ) -> Result<(), Error> {
        let names = column_names(row);
        decode_map(&names, |i| backend::decode_value(row, i), dest)
    }

    // Get-style variants decode the first row only; no rows is Ok(false) /
    // Ok(None), never an error.

    pub(crate) async fn get_record(
        rows: &mut RowStream<'_>,
        dest: &mut dyn Record,
    ) -> Result<bool, Error> {
        match rows.try_next().await? {
            Some(row) => {
                record_from_row(&row, dest)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub(crate) async fn get_map(
        rows: &mut RowStream<'_>,
    ) -> Result<Option<HashMap<String, SqlValue>>, Error> {
        match rows.try_next().await? {
            Some(row) => {
                let mut map = HashMap::new();
                map_from_row(&row, &mut map)?;
                Ok(Some(map))
            }
            None => Ok(None),
        }
    }

    pub(crate) async fn get_direct(
        rows: &mut RowStream<'_>,
        targets: &mut [&mut dyn ScanTarget],
    ) -> Result<bool, Error> {
        match rows.try_next().await? {
            Some(row) => {
                let names = column_names(&row);
                decode_direct(names.len(), |i| backend::decode_value(&row, i), targets)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub(crate) async fn get_joined(
        rows: &mut RowStream<'_>,
        dest: &mut dyn Joined,
    ) -> Result<bool, Error> {
        match rows.try_next().await? {
            Some(row) => {
                joined_from_row(&row, dest)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // Select-style variants decode every row into a growable vec: existing
    // slots are overwritten in place, overflow rows get a fresh default, and
    // leftover slots are truncated at the end.

    pub(crate) async fn select_records<T: Record + Default>(
        rows: &mut RowStream<'_>,
        dest: &mut Vec<T>,
    ) -> Result<(), Error> {
        let mut seen = 0;
        while let Some(row) = rows.try_next().await? {
            if seen < dest.len() {
                record_from_row(&row, &mut dest[seen])?;
            } else {
                let mut item = T::default();
                record_from_row(&row, &mut item)?;
                dest.push(item);
            }
            seen += 1;
        }
        dest.truncate(seen);
        Ok(())
    }

    pub(crate) async fn select_maps(
        rows: &mut RowStream<'_>,
    ) -> Result<Vec<HashMap<String, SqlValue>>, Error> {
        let mut out = Vec::new();
        while let Some(row) = rows.try_next().await? {
            let mut map = HashMap::new();
            map_from_row(&row, &mut map)?;
            out.push(map);
        }
        Ok(out)
    }

    pub(crate) async fn select_joined<J: Joined + Default>(
        rows: &mut RowStream<'_>,
        dest: &mut Vec<J>,
    ) -> Result<(), Error> {
        let mut seen = 0;
        while let Some(row) = rows.try_next().await? {
            if seen < dest.len() {
                joined_from_row(&row, &mut dest[seen])?;
            } else {
                let mut item = J::default();
                joined_from_row(&row, &mut item)?;
                dest.push(item);
            }
            seen += 1;
        }
        dest.truncate(seen);
        Ok(())
    }
}

#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
pub(crate) use live::*;
