pub mod bind;
pub mod error;
pub mod params;
pub mod rows;
pub mod value;

#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
mod backend;
#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
pub mod db;
#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
pub mod executor;
#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
pub mod router;
#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
pub mod stmt;
#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
pub mod tx;

pub use sqlx_named_macros::{Joined, Params, Record};

pub use bind::{bind_params, Dialect};
pub use error::Error;
pub use params::{ParamRecord, Params};
pub use rows::{Joined, Record};
pub use value::{FromSqlValue, ScanTarget, SqlValue, ToSqlValue};

#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
pub use db::Db;
#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
pub use executor::{ExecResult, Executor};
#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
pub use router::Router;
#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
pub use stmt::Stmt;
#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
pub use tx::Tx;

#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
use futures::future::BoxFuture;

/// Run a function inside a transaction.
///
/// The transaction commits when the function returns `Ok` and rolls back when
/// it returns `Err`.
///
/// # Example
///
/// ```ignore
/// use sqlx_named::{params, transaction};
///
/// let total = transaction(&db, |tx| Box::pin(async move {
///     tx.execute("update accounts set total = total + ${n}", &params! { n: 1 }).await?;
///     Ok::<_, sqlx_named::Error>(())
/// })).await?;
/// ```
#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
pub async fn transaction<F, R, E>(db: &Db, f: F) -> Result<R, E>
where
    F: for<'t> FnOnce(&'t mut Tx) -> BoxFuture<'t, Result<R, E>>,
    E: From<Error>,
{
    let mut tx = db.begin().await.map_err(E::from)?;
    match f(&mut tx).await {
        Ok(result) => {
            tx.commit().await.map_err(E::from)?;
            Ok(result)
        }
        Err(e) => {
            tx.rollback().await.map_err(E::from)?;
            Err(e)
        }
    }
}

/// Run a function inside a savepoint on an already-open transaction.
///
/// The savepoint is released when the function returns `Ok`; on `Err` the
/// transaction rolls back to the savepoint and the outer transaction stays
/// usable.
#[cfg(any(feature = "postgres", feature = "mysql", feature = "sqlite"))]
pub async fn nested_transaction<F, R, E>(tx: &mut Tx, f: F) -> Result<R, E>
where
    F: for<'t> FnOnce(&'t mut Tx) -> BoxFuture<'t, Result<R, E>>,
    E: From<Error>,
{
    use uuid::Uuid;

    // Hyphens are not valid in identifiers, so use the simple form.
    let savepoint = format!("sp_{}", Uuid::new_v4().simple());

    tx.execute_raw(&format!("SAVEPOINT {}", savepoint))
        .await
        .map_err(E::from)?;

    match f(tx).await {
        Ok(result) => {
            tx.execute_raw(&format!("RELEASE SAVEPOINT {}", savepoint))
                .await
                .map_err(E::from)?;
            Ok(result)
        }
        Err(e) => {
            tx.execute_raw(&format!("ROLLBACK TO SAVEPOINT {}", savepoint))
                .await
                .map_err(E::from)?;
            Err(e)
        }
    }
}
