//! Pooled Postgres [`Connection`]s the SQL of the [`Database`] operations is
//! run over.
//!
//! [`Database`]: crate::infra::Database

use std::{fmt, future::Future};

use futures::{FutureExt as _, TryFutureExt as _};
use ouroboros::self_referencing;
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{self, postgres};

pub use deadpool_postgres::{
    Client as NonTx, CreatePoolError as PoolCreationError, Pool, PoolError,
};
pub use tokio_postgres::Error;

/// Transaction holding a pooled [`NonTx`] connection until it's committed.
///
/// Rows locked inside a [`Tx`], like the ones of the `items_lock` table, stay
/// locked for other transactions until [`Tx::commit()`]. Dropping a [`Tx`]
/// without committing rolls it back.
#[self_referencing]
pub struct Tx {
    /// Pooled [`NonTx`] connection running this [`Tx`].
    non_tx: NonTx,

    /// Started transaction, or [`None`] once it's committed.
    #[borrows(mut non_tx)]
    #[not_covariant]
    tx: Option<deadpool_postgres::Transaction<'this>>,
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tx")
            .field("tx", self.transaction())
            .finish_non_exhaustive()
    }
}

impl Tx {
    /// Begins a new [`Tx`] in the provided pooled [`NonTx`] connection.
    ///
    /// # Errors
    ///
    /// If the database refuses to begin a transaction.
    pub async fn begin(
        client: NonTx,
    ) -> Result<Self, Traced<database::Error>> {
        traced(
            Self::try_new_async_send(client, |c| {
                c.transaction().map_ok(Some).boxed()
            })
            .await,
        )
    }

    /// Commits this [`Tx`], releasing all the rows locked inside it.
    ///
    /// # Errors
    ///
    /// If the database fails to commit this [`Tx`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    pub async fn commit(mut self) -> Result<(), Traced<database::Error>> {
        #[expect(
            clippy::redundant_closure_for_method_calls,
            reason = "different variance, see \
                      https://doc.rust-lang.org/nomicon/subtyping.html#variance"
        )]
        let tx = self.with_tx_mut(|tx| tx.take()).expect("committed once");
        traced(tx.commit().await)
    }

    /// Returns the started transaction of this [`Tx`].
    fn transaction(&self) -> &deadpool_postgres::Transaction<'_> {
        self.with_tx(|tx| tx.as_ref().expect("committed by value"))
    }
}

/// Postgres connection, either inside a transaction or not.
pub trait Connection {
    /// Runs the provided statement returning all the read [`Row`]s.
    ///
    /// # Errors
    ///
    /// If the statement fails.
    fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Runs the provided statement returning at most one read [`Row`].
    ///
    /// # Errors
    ///
    /// If the statement fails or reads more than one [`Row`].
    fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Runs the provided statement returning the number of modified rows.
    ///
    /// # Errors
    ///
    /// If the statement fails.
    fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;
}

/// Wraps the failure of a [`Connection`] into a [`Traced`] [`database::Error`].
fn traced<T>(res: Result<T, Error>) -> Result<T, Traced<database::Error>> {
    res.map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
}

/// Implements [`Connection`] for the provided type running statements via
/// the `$client` expression.
macro_rules! impl_connection {
    ($ty:ty, |$conn:ident| $client:expr) => {
        impl Connection for $ty {
            async fn query<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Vec<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                let $conn = self;
                traced($client.query(stmt, params).await)
            }

            async fn query_opt<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Option<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                let $conn = self;
                traced($client.query_opt(stmt, params).await)
            }

            async fn exec<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<u64, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                let $conn = self;
                traced($client.execute(stmt, params).await)
            }
        }
    };
}

impl_connection!(NonTx, |conn| &**conn);
impl_connection!(Tx, |conn| conn.transaction());
