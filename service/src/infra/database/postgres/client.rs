//! Postgres database client definitions.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Non-transactional Postgres database client.
///
/// Takes a [`connection::NonTx`] from the [`connection::Pool`] for every
/// single operation.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to take [`Connection`]s from.
    pool: connection::Pool,
}

impl NonTx {
    /// Creates a new [`NonTx`] client from the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self { pool }
    }

    /// Creates a new [`Tx`] client taking its [`Connection`] from the same
    /// [`connection::Pool`].
    #[must_use]
    pub fn begin(&self) -> Tx {
        Tx {
            pool: self.pool.clone(),
            tx: Arc::new(RwLock::new(None)),
        }
    }

    /// Takes a [`Connection`] from the [`connection::Pool`].
    pub(crate) async fn connection(
        &self,
    ) -> Result<connection::NonTx, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}


/// Transactional Postgres database client.
///
/// The transaction is started lazily on the first operation, so a [`Tx`]
/// client never used doesn't hold any [`Connection`]. Clones share the same
/// transaction.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to take the [`Connection`] from.
    pool: connection::Pool,

    /// Started [`connection::Tx`], if any.
    tx: Arc<RwLock<Option<connection::Tx>>>,
}

impl Tx {
    /// Returns the [`connection::Tx`] of this [`Tx`] client, starting it if
    /// needed.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        let guard = self.tx.read().await;
        let guard = if guard.is_none() {
            drop(guard);

            let mut guard = self.tx.write().await;
            if guard.is_none() {
                let conn = self
                    .pool
                    .get()
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)?;
                *guard = Some(
                    connection::Tx::begin(conn)
                        .await
                        .map_err(tracerr::wrap!())?,
                );
            }
            guard.downgrade()
        } else {
            guard
        };

        Ok(RwLockReadGuard::map(guard, |tx| {
            tx.as_ref()
                .expect("transaction cannot be taken while guard is alive")
        }))
    }

    /// Commits the transaction of this [`Tx`] client, if it was started.
    ///
    /// # Errors
    ///
    /// If failed to commit the transaction.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Some(tx) = self.tx.write().await.take() else {
            return Ok(());
        };
        tx.commit().await.map_err(tracerr::wrap!())
    }
}

/// Implements [`Connection`] for the provided client, running every statement
/// over its pooled [`Connection`].
macro_rules! delegate_connection {
    ($client:ty => $($method:ident -> $ok:ty),* $(,)?) => {
        impl Connection for $client {
            $(
                async fn $method<T>(
                    &self,
                    stmt: &T,
                    params: &[&(dyn ToSql + Sync)],
                ) -> Result<$ok, Traced<database::Error>>
                where
                    T: ToStatement + ?Sized,
                {
                    let conn =
                        self.connection().await.map_err(tracerr::wrap!())?;
                    conn.$method(stmt, params).await.map_err(tracerr::wrap!())
                }
            )*
        }
    };
}

delegate_connection!(NonTx =>
    query -> Vec<Row>,
    query_opt -> Option<Row>,
    exec -> u64,
);

delegate_connection!(Tx =>
    query -> Vec<Row>,
    query_opt -> Option<Row>,
    exec -> u64,
);
