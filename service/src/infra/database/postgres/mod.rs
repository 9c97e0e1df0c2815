//! [`Database`] storing the circles, items and purchase requests in
//! Postgres.

pub mod client;
pub mod connection;
mod impls;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::NoTls;
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use refinery::embed_migrations;

pub use self::{
    client::{NonTx, Tx},
    connection::Connection,
};

pub use deadpool_postgres::{Config, PoolConfig};

/// Postgres [`Database`] client, either a pooled [`NonTx`] one or a [`Tx`]
/// one of a started transaction.
#[derive(Clone, Debug, Deref)]
pub struct Postgres<T = NonTx>(T);

impl Postgres {
    /// Creates a new [`Postgres`] client with a [`connection::Pool`]
    /// configured by the provided [`Config`].
    ///
    /// No connection is opened until the first statement.
    ///
    /// # Errors
    ///
    /// If the [`Config`] describes no valid [`connection::Pool`].
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let pool = conf
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self(NonTx::from_pool(pool)))
    }
}

/// Failure of a [`Postgres`] operation.
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// Statement failed to run over a [`Connection`].
    #[display("`Connection` error: {_0}")]
    Connection(connection::Error),

    /// [`connection::Pool`] misconfigured.
    #[display("Failed to create a new `connection::Pool`: {_0}")]
    PoolCreationError(connection::PoolCreationError),

    /// No [`Connection`] taken from the [`connection::Pool`].
    #[display("`connection::Pool` error: {_0}")]
    PoolError(connection::PoolError),
}
