//! [`Query`]s reading the market state without modifying it.

pub mod circle;
pub mod circles;
pub mod item;
pub mod report;
pub mod user;
pub mod users;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    Service,
};

/// Read-only operation of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] looking up a `W` by a `B` key as is stored in the [`Database`].
///
/// Most of the views are such plain lookups, so they're defined as aliases
/// of this type, like [`circle::ById`].
#[derive(Clone, Copy, Debug)]
pub struct Lookup<T>(T);

impl<W, B> Lookup<By<W, B>> {
    /// Creates a new [`Lookup`] of a `W` by the provided key.
    #[must_use]
    pub fn by(key: B) -> Self {
        Self(By::new(key))
    }
}

impl<Db, W, B> Query<Lookup<By<W, B>>> for Service<Db>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lookup(key): Lookup<By<W, B>>,
    ) -> Result<W, Self::Err> {
        let found = self.database().execute(Select(key)).await;
        found.map_err(tracerr::wrap!())
    }
}
