//! [`Query`] collection related to the multiple [`Circle`]s.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::Circle,
    infra::{database, Database},
    read::circle::Condition,
    Query, Service,
};

/// [`Query`] listing the catalog of non-deleted [`Circle`]s matching a
/// [`Condition`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct List {
    /// [`Condition`] the listed [`Circle`]s should match.
    pub condition: Condition,
}

impl Default for List {
    fn default() -> Self {
        Self {
            condition: Condition::all(),
        }
    }
}

impl<Db> Query<List> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Circle>, ()>>,
        Ok = Vec<Circle>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Circle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        List { condition }: List,
    ) -> Result<Self::Ok, Self::Err> {
        let mut circles = self
            .database()
            .execute(Select(By::<Vec<Circle>, ()>::all()))
            .await
            .map_err(tracerr::wrap!())?;
        circles.retain(|c| !c.deleted && condition.matches(c));
        Ok(circles)
    }
}
