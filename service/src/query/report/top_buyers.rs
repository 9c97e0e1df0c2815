//! [`TopBuyers`] definition.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{Circle, Item},
    infra::{database, Database},
    read::report::{self, TopBuyer},
    Query, Service,
};

/// [`Query`] resolving the [`TopBuyer`] of every requested [`Item`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TopBuyers;

impl<Db> Query<TopBuyers> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Circle>, ()>>,
            Ok = Vec<Circle>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Item>, ()>>,
            Ok = Vec<Item>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<TopBuyer>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: TopBuyers) -> Result<Self::Ok, Self::Err> {
        let circles = self
            .database()
            .execute(Select(By::<Vec<Circle>, ()>::all()))
            .await
            .map_err(tracerr::wrap!())?;
        let items = self
            .database()
            .execute(Select(By::<Vec<Item>, ()>::all()))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(report::top_buyers(&circles, &items))
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::circle::{Day, Wing},
        fixture, Query as _,
    };

    use super::TopBuyers;

    #[tokio::test]
    async fn resolves_top_buyers_of_stored_items() {
        let (u1, u2) = (fixture::user("u1"), fixture::user("u2"));
        let c1 = fixture::circle("C1", Day::First, Wing::West, "p1");
        let i1 = fixture::item(c1.id, "100", &[(u1.id, 2, 3), (u2.id, 1, 1)]);
        let i2 = fixture::item(c1.id, "100", &[]);
        let svc =
            fixture::service(vec![c1], vec![i1.clone(), i2], vec![]).await;

        let rows = svc.execute(TopBuyers).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item_id, i1.id);
        assert_eq!(rows[0].user_id, u2.id);
    }
}
