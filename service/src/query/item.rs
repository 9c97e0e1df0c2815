//! [`Query`] collection related to a single [`Item`].

use std::collections::HashMap;

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{circle, item, item::PurchaseRequest, user, Circle, Item, User},
    infra::{database, Database},
    read::item::Owner,
    Query, Service,
};

use super::Lookup;

/// Queries an [`Item`] by its [`item::Id`].
pub type ById = Lookup<By<Option<Item>, item::Id>>;

/// [`Query`] assembling the detailed view of an [`Item`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Detail {
    /// ID of the [`Item`] to be viewed.
    pub item_id: item::Id,
}

/// Output of the [`Detail`] [`Query`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// Viewed [`Item`].
    pub item: Item,

    /// [`Owner`] of the [`Item`].
    pub owner: Owner,

    /// [`Buyer`]s of the [`Item`] in the order of their requests.
    pub buyers: Vec<Buyer>,
}

/// [`PurchaseRequest`] joined with its [`User`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Buyer {
    /// [`PurchaseRequest`] of the [`User`].
    pub request: PurchaseRequest,

    /// Requesting [`User`], if it's known.
    pub user: Option<User>,
}

impl<Db> Query<Detail> for Service<Db>
where
    Db: Database<
            Select<By<Option<Item>, item::Id>>,
            Ok = Option<Item>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Circle>, circle::Id>>,
            Ok = Option<Circle>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HashMap<user::Id, User>, Vec<user::Id>>>,
            Ok = HashMap<user::Id, User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        Detail { item_id }: Detail,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let item = self
            .database()
            .execute(Select(By::<Option<Item>, _>::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ItemNotExists(item_id))
            .map_err(tracerr::wrap!())?;

        let circle = self
            .database()
            .execute(Select(By::<Option<Circle>, _>::new(item.circle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let user_ids =
            item.requests.iter().map(|r| r.user_id).collect::<Vec<_>>();
        let users = self
            .database()
            .execute(Select(By::<HashMap<_, User>, _>::new(user_ids)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let buyers = item
            .requests
            .iter()
            .map(|r| Buyer {
                request: *r,
                user: users.get(&r.user_id).cloned(),
            })
            .collect();

        Ok(Output {
            owner: Owner::from_found(circle.as_ref()),
            item,
            buyers,
        })
    }
}

/// Error of [`Detail`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Item`] doesn't exist.
    #[display("`Item(id: {_0})` does not exist")]
    #[from(ignore)]
    ItemNotExists(#[error(not(source))] item::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{
            circle::{self, Day, Wing},
            item,
        },
        fixture,
        read::item::Owner,
        Query as _,
    };

    use super::{Detail, ExecutionError};

    #[tokio::test]
    async fn joins_buyers_with_users() {
        let circle = fixture::circle("ABC", Day::First, Wing::West, "a01");
        let (alice, bob) = (fixture::user("alice"), fixture::user("bob"));
        let unknown = fixture::user("unknown");
        let item = fixture::item(
            circle.id,
            "1000",
            &[(bob.id, 1, 2), (unknown.id, 1, 1), (alice.id, 3, 1)],
        );
        let svc = fixture::service(
            vec![circle.clone()],
            vec![item.clone()],
            vec![alice.clone(), bob.clone()],
        )
        .await;

        let out = svc.execute(Detail { item_id: item.id }).await.unwrap();

        assert_eq!(out.item, item);
        assert_eq!(out.owner, Owner::Active(circle));
        assert_eq!(
            out.buyers
                .iter()
                .map(|b| (b.request.user_id, b.user.clone()))
                .collect::<Vec<_>>(),
            vec![
                (bob.id, Some(bob)),
                (unknown.id, None),
                (alice.id, Some(alice)),
            ],
        );
    }

    #[tokio::test]
    async fn reports_missing_circle() {
        let item = fixture::item(circle::Id::new(), "100", &[]);
        let svc = fixture::service(vec![], vec![item.clone()], vec![]).await;

        let out = svc.execute(Detail { item_id: item.id }).await.unwrap();

        assert_eq!(out.owner, Owner::Missing);
        assert!(out.buyers.is_empty());
    }

    #[tokio::test]
    async fn fails_on_unknown_item() {
        let svc = fixture::service(vec![], vec![], vec![]).await;
        let id = item::Id::new();

        let err = svc.execute(Detail { item_id: id }).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ItemNotExists(i) if *i == id,
        ));
    }
}
