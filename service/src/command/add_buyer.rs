//! [`Command`] for adding a [`PurchaseRequest`] to an [`Item`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        item::{self, Count, Priority, PurchaseRequest},
        user, Item, User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for adding a [`PurchaseRequest`] to an [`Item`].
///
/// A [`User`] may have at most one [`PurchaseRequest`] per [`Item`].
#[derive(Clone, Copy, Debug)]
pub struct AddBuyer {
    /// ID of the requested [`Item`].
    pub item_id: item::Id,

    /// ID of the requesting [`User`].
    pub user_id: user::Id,

    /// [`Count`] of requested units.
    pub count: Count,

    /// [`Priority`] of the new [`PurchaseRequest`].
    pub priority: Priority,
}

impl<Db> Command<AddBuyer> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Item>, item::Id>>,
            Ok = Option<Item>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Item, item::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Item>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Item;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AddBuyer) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddBuyer {
            item_id,
            user_id,
            count,
            priority,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Item`.
        tx.execute(Lock(By::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        drop(
            tx.execute(Select(By::<Option<User>, _>::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        );

        let item = tx
            .execute(Select(By::<Option<Item>, _>::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ItemNotExists(item_id))
            .map_err(tracerr::wrap!())?;

        let Some(item) = item.with_request(PurchaseRequest {
            user_id,
            count,
            priority,
        }) else {
            log::debug!(
                "`User(id: {user_id})` already requests `Item(id: {item_id})`",
            );
            return Err(tracerr::new!(E::BuyerAlreadyExists {
                item_id,
                user_id,
            }));
        };
        tx.execute(Update(item.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(item)
    }
}

/// Error of [`AddBuyer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Item`] doesn't exist.
    #[display("`Item(id: {_0})` does not exist")]
    #[from(ignore)]
    ItemNotExists(#[error(not(source))] item::Id),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`User`] already has a [`PurchaseRequest`] for the [`Item`].
    #[display("`User(id: {user_id})` already requests `Item(id: {item_id})`")]
    #[from(ignore)]
    BuyerAlreadyExists {
        /// ID of the [`Item`].
        item_id: item::Id,

        /// ID of the [`User`].
        user_id: user::Id,
    },
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{
            circle,
            item::{Count, Priority},
            user,
        },
        fixture, query, Command as _, Query as _,
    };

    use super::{AddBuyer, ExecutionError};

    #[tokio::test]
    async fn appends_request() {
        let (me, other) = (fixture::user("me"), fixture::user("other"));
        let item =
            fixture::item(circle::Id::new(), "100", &[(other.id, 1, 1)]);
        let svc = fixture::service(
            vec![],
            vec![item.clone()],
            vec![me.clone(), other],
        )
        .await;

        let updated = svc
            .execute(AddBuyer {
                item_id: item.id,
                user_id: me.id,
                count: Count::new(2).unwrap(),
                priority: Priority::from(4),
            })
            .await
            .unwrap();

        assert_eq!(updated.requests.len(), 2);
        assert_eq!(updated.requests[1].user_id, me.id);
        assert_eq!(updated.requests[1].count, Count::new(2).unwrap());
        let stored =
            svc.execute(query::item::ById::by(item.id)).await.unwrap();
        assert_eq!(stored, Some(updated));
    }

    #[tokio::test]
    async fn rejects_duplicated_request() {
        let me = fixture::user("me");
        let item = fixture::item(circle::Id::new(), "100", &[(me.id, 1, 1)]);
        let svc =
            fixture::service(vec![], vec![item.clone()], vec![me.clone()])
                .await;

        let err = svc
            .execute(AddBuyer {
                item_id: item.id,
                user_id: me.id,
                count: Count::new(1).unwrap(),
                priority: Priority::from(2),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::BuyerAlreadyExists { .. },
        ));
        let stored =
            svc.execute(query::item::ById::by(item.id)).await.unwrap();
        assert_eq!(stored, Some(item));
    }

    #[tokio::test]
    async fn rejects_unknown_user() {
        let item = fixture::item(circle::Id::new(), "100", &[]);
        let svc = fixture::service(vec![], vec![item.clone()], vec![]).await;

        let err = svc
            .execute(AddBuyer {
                item_id: item.id,
                user_id: user::Id::new(),
                count: Count::new(1).unwrap(),
                priority: Priority::from(1),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UserNotExists(_)));
    }

    #[tokio::test]
    async fn keeps_concurrent_requests() {
        let (me, other) = (fixture::user("me"), fixture::user("other"));
        let item = fixture::item(circle::Id::new(), "100", &[]);
        let svc = fixture::service(
            vec![],
            vec![item.clone()],
            vec![me.clone(), other.clone()],
        )
        .await;
        let add = |user_id| AddBuyer {
            item_id: item.id,
            user_id,
            count: Count::new(1).unwrap(),
            priority: Priority::from(1),
        };

        let (mine, theirs) = tokio::join!(
            svc.execute(add(me.id)),
            svc.execute(add(other.id)),
        );
        drop((mine.unwrap(), theirs.unwrap()));

        let stored = svc
            .execute(query::item::ById::by(item.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.requests.len(), 2);
        assert!(stored.request_of(me.id).is_some());
        assert!(stored.request_of(other.id).is_some());
    }
}
