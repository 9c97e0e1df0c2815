//! [`Command`] for removing a [`PurchaseRequest`] from an [`Item`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::{item::PurchaseRequest, User};
use crate::{
    domain::{item, user, Item},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for removing a [`PurchaseRequest`] from an [`Item`].
///
/// Removing an absent [`PurchaseRequest`] is not an error.
#[derive(Clone, Copy, Debug, From)]
pub struct RemoveBuyer {
    /// ID of the requested [`Item`].
    pub item_id: item::Id,

    /// ID of the [`User`] whose [`PurchaseRequest`] should be removed.
    pub user_id: user::Id,
}

impl<Db> Command<RemoveBuyer> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Item>, item::Id>>,
            Ok = Option<Item>,
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

    async fn execute(&self, cmd: RemoveBuyer) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RemoveBuyer { item_id, user_id } = cmd;

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

        let item = tx
            .execute(Select(By::<Option<Item>, _>::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ItemNotExists(item_id))
            .map_err(tracerr::wrap!())?;
        if item.request_of(user_id).is_none() {
            log::debug!(
                "`User(id: {user_id})` doesn't request `Item(id: {item_id})`, \
                 nothing to remove",
            );
            return Ok(item);
        }

        let item = item.without_request_of(user_id);
        tx.execute(Update(item.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(item)
    }
}

/// Error of [`RemoveBuyer`] [`Command`] execution.
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
        domain::{circle, item},
        fixture, query, Command as _, Query as _,
    };

    use super::{ExecutionError, RemoveBuyer};

    #[tokio::test]
    async fn removes_request() {
        let (me, other) = (fixture::user("me"), fixture::user("other"));
        let item = fixture::item(
            circle::Id::new(),
            "100",
            &[(other.id, 1, 2), (me.id, 1, 1)],
        );
        let svc = fixture::service(vec![], vec![item.clone()], vec![]).await;

        let updated = svc
            .execute(RemoveBuyer {
                item_id: item.id,
                user_id: me.id,
            })
            .await
            .unwrap();

        assert!(updated.request_of(me.id).is_none());
        assert_eq!(updated.requests, item.requests[..1].to_vec());
        let stored =
            svc.execute(query::item::ById::by(item.id)).await.unwrap();
        assert_eq!(stored, Some(updated.clone()));

        let again = svc
            .execute(RemoveBuyer {
                item_id: item.id,
                user_id: me.id,
            })
            .await
            .unwrap();
        assert_eq!(again, updated);
    }

    #[tokio::test]
    async fn fails_on_unknown_item() {
        let me = fixture::user("me");
        let svc = fixture::service(vec![], vec![], vec![]).await;

        let err = svc
            .execute(RemoveBuyer {
                item_id: item::Id::new(),
                user_id: me.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ItemNotExists(_)));
    }
}
