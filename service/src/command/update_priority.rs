//! [`Command`] for updating the [`Priority`] of a [`PurchaseRequest`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{item::PurchaseRequest, User};
use crate::{
    domain::{
        item::{self, Priority},
        user, Item,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating the [`Priority`] of a [`PurchaseRequest`].
#[derive(Clone, Copy, Debug, From)]
pub struct UpdatePriority {
    /// ID of the requested [`Item`].
    pub item_id: item::Id,

    /// ID of the requesting [`User`].
    pub user_id: user::Id,

    /// New [`Priority`] of the [`PurchaseRequest`].
    pub priority: Priority,
}

impl<Db> Command<UpdatePriority> for Service<Db>
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

    async fn execute(
        &self,
        cmd: UpdatePriority,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdatePriority {
            item_id,
            user_id,
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

        let item = tx
            .execute(Select(By::<Option<Item>, _>::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ItemNotExists(item_id))
            .map_err(tracerr::wrap!())?;

        let item = item
            .with_priority(user_id, priority)
            .ok_or(E::BuyerNotExists { item_id, user_id })
            .map_err(tracerr::wrap!())?;
        tx.execute(Update(item.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(item)
    }
}

/// Error of [`UpdatePriority`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Item`] doesn't exist.
    #[display("`Item(id: {_0})` does not exist")]
    #[from(ignore)]
    ItemNotExists(#[error(not(source))] item::Id),

    /// [`User`] has no [`PurchaseRequest`] for the [`Item`].
    #[display("`User(id: {user_id})` doesn't request `Item(id: {item_id})`")]
    #[from(ignore)]
    BuyerNotExists {
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
            item::{self, Priority},
        },
        fixture, query, Command as _, Query as _,
    };

    use super::{ExecutionError, UpdatePriority};

    #[tokio::test]
    async fn updates_priority_of_request() {
        let (me, other) = (fixture::user("me"), fixture::user("other"));
        let item = fixture::item(
            circle::Id::new(),
            "100",
            &[(me.id, 1, 5), (other.id, 1, 3)],
        );
        let svc = fixture::service(vec![], vec![item.clone()], vec![]).await;

        let updated = svc
            .execute(UpdatePriority {
                item_id: item.id,
                user_id: me.id,
                priority: Priority::from(1),
            })
            .await
            .unwrap();

        assert_eq!(
            updated.request_of(me.id).map(|r| r.priority),
            Some(Priority::from(1)),
        );
        assert_eq!(
            updated.request_of(other.id).map(|r| r.priority),
            Some(Priority::from(3)),
        );
        let stored =
            svc.execute(query::item::ById::by(item.id)).await.unwrap();
        assert_eq!(stored, Some(updated));
    }

    #[tokio::test]
    async fn fails_on_absent_request() {
        let me = fixture::user("me");
        let item = fixture::item(circle::Id::new(), "100", &[]);
        let svc = fixture::service(vec![], vec![item.clone()], vec![]).await;

        let err = svc
            .execute(UpdatePriority {
                item_id: item.id,
                user_id: me.id,
                priority: Priority::from(1),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::BuyerNotExists { user_id, .. } if *user_id == me.id,
        ));

        let err = svc
            .execute(UpdatePriority {
                item_id: item::Id::new(),
                user_id: me.id,
                priority: Priority::from(1),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::ItemNotExists(_)));
    }
}
