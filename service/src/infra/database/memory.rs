//! In-memory [`Database`] implementation.

use std::{collections::HashMap, sync::Arc};

use common::operations::{By, Commit, Insert, Lock, Select, Transact, Update};
use tokio::sync::{Mutex, OwnedRwLockWriteGuard, RwLock};
use tracerr::Traced;

use crate::{
    domain::{circle, item, user, Circle, Item, User},
    infra::{database, Database},
};

/// Stored records of a [`Memory`] database.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Snapshot {
    /// Stored [`Circle`]s in the order of their insertion.
    pub circles: Vec<Circle>,

    /// Stored [`Item`]s in the order of their insertion.
    pub items: Vec<Item>,

    /// Stored [`User`]s in the order of their insertion.
    pub users: Vec<User>,
}

/// In-memory [`Database`] client.
///
/// Clones share the same [`Snapshot`]. Records are replaced as a whole, so a
/// record once read is never changed afterwards.
///
/// A started [`Transact`]ion holds the [`Snapshot`] exclusively until it's
/// committed or dropped, and stages its changes in a private copy. Dropping
/// it without [`Commit`] discards the changes.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Shared [`Snapshot`] of this [`Memory`].
    store: Arc<RwLock<Snapshot>>,

    /// [`Staged`] changes of the started transaction, if any.
    ///
    /// Contains [`None`] once the transaction is committed.
    tx: Option<Arc<Mutex<Option<Staged>>>>,
}

/// Changes of a [`Memory`] transaction to be committed.
#[derive(Debug)]
struct Staged {
    /// Exclusive access to the shared [`Snapshot`].
    store: OwnedRwLockWriteGuard<Snapshot>,

    /// [`Snapshot`] with the changes applied.
    changes: Snapshot,
}

impl Memory {
    /// Creates a new [`Memory`] database populated with the provided
    /// [`Snapshot`].
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            store: Arc::new(RwLock::new(snapshot)),
            tx: None,
        }
    }

    /// Returns a copy of the currently stored [`Snapshot`].
    pub async fn snapshot(&self) -> Snapshot {
        self.read(Snapshot::clone).await
    }

    /// Applies the provided function to the [`Snapshot`] visible by this
    /// [`Memory`] client.
    async fn read<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> R {
        if let Some(tx) = &self.tx {
            if let Some(staged) = tx.lock().await.as_ref() {
                return f(&staged.changes);
            }
        }
        f(&*self.store.read().await)
    }

    /// Applies the provided modification to the [`Snapshot`] visible by this
    /// [`Memory`] client.
    async fn write<R>(&self, f: impl FnOnce(&mut Snapshot) -> R) -> R {
        if let Some(tx) = &self.tx {
            if let Some(staged) = tx.lock().await.as_mut() {
                return f(&mut staged.changes);
            }
        }
        f(&mut *self.store.write().await)
    }
}

/// Record identified by its ID.
trait Record: Clone {
    /// Type of the ID.
    type Id: Copy + Eq;

    /// Returns the ID of this [`Record`].
    fn id(&self) -> Self::Id;
}

impl Record for Circle {
    type Id = circle::Id;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Record for Item {
    type Id = item::Id;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Record for User {
    type Id = user::Id;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Replaces the stored [`Record`] having the same ID, or appends the provided
/// one otherwise.
fn upsert<R: Record>(records: &mut Vec<R>, record: R) {
    if let Some(r) = records.iter_mut().find(|r| r.id() == record.id()) {
        *r = record;
    } else {
        records.push(record);
    }
}

/// Returns the stored [`Record`] with the provided ID, if any.
fn find<R: Record>(records: &[R], id: R::Id) -> Option<R> {
    records.iter().find(|r| r.id() == id).cloned()
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let store = Arc::clone(&self.store).write_owned().await;
        let changes = store.clone();
        Ok(Self {
            store: Arc::clone(&self.store),
            tx: Some(Arc::new(Mutex::new(Some(Staged { store, changes })))),
        })
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        if let Some(tx) = &self.tx {
            if let Some(staged) = tx.lock().await.take() {
                let Staged { mut store, changes } = staged;
                *store = changes;
            }
        }
        Ok(())
    }
}

impl Database<Select<By<Vec<Circle>, ()>>> for Memory {
    type Ok = Vec<Circle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Circle>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.read(|s| s.circles.clone()).await)
    }
}

impl Database<Select<By<Option<Circle>, circle::Id>>> for Memory {
    type Ok = Option<Circle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Circle>, circle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.read(|s| find(&s.circles, by.into_inner())).await)
    }
}

impl Database<Insert<Circle>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(circle): Insert<Circle>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| upsert(&mut s.circles, circle)).await;
        Ok(())
    }
}

impl Database<Select<By<Vec<Item>, ()>>> for Memory {
    type Ok = Vec<Item>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Item>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.read(|s| s.items.clone()).await)
    }
}

impl Database<Select<By<Option<Item>, item::Id>>> for Memory {
    type Ok = Option<Item>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Item>, item::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.read(|s| find(&s.items, by.into_inner())).await)
    }
}

impl Database<Insert<Item>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(item): Insert<Item>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(item)).await
    }
}

impl Database<Update<Item>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(item): Update<Item>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| upsert(&mut s.items, item)).await;
        Ok(())
    }
}

/// Started transaction already holds the whole [`Snapshot`] exclusively.
impl Database<Lock<By<Item, item::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Item, item::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Vec<User>, ()>>> for Memory {
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<User>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.read(|s| s.users.clone()).await)
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.read(|s| find(&s.users, by.into_inner())).await)
    }
}

impl Database<Select<By<HashMap<user::Id, User>, Vec<user::Id>>>> for Memory {
    type Ok = HashMap<user::Id, User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<user::Id, User>, Vec<user::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        Ok(self
            .read(|s| {
                s.users
                    .iter()
                    .filter(|u| ids.contains(&u.id))
                    .map(|u| (u.id, u.clone()))
                    .collect()
            })
            .await)
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| upsert(&mut s.users, user)).await;
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Commit, Insert, Select, Transact, Update};

    use crate::{
        domain::{
            circle::{self, Day, Wing},
            Circle, Item,
        },
        fixture,
        infra::Database as _,
    };

    use super::{Memory, Snapshot};

    #[tokio::test]
    async fn keeps_insertion_order() {
        let db = Memory::default();
        let first = fixture::circle("A", Day::Second, Wing::South, "z1");
        let second = fixture::circle("B", Day::First, Wing::West, "a1");

        db.execute(Insert(first.clone())).await.unwrap();
        db.execute(Insert(second.clone())).await.unwrap();

        assert_eq!(
            db.execute(Select(By::<Vec<Circle>, ()>::all()))
                .await
                .unwrap(),
            vec![first, second],
        );
    }

    #[tokio::test]
    async fn replaces_updated_record_keeping_previous_reads() {
        let me = fixture::user("me");
        let item = fixture::item(circle::Id::new(), "100", &[(me.id, 1, 1)]);
        let db = Memory::new(Snapshot {
            items: vec![item.clone()],
            ..Snapshot::default()
        });

        let before = db.snapshot().await;
        let updated = item.without_request_of(me.id);
        db.execute(Update(updated.clone())).await.unwrap();

        assert_eq!(before.items, vec![item]);
        assert_eq!(
            db.execute(Select(By::<Vec<Item>, ()>::all())).await.unwrap(),
            vec![updated],
        );
    }

    #[tokio::test]
    async fn applies_transaction_on_commit() {
        let item = fixture::item(circle::Id::new(), "100", &[]);
        let db = Memory::new(Snapshot {
            items: vec![item.clone()],
            ..Snapshot::default()
        });
        let mut updated = item.clone();
        updated.name = "既刊セット".into();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Update(updated.clone())).await.unwrap();
        assert_eq!(
            tx.execute(Select(By::<Option<Item>, _>::new(item.id)))
                .await
                .unwrap(),
            Some(updated.clone()),
        );
        tx.execute(Commit).await.unwrap();

        assert_eq!(db.snapshot().await.items, vec![updated]);
    }

    #[tokio::test]
    async fn discards_uncommitted_transaction() {
        let item = fixture::item(circle::Id::new(), "100", &[]);
        let db = Memory::new(Snapshot {
            items: vec![item.clone()],
            ..Snapshot::default()
        });
        let mut updated = item.clone();
        updated.name = "既刊セット".into();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Update(updated)).await.unwrap();
        drop(tx);

        assert_eq!(db.snapshot().await.items, vec![item]);
    }
}
