//! Operations of a storage, dispatched via the [`Handler`] trait.

use std::marker::PhantomData;

use crate::Handler;

/// Operation storing a new record.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Operation replacing a stored record with the provided one.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Operation reading records.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Operation locking a record until the end of the current transaction.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Operation starting a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Client of a started transaction.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Operation committing a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Key `B` a `W` is looked up by, like an `item::Id` of an `Option<Item>`.
///
/// The `W` only selects the [`Handler`] implementation, so the same key type
/// may look up different views.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Looked up view.
    _what: PhantomData<W>,

    /// Key to look the view up by.
    key: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] looking up a `W` by the provided `key`.
    #[must_use]
    pub fn new(key: B) -> Self {
        Self {
            _what: PhantomData,
            key,
        }
    }

    /// Consumes this [`By`] returning its key.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.key
    }
}

impl<W> By<W, ()> {
    /// Creates a new [`By`] selecting every stored `W`.
    #[must_use]
    pub fn all() -> Self {
        Self::new(())
    }
}
