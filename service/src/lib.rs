//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;

use derive_more::Debug;

#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, database: Db) -> Self {
        Self { config, database }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }
}

#[cfg(test)]
mod fixture {
    //! Records and [`Service`] for tests.

    use common::operations::Insert;
    use jsonwebtoken::DecodingKey;

    use crate::{
        domain::{
            circle::{self, Day, Wing},
            item::{self, Count, Priority, PurchaseRequest},
            user, Circle, Item, User,
        },
        infra::{Database as _, Memory},
        Config, Service,
    };

    /// Secret the test [JWT]s are signed with.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    pub(crate) const JWT_SECRET: &[u8] = b"purchase-list-secret";

    /// Creates a new [`Service`] over a [`Memory`] populated with the
    /// provided records.
    pub(crate) async fn service(
        circles: Vec<Circle>,
        items: Vec<Item>,
        users: Vec<User>,
    ) -> Service<Memory> {
        let db = Memory::default();
        for c in circles {
            db.execute(Insert(c)).await.unwrap();
        }
        for i in items {
            db.execute(Insert(i)).await.unwrap();
        }
        for u in users {
            db.execute(Insert(u)).await.unwrap();
        }
        Service::new(
            Config {
                jwt_decoding_key: DecodingKey::from_secret(JWT_SECRET),
            },
            db,
        )
    }

    pub(crate) fn circle(
        name: &str,
        day: Day,
        wing: Wing,
        place: &str,
    ) -> Circle {
        Circle {
            id: circle::Id::new(),
            name: name.into(),
            day,
            wing,
            place: place.into(),
            deleted: false,
        }
    }

    /// Creates a new [`Item`] with the provided `(user, count, priority)`
    /// requests.
    pub(crate) fn item(
        circle_id: circle::Id,
        price: &str,
        requests: &[(user::Id, i32, i32)],
    ) -> Item {
        Item {
            id: item::Id::new(),
            circle_id,
            name: "新刊セット".into(),
            price: price.parse().unwrap(),
            requests: requests
                .iter()
                .map(|&(user_id, count, priority)| PurchaseRequest {
                    user_id,
                    count: Count::new(count).unwrap(),
                    priority: Priority::from(priority),
                })
                .collect(),
        }
    }

    pub(crate) fn user(name: &str) -> User {
        User {
            id: user::Id::new(),
            name: name.into(),
            photo_url: None,
        }
    }
}
