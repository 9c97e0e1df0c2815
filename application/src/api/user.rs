//! [`User`]-related definitions.

use common::Price;
use derive_more::{Display, From, Into};
use futures::{future, TryFutureExt as _};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query, read, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, error, AsError, Context, Error};

/// A [`User`] planning purchases.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`domain::User`] representing this [`User`].
    user: OnceCell<domain::User>,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self {
            id: user.id.into(),
            user: OnceCell::new_with(Some(user)),
        }
    }
}

impl User {
    /// Returns the [`domain::User`] representing this [`User`].
    ///
    /// # Errors
    ///
    /// Error if the [`domain::User`] doesn't exist.
    async fn user(&self, ctx: &Context) -> Result<&domain::User, Error> {
        let id = self.id.into();
        self.user
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::user::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|u| {
                        future::ready(u.ok_or_else(|| {
                            error::UserError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A `User` planning purchases.
#[graphql_object(context = Context)]
impl User {
    /// Unique identifier of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Display name of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.user(ctx).await?.name.clone().into())
    }

    /// Avatar URL of this `User`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.photoUrl",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn photo_url(
        &self,
        ctx: &Context,
    ) -> Result<Option<PhotoUrl>, Error> {
        Ok(self.user(ctx).await?.photo_url.clone().map(Into::into))
    }
}

/// Unique identifier of a `User`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::user::Id)]
#[into(domain::user::Id)]
#[graphql(name = "UserId", transparent)]
pub struct Id(Uuid);

/// Display name of a `User`.
#[derive(Clone, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq)]
#[from(domain::user::Name)]
#[into(domain::user::Name)]
#[graphql(name = "UserName", transparent)]
pub struct Name(String);

/// Avatar URL of a `User`.
#[derive(Clone, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq)]
#[from(domain::user::PhotoUrl)]
#[into(domain::user::PhotoUrl)]
#[graphql(name = "UserPhotoUrl", transparent)]
pub struct PhotoUrl(String);

/// Ordering of a `User`'s purchase list.
#[derive(Clone, Copy, Debug, Default, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PurchaseListSort")]
pub enum Sort {
    /// By the location of the `Circle`s: day, wing and place.
    #[default]
    Location,

    /// By the `User`'s priority, the most wanted `Item`s first.
    PriorityAsc,

    /// By the `User`'s priority, the least wanted `Item`s first.
    PriorityDesc,
}

impl From<Sort> for read::item::SortKey {
    fn from(sort: Sort) -> Self {
        use read::item::Direction as D;
        match sort {
            Sort::Location => Self::Location,
            Sort::PriorityAsc => Self::Priority(D::Ascending),
            Sort::PriorityDesc => Self::Priority(D::Descending),
        }
    }
}

impl From<read::item::SortKey> for Sort {
    fn from(key: read::item::SortKey) -> Self {
        use read::item::{Direction as D, SortKey as K};
        match key {
            K::Location => Self::Location,
            K::Priority(D::Ascending) => Self::PriorityAsc,
            K::Priority(D::Descending) => Self::PriorityDesc,
        }
    }
}

/// Purchase list of a [`User`].
#[derive(Clone, Debug)]
pub struct Detail {
    /// Underlying [`query::user::Output`].
    output: query::user::Output,

    /// [`Sort`] the purchase list is ordered by.
    sort: Sort,
}

impl Detail {
    /// Wraps the provided [`query::user::Output`] ordered by the provided
    /// [`Sort`].
    #[must_use]
    pub fn new(output: query::user::Output, sort: Sort) -> Self {
        Self { output, sort }
    }
}

/// Purchase list of a `User`.
#[graphql_object(name = "PurchaseList", context = Context)]
impl Detail {
    /// `User` owning this list.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "PurchaseList.user",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn user(&self) -> User {
        self.output.user.clone().into()
    }

    /// `PurchaseListRow`s of this list.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "PurchaseList.rows",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn rows(&self) -> Vec<Row> {
        self.output.rows.iter().cloned().map(Row).collect()
    }

    /// Number of `PurchaseListRow`s in this list.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "PurchaseList.count",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn count(&self) -> Result<i32, Error> {
        i32::try_from(self.output.count()).map_err(AsError::into_error)
    }

    /// Total price of all the `PurchaseListRow`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "PurchaseList.total",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn total(&self) -> Price {
        self.output.total
    }

    /// `PurchaseListSort` this list is ordered by.
    pub fn sort(&self) -> Sort {
        self.sort
    }

    /// `PurchaseListSort` to request once the priority ordering is toggled.
    ///
    /// Switches a location-ordered list to the ascending priority ordering,
    /// and reverses a priority-ordered one.
    pub fn toggled_priority_sort(&self) -> Sort {
        read::item::SortKey::from(self.sort)
            .toggle_priority()
            .into()
    }
}

/// Row of a [`Detail`] purchase list.
#[derive(Clone, Debug)]
pub struct Row(query::user::Row);

/// `Item` requested by the `User` in a `PurchaseList`.
#[graphql_object(name = "PurchaseListRow", context = Context)]
impl Row {
    /// Requested `Item`.
    pub fn item(&self) -> api::Item {
        self.0.item.clone().into()
    }

    /// Name of the `Circle` selling the `Item`.
    ///
    /// Reads `サークルが見つかりません` if the `Circle` cannot be found.
    pub fn circle_name(&self) -> String {
        self.0.owner.label()
    }

    /// Location of the `Circle` selling the `Item`, if it can be found.
    pub fn location_label(&self) -> Option<String> {
        self.0.owner.location_label()
    }

    /// Number of units the `User` requested.
    pub fn count(&self) -> i32 {
        self.0.request.count.into()
    }

    /// Priority of the `User`'s request.
    pub fn priority(&self) -> i32 {
        self.0.request.priority.into()
    }

    /// Price of all the requested units.
    pub fn subtotal(&self) -> Price {
        self.0.subtotal
    }
}

#[cfg(test)]
mod spec {
    use service::read::item::{Direction, SortKey};

    use super::Sort;

    #[test]
    fn converts_sort_keys_both_ways() {
        for sort in [Sort::Location, Sort::PriorityAsc, Sort::PriorityDesc] {
            assert_eq!(Sort::from(SortKey::from(sort)), sort);
        }
        assert_eq!(
            SortKey::from(Sort::PriorityDesc),
            SortKey::Priority(Direction::Descending),
        );
    }
}
