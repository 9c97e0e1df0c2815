//! [`Item`]-related definitions.

use common::Price;
use derive_more::{Display, From, Into};
use futures::{future, TryFutureExt as _};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, error, AsError, Context, Error};

/// An item offered by a circle.
#[derive(Clone, Debug)]
pub struct Item {
    /// ID of this [`Item`].
    id: Id,

    /// Underlying [`domain::Item`].
    item: OnceCell<domain::Item>,
}

impl From<domain::Item> for Item {
    fn from(item: domain::Item) -> Self {
        Self {
            id: item.id.into(),
            item: OnceCell::new_with(Some(item)),
        }
    }
}

impl Item {
    /// Creates a new [`Item`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Item`] with the provided ID exists,
    /// otherwise accessing this [`Item`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            item: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Item`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Item`] doesn't exist.
    async fn item(&self, ctx: &Context) -> Result<&domain::Item, Error> {
        let id = self.id.into();
        self.item
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::item::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|i| {
                        future::ready(i.ok_or_else(|| {
                            error::ItemError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// An item offered by a circle.
#[graphql_object(context = Context)]
impl Item {
    /// Unique identifier of this `Item`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Item.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Name of this `Item`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Item.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.item(ctx).await?.name.clone().into())
    }

    /// Price of a single unit of this `Item`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Item.price",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn price(&self, ctx: &Context) -> Result<Price, Error> {
        Ok(self.item(ctx).await?.price)
    }

    /// `Circle` selling this `Item`, if it can be found.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Item.circle",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn circle(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::Circle>, Error> {
        let circle_id = self.item(ctx).await?.circle_id;
        ctx.service()
            .execute(query::circle::ById::by(circle_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|c| c.map(Into::into))
    }
}

/// Unique identifier of an `Item`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::item::Id)]
#[into(domain::item::Id)]
#[graphql(name = "ItemId", transparent)]
pub struct Id(Uuid);

/// Name of an `Item`.
#[derive(Clone, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq)]
#[from(domain::item::Name)]
#[into(domain::item::Name)]
#[graphql(name = "ItemName", transparent)]
pub struct Name(String);

/// Detailed view of an [`Item`].
#[derive(Clone, Debug, From)]
pub struct Detail(query::item::Output);

/// Detailed view of an `Item` along with its buyers.
#[graphql_object(name = "ItemDetail", context = Context)]
impl Detail {
    /// Viewed `Item`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "ItemDetail.item",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn item(&self) -> Item {
        self.0.item.clone().into()
    }

    /// Name of the `Circle` selling the `Item`.
    ///
    /// Deleted `Circle`s are marked with the `(削除済み)` suffix, and a
    /// `Circle` which cannot be found reads `サークルが見つかりません`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "ItemDetail.circleName",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn circle_name(&self) -> String {
        self.0.owner.label()
    }

    /// Location of the `Circle` selling the `Item`, if it can be found.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "ItemDetail.locationLabel",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn location_label(&self) -> Option<String> {
        self.0.owner.location_label()
    }

    /// `ItemBuyer`s of the `Item` in the order of their requests.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "ItemDetail.buyers",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn buyers(&self) -> Vec<Buyer> {
        self.0
            .buyers
            .iter()
            .cloned()
            .map(|buyer| Buyer {
                buyer,
                price: self.0.item.price,
            })
            .collect()
    }

    /// `ItemBuyer` to be served first, if any.
    ///
    /// That's the one with the lowest priority, the earliest requested one
    /// among equal priorities.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "ItemDetail.topBuyer",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn top_buyer(&self) -> Option<Buyer> {
        let top = self.0.item.top_request()?;
        self.0
            .buyers
            .iter()
            .find(|b| b.request == *top)
            .cloned()
            .map(|buyer| Buyer {
                buyer,
                price: self.0.item.price,
            })
    }
}

/// Buyer of an [`Item`].
#[derive(Clone, Debug)]
pub struct Buyer {
    /// Underlying [`query::item::Buyer`].
    buyer: query::item::Buyer,

    /// Unit [`Price`] of the [`Item`].
    price: Price,
}

/// `User` requesting an `Item`.
#[graphql_object(name = "ItemBuyer", context = Context)]
impl Buyer {
    /// ID of the requesting `User`.
    pub fn user_id(&self) -> api::user::Id {
        self.buyer.request.user_id.into()
    }

    /// Requesting `User`, if it's known.
    pub fn user(&self) -> Option<api::User> {
        self.buyer.user.clone().map(Into::into)
    }

    /// Number of requested units.
    pub fn count(&self) -> i32 {
        self.buyer.request.count.into()
    }

    /// Priority of the request. The lower, the earlier it's served.
    pub fn priority(&self) -> i32 {
        self.buyer.request.priority.into()
    }

    /// Price of all the requested units.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PRICE_OVERFLOW` - the price is too large to be computed.
    pub fn subtotal(&self) -> Result<Price, Error> {
        self.buyer
            .request
            .subtotal(self.price)
            .ok_or_else(|| error::PriceError::Overflow.into())
    }
}
