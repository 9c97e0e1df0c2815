//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, Query as _};

use crate::{
    api,
    error::{CircleError, UserError},
    AsError, Context, Error,
};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::user::ById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists the catalog of `Circle`s matching the provided condition.
    ///
    /// Deleted `Circle`s are never listed. Every `Circle` is matched if no
    /// condition is provided.
    #[tracing::instrument(
        skip_all,
        fields(
            condition = ?condition,
            gql.name = "circles",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn circles(
        condition: Option<api::circle::Condition>,
        ctx: &Context,
    ) -> Result<Vec<api::Circle>, Error> {
        let list = condition
            .map(|c| query::circles::List {
                condition: c.into(),
            })
            .unwrap_or_default();
        ctx.service()
            .execute(list)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|circles| circles.into_iter().map(Into::into).collect())
    }

    /// Returns the `Circle` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CIRCLE_NOT_EXISTS` - the `Circle` with the specified ID does not
    ///                         exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "circle",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn circle(
        id: api::circle::Id,
        ctx: &Context,
    ) -> Result<api::Circle, Error> {
        ctx.service()
            .execute(query::circle::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| CircleError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the detailed view of the `Item` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ITEM_NOT_EXISTS` - the `Item` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "item",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn item(
        id: api::item::Id,
        ctx: &Context,
    ) -> Result<api::item::Detail, Error> {
        ctx.service()
            .execute(query::item::Detail { item_id: id.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the purchase list of the `User` with the specified ID.
    ///
    /// `Item`s of deleted `Circle`s are not listed. If the condition is
    /// provided, only `Item`s of the `Circle`s matching it are listed.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist;
    /// - `PRICE_OVERFLOW` - the total price is too large to be computed.
    #[tracing::instrument(
        skip_all,
        fields(
            condition = ?condition,
            gql.name = "user",
            id = %id,
            otel.name = Self::SPAN_NAME,
            sort = ?sort,
        ),
    )]
    pub async fn user(
        id: api::user::Id,
        #[graphql(default)] sort: api::user::Sort,
        condition: Option<api::circle::Condition>,
        ctx: &Context,
    ) -> Result<api::user::Detail, Error> {
        ctx.service()
            .execute(query::user::Detail {
                user_id: id.into(),
                sort: sort.into(),
                condition: condition.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|output| api::user::Detail::new(output, sort))
    }

    /// Lists all the `User`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "users",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn users(ctx: &Context) -> Result<Vec<api::User>, Error> {
        ctx.service()
            .execute(query::users::List::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|users| users.into_iter().map(Into::into).collect())
    }

    /// Resolves the `User` served first for every requested `Item`.
    ///
    /// Rows follow the catalog order of the `Circle`s, and then the order of
    /// the `Item`s inside each `Circle`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "topBuyers",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn top_buyers(
        ctx: &Context,
    ) -> Result<Vec<api::report::TopBuyer>, Error> {
        ctx.service()
            .execute(query::report::TopBuyers)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|rows| rows.into_iter().map(Into::into).collect())
    }
}
