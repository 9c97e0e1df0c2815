//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{command, domain, Command as _};

use crate::{api, error::InputError, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Replaces the priority of the `User`'s request for the `Item`.
    ///
    /// Acts on behalf of the authenticated `User` if no `userId` is provided.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `ITEM_NOT_EXISTS` - the `Item` with the specified ID does not exist;
    /// - `BUYER_NOT_EXISTS` - the `User` doesn't request the `Item`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updatePriority",
            item_id = %item_id,
            otel.name = Self::SPAN_NAME,
            priority = %priority,
            user_id = ?user_id,
        ),
    )]
    pub async fn update_priority(
        item_id: api::item::Id,
        priority: i32,
        user_id: Option<api::user::Id>,
        ctx: &Context,
    ) -> Result<api::Item, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdatePriority {
                item_id: item_id.into(),
                user_id: user_id.unwrap_or(my_id).into(),
                priority: priority.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Withdraws the `User`'s request for the `Item`.
    ///
    /// Acts on behalf of the authenticated `User` if no `userId` is provided.
    /// Withdrawing an absent request succeeds without changes.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `ITEM_NOT_EXISTS` - the `Item` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "removeBuyer",
            item_id = %item_id,
            otel.name = Self::SPAN_NAME,
            user_id = ?user_id,
        ),
    )]
    pub async fn remove_buyer(
        item_id: api::item::Id,
        user_id: Option<api::user::Id>,
        ctx: &Context,
    ) -> Result<api::Item, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::RemoveBuyer {
                item_id: item_id.into(),
                user_id: user_id.unwrap_or(my_id).into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Requests the `Item` for the `User`.
    ///
    /// Acts on behalf of the authenticated `User` if no `userId` is provided.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `INVALID_COUNT` - the requested count is not positive;
    /// - `ITEM_NOT_EXISTS` - the `Item` with the specified ID does not exist;
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist;
    /// - `BUYER_ALREADY_EXISTS` - the `User` already requests the `Item`.
    #[tracing::instrument(
        skip_all,
        fields(
            count = %count,
            gql.name = "addBuyer",
            item_id = %item_id,
            otel.name = Self::SPAN_NAME,
            priority = %priority,
            user_id = ?user_id,
        ),
    )]
    pub async fn add_buyer(
        item_id: api::item::Id,
        count: i32,
        priority: i32,
        user_id: Option<api::user::Id>,
        ctx: &Context,
    ) -> Result<api::Item, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let count = domain::item::Count::try_from(count)
            .map_err(|_| InputError::InvalidCount.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::AddBuyer {
                item_id: item_id.into(),
                user_id: user_id.unwrap_or(my_id).into(),
                count,
                priority: priority.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}
