//! [`TopBuyer`] report definition.

use juniper::graphql_object;
use service::{query, read, Query as _};

#[cfg(doc)]
use crate::api::{Circle, Item, User};
use crate::{api, AsError, Context, Error};

/// Row of the report resolving the [`User`] served first for every requested
/// [`Item`].
#[derive(Clone, Debug)]
pub struct TopBuyer {
    /// Underlying [`read::report::TopBuyer`].
    row: read::report::TopBuyer,

    /// [`Circle`] selling the [`Item`].
    circle: api::Circle,

    /// Requested [`Item`].
    item: api::Item,
}

impl From<read::report::TopBuyer> for TopBuyer {
    fn from(row: read::report::TopBuyer) -> Self {
        // SAFETY: `TopBuyer` rows are resolved from the loaded `Circle`s and
        //         `Item`s only.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let (circle, item) = unsafe {
            (
                api::Circle::new_unchecked(row.circle_id),
                api::Item::new_unchecked(row.item_id),
            )
        };
        Self { row, circle, item }
    }
}

/// `User` served first for a single requested `Item`.
#[graphql_object(name = "TopBuyer", context = Context)]
impl TopBuyer {
    /// `Circle` selling the `Item`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "TopBuyer.circle",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn circle(&self) -> &api::Circle {
        &self.circle
    }

    /// Requested `Item`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "TopBuyer.item",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn item(&self) -> &api::Item {
        &self.item
    }

    /// ID of the `User` served first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "TopBuyer.userId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn user_id(&self) -> api::user::Id {
        self.row.user_id.into()
    }

    /// `User` served first, if it's known.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "TopBuyer.user",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn user(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::User>, Error> {
        ctx.service()
            .execute(query::user::ById::by(self.row.user_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|u| u.map(Into::into))
    }

    /// Number of units the `User` requested.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "TopBuyer.count",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn count(&self) -> i32 {
        self.row.count.into()
    }

    /// Priority of the `User`'s request.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "TopBuyer.priority",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.row.priority.into()
    }
}
