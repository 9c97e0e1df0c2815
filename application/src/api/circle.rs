//! [`Circle`]-related definitions.

use derive_more::{Display, From, Into};
use futures::{future, TryFutureExt as _};
use juniper::{graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLScalar};
use service::{domain, query, read, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, error, AsError, Context, Error};

/// A circle selling items at the event.
#[derive(Clone, Debug)]
pub struct Circle {
    /// ID of this [`Circle`].
    id: Id,

    /// Underlying [`domain::Circle`].
    circle: OnceCell<domain::Circle>,
}

impl From<domain::Circle> for Circle {
    fn from(circle: domain::Circle) -> Self {
        Self {
            id: circle.id.into(),
            circle: OnceCell::new_with(Some(circle)),
        }
    }
}

impl Circle {
    /// Creates a new [`Circle`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Circle`] with the provided ID exists,
    /// otherwise accessing this [`Circle`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            circle: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Circle`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Circle`] doesn't exist.
    async fn circle(&self, ctx: &Context) -> Result<&domain::Circle, Error> {
        let id = self.id.into();
        self.circle
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::circle::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|c| {
                        future::ready(c.ok_or_else(|| {
                            error::CircleError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A circle selling items at the event.
#[graphql_object(context = Context)]
impl Circle {
    /// Unique identifier of this `Circle`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Circle.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Name of this `Circle`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Circle.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.circle(ctx).await?.name.clone().into())
    }

    /// Day of the event this `Circle` operates on.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Circle.day",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn day(&self, ctx: &Context) -> Result<Day, Error> {
        Ok(self.circle(ctx).await?.day.into())
    }

    /// Wing of the venue this `Circle` is located in.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Circle.wing",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn wing(&self, ctx: &Context) -> Result<Wing, Error> {
        Ok(self.circle(ctx).await?.wing.into())
    }

    /// Booth code of this `Circle` inside its wing.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Circle.place",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn place(&self, ctx: &Context) -> Result<Place, Error> {
        Ok(self.circle(ctx).await?.place.clone().into())
    }

    /// Human-readable location of this `Circle`, like `1日目 西 ま42b`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Circle.locationLabel",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn location_label(
        &self,
        ctx: &Context,
    ) -> Result<String, Error> {
        Ok(self.circle(ctx).await?.location_label())
    }

    /// Indicator whether this `Circle` has been removed from the catalog.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Circle.deleted",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn deleted(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.circle(ctx).await?.deleted)
    }
}

/// Unique identifier of a `Circle`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::circle::Id)]
#[into(domain::circle::Id)]
#[graphql(name = "CircleId", transparent)]
pub struct Id(Uuid);

/// Name of a `Circle`.
#[derive(Clone, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq)]
#[from(domain::circle::Name)]
#[into(domain::circle::Name)]
#[graphql(name = "CircleName", transparent)]
pub struct Name(String);

/// Booth code of a `Circle`.
#[derive(Clone, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq)]
#[from(domain::circle::Place)]
#[into(domain::circle::Place)]
#[graphql(name = "CirclePlace", transparent)]
pub struct Place(String);

/// Day of the event.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, Hash, PartialEq)]
#[graphql(name = "CircleDay")]
pub enum Day {
    /// First day of the event.
    First,

    /// Second day of the event.
    Second,
}

impl From<domain::circle::Day> for Day {
    fn from(day: domain::circle::Day) -> Self {
        use domain::circle::Day as D;
        match day {
            D::First => Self::First,
            D::Second => Self::Second,
        }
    }
}

impl From<Day> for domain::circle::Day {
    fn from(day: Day) -> Self {
        match day {
            Day::First => Self::First,
            Day::Second => Self::Second,
        }
    }
}

/// Building section of the venue.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, Hash, PartialEq)]
#[graphql(name = "CircleWing")]
pub enum Wing {
    /// West wing.
    West,

    /// East wing.
    East,

    /// South wing.
    South,
}

impl From<domain::circle::Wing> for Wing {
    fn from(wing: domain::circle::Wing) -> Self {
        use domain::circle::Wing as W;
        match wing {
            W::West => Self::West,
            W::East => Self::East,
            W::South => Self::South,
        }
    }
}

impl From<Wing> for domain::circle::Wing {
    fn from(wing: Wing) -> Self {
        match wing {
            Wing::West => Self::West,
            Wing::East => Self::East,
            Wing::South => Self::South,
        }
    }
}

/// Condition selecting `Circle`s of the catalog.
///
/// Omitting any of the fields makes the condition match no `Circle` at all.
#[derive(Clone, Debug, Eq, GraphQLInputObject, PartialEq)]
#[graphql(name = "CircleCondition")]
pub struct Condition {
    /// Text the `Circle` name should contain (case-sensitive). Empty text
    /// matches any name.
    pub name: Option<String>,

    /// Text the `Circle` place should contain (case-sensitive). Empty text
    /// matches any place.
    pub place: Option<String>,

    /// Checked days. `Circle`s of unchecked days are not selected.
    pub days: Option<Vec<Day>>,

    /// Checked wings. `Circle`s of unchecked wings are not selected.
    pub wings: Option<Vec<Wing>>,
}

impl From<Condition> for read::circle::Condition {
    fn from(cond: Condition) -> Self {
        let Condition {
            name,
            place,
            days,
            wings,
        } = cond;
        Self {
            name,
            place,
            days: days.map(|d| {
                read::circle::Toggles::checked(
                    d.into_iter().map(domain::circle::Day::from),
                )
            }),
            wings: wings.map(|w| {
                read::circle::Toggles::checked(
                    w.into_iter().map(domain::circle::Wing::from),
                )
            }),
        }
    }
}

#[cfg(test)]
mod spec {
    use service::read;

    use super::{Condition, Day, Wing};

    #[test]
    fn converts_checked_lists_into_toggles() {
        let cond = read::circle::Condition::from(Condition {
            name: Some("A".into()),
            place: Some(String::new()),
            days: Some(vec![Day::Second]),
            wings: Some(vec![Wing::West, Wing::South]),
        });

        let days = cond.days.unwrap();
        assert!(!days.is_on(service::domain::circle::Day::First));
        assert!(days.is_on(service::domain::circle::Day::Second));

        let wings = cond.wings.unwrap();
        assert!(wings.is_on(service::domain::circle::Wing::West));
        assert!(!wings.is_on(service::domain::circle::Wing::East));
        assert!(wings.is_on(service::domain::circle::Wing::South));
    }

    #[test]
    fn keeps_omitted_fields_unset() {
        let cond = read::circle::Condition::from(Condition {
            name: None,
            place: None,
            days: None,
            wings: Some(vec![]),
        });

        assert_eq!(cond.name, None);
        assert_eq!(cond.place, None);
        assert!(cond.days.is_none());
        assert_eq!(cond.wings, Some(read::circle::Toggles::default()));
    }
}
