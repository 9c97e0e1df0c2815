//! [`Circle`] definitions.

use common::define_kind;
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Vendor booth selling [`Item`]s at the event.
///
/// [`Item`]: crate::domain::Item
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Circle {
    /// ID of this [`Circle`].
    pub id: Id,

    /// [`Name`] of this [`Circle`].
    pub name: Name,

    /// [`Day`] this [`Circle`] operates on.
    pub day: Day,

    /// [`Wing`] this [`Circle`] is located in.
    pub wing: Wing,

    /// [`Place`] of this [`Circle`] inside its [`Wing`].
    pub place: Place,

    /// Indicator whether this [`Circle`] is soft-deleted.
    ///
    /// Deleted [`Circle`]s are kept for the [`Item`]s still referencing them,
    /// but excluded from the catalog.
    ///
    /// [`Item`]: crate::domain::Item
    pub deleted: bool,
}

impl Circle {
    /// Returns the human-readable location of this [`Circle`], like
    /// `1日目 西 ま42b`.
    #[must_use]
    pub fn location_label(&self) -> String {
        format!("{} {} {}", self.day.label(), self.wing.label(), self.place)
    }
}

/// ID of a [`Circle`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of a [`Circle`].
#[derive(
    AsRef, Clone, Debug, Display, Eq, From, FromStr, Hash, Into, PartialEq,
)]
#[as_ref(str)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

/// Booth code of a [`Circle`], like `ま42b`.
#[derive(
    AsRef, Clone, Debug, Display, Eq, From, FromStr, Hash, Into, PartialEq,
)]
#[as_ref(str)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Place(String);

define_kind! {
    #[doc = "Day of the event a [`Circle`] operates on."]
    enum Day {
        #[doc = "First day of the event."]
        #[label = "1日目"]
        First = 1,

        #[doc = "Second day of the event."]
        #[label = "2日目"]
        Second = 2,
    }
}

define_kind! {
    #[doc = "Building section of the venue a [`Circle`] is located in."]
    enum Wing {
        #[doc = "West wing."]
        #[label = "西"]
        West = 1,

        #[doc = "East wing."]
        #[label = "東"]
        East = 2,

        #[doc = "South wing."]
        #[label = "南"]
        South = 3,
    }
}
