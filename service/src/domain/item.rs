//! [`Item`] definitions.

use common::Price;
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{Circle, User};
use crate::domain::{circle, user};

/// Product offered by a single [`Circle`].
///
/// [`Item`]s are treated as immutable values: every modification produces a
/// new [`Item`] leaving the original one untouched, so a snapshot handed out
/// earlier never observes later changes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Item {
    /// ID of this [`Item`].
    pub id: Id,

    /// ID of the [`Circle`] selling this [`Item`].
    ///
    /// May reference a [`Circle`] which doesn't exist anymore.
    pub circle_id: circle::Id,

    /// [`Name`] of this [`Item`].
    pub name: Name,

    /// [`Price`] of a single unit of this [`Item`].
    pub price: Price,

    /// [`PurchaseRequest`]s for this [`Item`] in the order they were made.
    pub requests: Vec<PurchaseRequest>,
}

impl AsRef<Item> for Item {
    fn as_ref(&self) -> &Item {
        self
    }
}

impl Item {
    /// Returns the [`PurchaseRequest`] of the [`User`] with the provided ID,
    /// if any.
    #[must_use]
    pub fn request_of(&self, user_id: user::Id) -> Option<&PurchaseRequest> {
        self.requests.iter().find(|r| r.user_id == user_id)
    }

    /// Returns the [`PurchaseRequest`] to be served first.
    ///
    /// That's the one with the lowest [`Priority`] value, the earliest made
    /// one among equal [`Priority`] values.
    #[must_use]
    pub fn top_request(&self) -> Option<&PurchaseRequest> {
        self.requests.iter().reduce(|top, r| {
            if r.priority < top.priority {
                r
            } else {
                top
            }
        })
    }

    /// Returns a copy of this [`Item`] with the [`Priority`] of the
    /// [`User`]'s [`PurchaseRequest`] replaced.
    ///
    /// [`None`] is returned if the [`User`] has no [`PurchaseRequest`] for
    /// this [`Item`].
    #[must_use]
    pub fn with_priority(
        &self,
        user_id: user::Id,
        priority: Priority,
    ) -> Option<Self> {
        self.request_of(user_id)?;

        let requests = self
            .requests
            .iter()
            .map(|r| {
                if r.user_id == user_id {
                    PurchaseRequest { priority, ..*r }
                } else {
                    *r
                }
            })
            .collect();
        Some(Self {
            requests,
            ..self.clone()
        })
    }

    /// Returns a copy of this [`Item`] without any [`PurchaseRequest`] of the
    /// [`User`].
    #[must_use]
    pub fn without_request_of(&self, user_id: user::Id) -> Self {
        Self {
            requests: self
                .requests
                .iter()
                .filter(|r| r.user_id != user_id)
                .copied()
                .collect(),
            ..self.clone()
        }
    }

    /// Returns a copy of this [`Item`] with the provided [`PurchaseRequest`]
    /// appended.
    ///
    /// [`None`] is returned if the [`User`] already has a [`PurchaseRequest`]
    /// for this [`Item`].
    #[must_use]
    pub fn with_request(&self, request: PurchaseRequest) -> Option<Self> {
        if self.request_of(request.user_id).is_some() {
            return None;
        }

        let mut requests = Vec::with_capacity(self.requests.len() + 1);
        requests.extend_from_slice(&self.requests);
        requests.push(request);
        Some(Self {
            requests,
            ..self.clone()
        })
    }
}

/// Intent of a [`User`] to buy an [`Item`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PurchaseRequest {
    /// ID of the requesting [`User`].
    pub user_id: user::Id,

    /// [`Count`] of units requested.
    pub count: Count,

    /// [`Priority`] of this [`PurchaseRequest`] among the competing ones.
    pub priority: Priority,
}

impl PurchaseRequest {
    /// Returns the [`Price`] of this [`PurchaseRequest`] for the provided
    /// unit [`Price`].
    ///
    /// [`None`] is returned if the [`Price`] is not representable.
    #[must_use]
    pub fn subtotal(&self, price: Price) -> Option<Price> {
        price.times(self.count.get())
    }
}

/// ID of an [`Item`].
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

/// Name of an [`Item`].
#[derive(
    AsRef, Clone, Debug, Display, Eq, From, FromStr, Hash, Into, PartialEq,
)]
#[as_ref(str)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

/// Positive number of requested units of an [`Item`].
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(ToSql), postgres(transparent))]
pub struct Count(i32);

impl Count {
    /// Creates a new [`Count`] if the provided `count` is positive.
    #[must_use]
    pub fn new(count: i32) -> Option<Self> {
        (count > 0).then_some(Self(count))
    }

    /// Returns the number of units.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.unsigned_abs()
    }
}

impl TryFrom<i32> for Count {
    type Error = i32;

    fn try_from(count: i32) -> Result<Self, Self::Error> {
        Self::new(count).ok_or(count)
    }
}

#[cfg(feature = "postgres")]
impl<'a> FromSql<'a> for Count {
    postgres_types::accepts!(INT4);

    fn from_sql(
        ty: &postgres_types::Type,
        raw: &'a [u8],
    ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        Self::try_from(i32::from_sql(ty, raw)?)
            .map_err(|v| format!("invalid `Count` value: {v}").into())
    }
}

/// Rank of a [`PurchaseRequest`] among the competing ones.
///
/// The lower the value, the earlier the [`PurchaseRequest`] is served.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Priority(i32);

#[cfg(test)]
mod spec {
    use common::Price;

    use crate::domain::{circle, user};

    use super::{Count, Id, Item, Priority, PurchaseRequest};

    fn request(user_id: user::Id, priority: i32) -> PurchaseRequest {
        PurchaseRequest {
            user_id,
            count: Count::new(1).unwrap(),
            priority: Priority::from(priority),
        }
    }

    fn item(requests: Vec<PurchaseRequest>) -> Item {
        Item {
            id: Id::new(),
            circle_id: circle::Id::new(),
            name: "新刊セット".into(),
            price: "1000".parse().unwrap(),
            requests,
        }
    }

    #[test]
    fn count_is_positive() {
        assert!(Count::new(0).is_none());
        assert!(Count::new(-1).is_none());
        assert_eq!(Count::new(3).map(Count::get), Some(3));
    }

    #[test]
    fn top_request_prefers_earliest_among_equal() {
        let (a, b, c) = (user::Id::new(), user::Id::new(), user::Id::new());
        let item = item(vec![request(a, 5), request(b, 2), request(c, 2)]);

        assert_eq!(item.top_request().map(|r| r.user_id), Some(b));

        let empty = self::item(vec![]);
        assert_eq!(empty.top_request(), None);
    }

    #[test]
    fn updates_priority_without_touching_original() {
        let (a, b) = (user::Id::new(), user::Id::new());
        let original = item(vec![request(a, 1), request(b, 2)]);

        let updated = original.with_priority(b, Priority::from(0)).unwrap();

        assert_eq!(updated.request_of(b).unwrap().priority, Priority::from(0));
        assert_eq!(updated.request_of(a).unwrap().priority, Priority::from(1));
        assert_eq!(
            original.request_of(b).unwrap().priority,
            Priority::from(2),
        );
        assert!(original.with_priority(user::Id::new(), 1.into()).is_none());
    }

    #[test]
    fn removes_request_without_touching_original() {
        let (a, b) = (user::Id::new(), user::Id::new());
        let original = item(vec![request(a, 1), request(b, 2)]);

        let updated = original.without_request_of(a);

        assert_eq!(updated.requests, vec![request(b, 2)]);
        assert_eq!(original.requests.len(), 2);
        assert_eq!(updated.without_request_of(a), updated);
    }

    #[test]
    fn appends_request_once_per_user() {
        let (a, b) = (user::Id::new(), user::Id::new());
        let original = item(vec![request(a, 1)]);

        let updated = original.with_request(request(b, 1)).unwrap();

        assert_eq!(updated.requests, vec![request(a, 1), request(b, 1)]);
        assert!(updated.with_request(request(a, 3)).is_none());
        assert_eq!(original.requests.len(), 1);
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn reads_only_positive_count_from_sql() {
        use postgres_types::{FromSql as _, Type};

        assert_eq!(
            Count::from_sql(&Type::INT4, &3_i32.to_be_bytes()).unwrap(),
            Count::new(3).unwrap(),
        );
        assert!(Count::from_sql(&Type::INT4, &0_i32.to_be_bytes()).is_err());
        assert!(Count::from_sql(&Type::INT4, &(-2_i32).to_be_bytes()).is_err());
    }

    #[test]
    fn subtotal() {
        let mut request = request(user::Id::new(), 1);
        request.count = Count::new(3).unwrap();

        assert_eq!(
            request.subtotal("500".parse().unwrap()),
            Some("1500".parse::<Price>().unwrap()),
        );
        assert_eq!(
            request.subtotal("79228162514264337593543950335".parse().unwrap()),
            None,
        );
    }
}
