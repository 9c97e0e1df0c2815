//! [`Item`]-related read definitions.

use std::collections::HashMap;

use derive_more::Display;

use crate::domain::{circle, user, Circle, Item};

/// Classification of the [`Circle`] an [`Item`] belongs to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Owner {
    /// [`Circle`] exists and is not deleted.
    Active(Circle),

    /// [`Circle`] exists, but is soft-deleted.
    Deleted(Circle),

    /// [`Circle`] cannot be found.
    Missing,
}

impl Owner {
    /// Text displayed instead of the name of a [`Owner::Missing`] [`Circle`].
    pub const MISSING_LABEL: &'static str = "サークルが見つかりません";

    /// Suffix appended to the name of a [`Owner::Deleted`] [`Circle`].
    pub const DELETED_MARK: &'static str = "(削除済み)";

    /// Classifies the [`Circle`] of the provided [`Item`] among the provided
    /// ones.
    #[must_use]
    pub fn of(item: &Item, circles: &[Circle]) -> Self {
        Self::from_found(circles.iter().find(|c| c.id == item.circle_id))
    }

    /// Classifies an optionally found [`Circle`].
    #[must_use]
    pub fn from_found(circle: Option<&Circle>) -> Self {
        match circle {
            Some(c) if c.deleted => Self::Deleted(c.clone()),
            Some(c) => Self::Active(c.clone()),
            None => Self::Missing,
        }
    }

    /// Returns the [`Circle`], if it exists.
    #[must_use]
    pub fn circle(&self) -> Option<&Circle> {
        match self {
            Self::Active(c) | Self::Deleted(c) => Some(c),
            Self::Missing => None,
        }
    }

    /// Returns the displayed name of the [`Circle`].
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Active(c) => c.name.to_string(),
            Self::Deleted(c) => format!("{}{}", c.name, Self::DELETED_MARK),
            Self::Missing => Self::MISSING_LABEL.to_owned(),
        }
    }

    /// Returns the displayed location of the [`Circle`], if it exists.
    #[must_use]
    pub fn location_label(&self) -> Option<String> {
        self.circle().map(Circle::location_label)
    }
}

/// Policy regarding [`Item`]s of deleted [`Circle`]s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Deleted {
    /// Drop such [`Item`]s.
    #[default]
    Exclude,

    /// Keep such [`Item`]s marked as [`Owner::Deleted`].
    Retain,
}

/// [`Item`] listed along with its [`Owner`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Listed {
    /// Listed [`Item`].
    pub item: Item,

    /// [`Owner`] of the [`Item`].
    pub owner: Owner,
}

impl AsRef<Item> for Listed {
    fn as_ref(&self) -> &Item {
        &self.item
    }
}

/// Indexes the provided [`Circle`]s by their IDs.
///
/// The first [`Circle`] wins in case of duplicated IDs.
fn index(circles: &[Circle]) -> HashMap<circle::Id, &Circle> {
    let mut index = HashMap::with_capacity(circles.len());
    for c in circles {
        _ = index.entry(c.id).or_insert(c);
    }
    index
}

/// Classifies the provided [`Item`]s by their [`Owner`]s, dropping the ones of
/// deleted [`Circle`]s unless [`Deleted::Retain`]ed.
///
/// [`Item`]s of unknown [`Circle`]s are kept as [`Owner::Missing`]. The order
/// of [`Item`]s is preserved.
#[must_use]
pub fn filter_active(
    items: Vec<Item>,
    circles: &[Circle],
    deleted: Deleted,
) -> Vec<Listed> {
    let index = index(circles);
    items
        .into_iter()
        .filter_map(|item| {
            let owner = Owner::from_found(index.get(&item.circle_id).copied());
            let keep = deleted == Deleted::Retain
                || !matches!(owner, Owner::Deleted(_));
            keep.then_some(Listed { item, owner })
        })
        .collect()
}

/// Orders the provided [`Item`]s by the location of their [`Circle`]s.
///
/// Location is compared by [`circle::Day`], then by [`circle::Wing`], then by
/// [`circle::Place`] code points. [`Item`]s of unknown [`Circle`]s go last.
/// Equal [`Item`]s preserve their order.
#[must_use]
pub fn sort_by_location<T: AsRef<Item>>(
    mut items: Vec<T>,
    circles: &[Circle],
) -> Vec<T> {
    let index = index(circles);
    items.sort_by_key(|i| {
        let location = index
            .get(&i.as_ref().circle_id)
            .map(|c| (c.day, c.wing, c.place.as_ref()));
        (location.is_none(), location)
    });
    items
}

/// Orders the provided [`Item`]s by the [`Priority`] of the [`User`]'s
/// requests.
///
/// [`Item`]s without any request of the [`User`] are dropped. Equal
/// [`Item`]s preserve their order in the [`Direction::Ascending`] one, so the
/// [`Direction::Descending`] one is its exact reverse.
///
/// [`Priority`]: crate::domain::item::Priority
/// [`User`]: crate::domain::User
#[must_use]
pub fn sort_by_priority<T: AsRef<Item>>(
    items: Vec<T>,
    user_id: user::Id,
    direction: Direction,
) -> Vec<T> {
    let mut items = items
        .into_iter()
        .filter_map(|i| {
            let priority = i.as_ref().request_of(user_id)?.priority;
            Some((priority, i))
        })
        .collect::<Vec<_>>();
    items.sort_by_key(|(p, _)| *p);
    if direction == Direction::Descending {
        items.reverse();
    }
    items.into_iter().map(|(_, i)| i).collect()
}

/// Direction of ordering.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
pub enum Direction {
    /// From the lowest to the highest.
    #[default]
    Ascending,

    /// From the highest to the lowest.
    Descending,
}

impl Direction {
    /// Returns the opposite [`Direction`].
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Key to order a [`User`]'s purchase list by.
///
/// [`User`]: crate::domain::User
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SortKey {
    /// [`sort_by_location()`].
    #[default]
    Location,

    /// [`sort_by_priority()`].
    Priority(Direction),
}

impl SortKey {
    /// Returns the [`SortKey`] to switch to once the priority ordering is
    /// requested again.
    ///
    /// Switches to the [`Direction::Ascending`] priority ordering first, and
    /// reverses it afterwards.
    #[must_use]
    pub const fn toggle_priority(self) -> Self {
        match self {
            Self::Location => Self::Priority(Direction::Ascending),
            Self::Priority(d) => Self::Priority(d.reversed()),
        }
    }

    /// Orders the provided [`Item`]s of the [`User`] by this [`SortKey`].
    ///
    /// [`User`]: crate::domain::User
    #[must_use]
    pub fn sort<T: AsRef<Item>>(
        self,
        items: Vec<T>,
        circles: &[Circle],
        user_id: user::Id,
    ) -> Vec<T> {
        match self {
            Self::Location => sort_by_location(items, circles),
            Self::Priority(d) => sort_by_priority(items, user_id, d),
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::{
        circle::{self, Day, Wing},
        item::{self, Count, Priority, PurchaseRequest},
        user, Circle, Item,
    };

    use super::{
        filter_active, sort_by_location, sort_by_priority, Deleted, Direction,
        Owner, SortKey,
    };

    fn circle(day: Day, wing: Wing, place: &str) -> Circle {
        Circle {
            id: circle::Id::new(),
            name: "サークル".into(),
            day,
            wing,
            place: place.into(),
            deleted: false,
        }
    }

    fn item(circle_id: circle::Id, requests: &[(user::Id, i32)]) -> Item {
        Item {
            id: item::Id::new(),
            circle_id,
            name: "本".into(),
            price: "500".parse().unwrap(),
            requests: requests
                .iter()
                .map(|(user_id, p)| PurchaseRequest {
                    user_id: *user_id,
                    count: Count::new(1).unwrap(),
                    priority: Priority::from(*p),
                })
                .collect(),
        }
    }

    fn ids<T: AsRef<Item>>(items: &[T]) -> Vec<item::Id> {
        items.iter().map(|i| i.as_ref().id).collect()
    }

    #[test]
    fn labels_owner() {
        let mut c = circle(Day::First, Wing::West, "a01");
        c.name = "ABC".into();

        assert_eq!(Owner::Active(c.clone()).label(), "ABC");
        assert_eq!(Owner::Deleted(c.clone()).label(), "ABC(削除済み)");
        assert_eq!(Owner::Missing.label(), "サークルが見つかりません");
        assert_eq!(
            Owner::Active(c).location_label().as_deref(),
            Some("1日目 西 a01"),
        );
        assert_eq!(Owner::Missing.location_label(), None);
    }

    #[test]
    fn filters_deleted_and_flags_missing() {
        let active = circle(Day::First, Wing::West, "a01");
        let mut deleted = circle(Day::First, Wing::West, "a02");
        deleted.deleted = true;
        let circles = vec![active.clone(), deleted.clone()];

        let items = vec![
            item(deleted.id, &[]),
            item(circle::Id::new(), &[]),
            item(active.id, &[]),
        ];

        let listed = filter_active(items.clone(), &circles, Deleted::Exclude);
        assert_eq!(ids(&listed), vec![items[1].id, items[2].id]);
        assert_eq!(listed[0].owner, Owner::Missing);
        assert_eq!(listed[1].owner, Owner::Active(active));

        let listed = filter_active(items.clone(), &circles, Deleted::Retain);
        assert_eq!(ids(&listed), ids(&items));
        assert_eq!(listed[0].owner, Owner::Deleted(deleted));
    }

    #[test]
    fn sorts_by_location() {
        let circles = vec![
            circle(Day::Second, Wing::West, "a01"),
            circle(Day::First, Wing::South, "a01"),
            circle(Day::First, Wing::West, "a02"),
            circle(Day::First, Wing::West, "a01"),
            circle(Day::First, Wing::East, "z99"),
        ];
        let unknown = item(circle::Id::new(), &[]);
        let items = vec![
            unknown.clone(),
            item(circles[0].id, &[]),
            item(circles[1].id, &[]),
            item(circles[2].id, &[]),
            item(circles[3].id, &[]),
            item(circles[4].id, &[]),
        ];

        let sorted = sort_by_location(items.clone(), &circles);

        assert_eq!(
            ids(&sorted),
            vec![
                items[4].id,
                items[3].id,
                items[5].id,
                items[2].id,
                items[1].id,
                unknown.id,
            ],
        );
        assert_eq!(sort_by_location(sorted.clone(), &circles), sorted);
    }

    #[test]
    fn sorts_by_location_stably() {
        let c = circle(Day::First, Wing::West, "a01");
        let items = vec![
            item(c.id, &[]),
            item(circle::Id::new(), &[]),
            item(c.id, &[]),
            item(circle::Id::new(), &[]),
        ];

        let sorted = sort_by_location(items.clone(), &[c]);

        assert_eq!(
            ids(&sorted),
            vec![items[0].id, items[2].id, items[1].id, items[3].id],
        );
    }

    #[test]
    fn sorts_by_priority() {
        let (me, other) = (user::Id::new(), user::Id::new());
        let c = circle::Id::new();
        let items = vec![
            item(c, &[(me, 3)]),
            item(c, &[(other, 1)]),
            item(c, &[(other, 0), (me, 1)]),
            item(c, &[(me, 3)]),
            item(c, &[(me, 2)]),
        ];

        let asc = sort_by_priority(items.clone(), me, Direction::Ascending);
        assert_eq!(
            ids(&asc),
            vec![items[2].id, items[4].id, items[0].id, items[3].id],
        );

        let mut desc = sort_by_priority(items, me, Direction::Descending);
        desc.reverse();
        assert_eq!(desc, asc);
    }

    #[test]
    fn toggles_sort_key() {
        let key = SortKey::default();
        assert_eq!(key, SortKey::Location);

        let key = key.toggle_priority();
        assert_eq!(key, SortKey::Priority(Direction::Ascending));

        let key = key.toggle_priority();
        assert_eq!(key, SortKey::Priority(Direction::Descending));

        let key = key.toggle_priority();
        assert_eq!(key, SortKey::Priority(Direction::Ascending));
    }
}
