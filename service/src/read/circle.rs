//! [`Circle`]-related read definitions.

use std::{collections::HashMap, hash::Hash};

use derive_more::From;

use crate::domain::{
    circle::{Day, Wing},
    Circle,
};

/// Compound filter selecting [`Circle`]s of the catalog.
///
/// Every field may be left unset by a partially filled search form. Such an
/// incomplete [`Condition`] matches nothing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Condition {
    /// Text the [`Circle`] name should contain. Empty text matches any name.
    pub name: Option<String>,

    /// Text the [`Circle`] place should contain. Empty text matches any
    /// place.
    pub place: Option<String>,

    /// [`Day`]s to be selected.
    pub days: Option<Toggles<Day>>,

    /// [`Wing`]s to be selected.
    pub wings: Option<Toggles<Wing>>,
}

impl Condition {
    /// Returns the [`Condition`] matching every [`Circle`].
    #[must_use]
    pub fn all() -> Self {
        Self {
            name: Some(String::new()),
            place: Some(String::new()),
            days: Some(Toggles::checked(Day::ALL.iter().copied())),
            wings: Some(Toggles::checked(Wing::ALL.iter().copied())),
        }
    }

    /// Checks whether the provided [`Circle`] satisfies this [`Condition`].
    #[must_use]
    pub fn matches(&self, circle: &Circle) -> bool {
        let (Some(name), Some(place), Some(days), Some(wings)) =
            (&self.name, &self.place, &self.days, &self.wings)
        else {
            return false;
        };

        (name.is_empty() || circle.name.as_ref().contains(name.as_str()))
            && days.is_on(circle.day)
            && wings.is_on(circle.wing)
            && (place.is_empty()
                || circle.place.as_ref().contains(place.as_str()))
    }
}

/// Set of checkboxes keyed by `K`.
///
/// A key without an entry is considered unchecked.
#[derive(Clone, Debug, Eq, From, PartialEq)]
pub struct Toggles<K: Eq + Hash>(HashMap<K, bool>);

impl<K: Eq + Hash> Toggles<K> {
    /// Creates new [`Toggles`] with only the provided `keys` checked.
    #[must_use]
    pub fn checked(keys: impl IntoIterator<Item = K>) -> Self {
        keys.into_iter().map(|k| (k, true)).collect()
    }

    /// Checks whether the provided `key` is checked.
    #[must_use]
    pub fn is_on(&self, key: K) -> bool {
        self.0.get(&key).copied().unwrap_or(false)
    }
}

impl<K: Eq + Hash> Default for Toggles<K> {
    fn default() -> Self {
        Self(HashMap::new())
    }
}

impl<K: Eq + Hash> FromIterator<(K, bool)> for Toggles<K> {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::{
        circle::{self, Day, Wing},
        Circle,
    };

    use super::{Condition, Toggles};

    fn circle(name: &str, day: Day, wing: Wing, place: &str) -> Circle {
        Circle {
            id: circle::Id::new(),
            name: name.into(),
            day,
            wing,
            place: place.into(),
            deleted: false,
        }
    }

    fn condition(name: &str, place: &str) -> Condition {
        Condition {
            name: Some(name.into()),
            place: Some(place.into()),
            ..Condition::all()
        }
    }

    #[test]
    fn matches_everything_by_default() {
        let all = Condition::all();

        for day in Day::ALL {
            for wing in Wing::ALL {
                assert!(all.matches(&circle("A", *day, *wing, "x1")));
            }
        }
    }

    #[test]
    fn matches_name_substring() {
        let c = circle("ABC", Day::First, Wing::West, "x1");

        assert!(condition("B", "").matches(&c));
        assert!(condition("ABC", "").matches(&c));
        assert!(!condition("D", "").matches(&c));
    }

    #[test]
    fn matches_case_sensitively() {
        let c = circle("ABC", Day::First, Wing::West, "ま42b");

        assert!(!condition("abc", "").matches(&c));
        assert!(!condition("", "42B").matches(&c));
        assert!(condition("", "42b").matches(&c));
    }

    #[test]
    fn matches_place_substring() {
        let c = circle("ABC", Day::First, Wing::West, "ま42b");

        assert!(condition("", "ま").matches(&c));
        assert!(!condition("", "み").matches(&c));
        assert!(condition("B", "42").matches(&c));
        assert!(!condition("D", "42").matches(&c));
    }

    #[test]
    fn requires_checked_day_and_wing() {
        let c = circle("A", Day::Second, Wing::South, "x1");

        let mut cond = Condition::all();
        cond.days = Some(
            [(Day::First, true), (Day::Second, false)].into_iter().collect(),
        );
        assert!(!cond.matches(&c));

        cond.days = Some(Toggles::checked([Day::Second]));
        assert!(cond.matches(&c));

        cond.wings = Some([(Wing::West, true)].into_iter().collect());
        assert!(!cond.matches(&c));

        cond.wings = Some(Toggles::default());
        assert!(!cond.matches(&c));
    }

    #[test]
    fn fails_closed_on_incomplete_condition() {
        let c = circle("A", Day::First, Wing::West, "x1");

        for cond in [
            Condition {
                name: None,
                ..Condition::all()
            },
            Condition {
                place: None,
                ..Condition::all()
            },
            Condition {
                days: None,
                ..Condition::all()
            },
            Condition {
                wings: None,
                ..Condition::all()
            },
        ] {
            assert!(!cond.matches(&c));
        }
    }
}
