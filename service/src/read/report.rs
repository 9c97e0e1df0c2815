//! Reporting read definitions.

use itertools::Itertools as _;

#[cfg(doc)]
use crate::domain::{item::PurchaseRequest, User};
use crate::domain::{
    circle,
    item::{self, Count, Priority},
    user, Circle, Item,
};

/// [`PurchaseRequest`] served first for a single [`Item`] of a [`Circle`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TopBuyer {
    /// ID of the [`Circle`] selling the [`Item`].
    pub circle_id: circle::Id,

    /// ID of the [`Item`].
    pub item_id: item::Id,

    /// ID of the requesting [`User`].
    pub user_id: user::Id,

    /// [`Count`] of requested units.
    pub count: Count,

    /// [`Priority`] of the [`PurchaseRequest`].
    pub priority: Priority,
}

/// Resolves the [`TopBuyer`] of every requested [`Item`].
///
/// Rows follow the order of the provided [`Circle`]s (deleted ones included),
/// and then the order of the [`Item`]s inside each [`Circle`]. [`Item`]s
/// without requests and [`Item`]s of unknown [`Circle`]s produce no rows.
#[must_use]
pub fn top_buyers(circles: &[Circle], items: &[Item]) -> Vec<TopBuyer> {
    let mut by_circle = items.iter().into_group_map_by(|i| i.circle_id);

    circles
        .iter()
        .filter_map(|c| by_circle.remove(&c.id))
        .flatten()
        .filter_map(|item| {
            let top = item.top_request()?;
            Some(TopBuyer {
                circle_id: item.circle_id,
                item_id: item.id,
                user_id: top.user_id,
                count: top.count,
                priority: top.priority,
            })
        })
        .collect()
}
