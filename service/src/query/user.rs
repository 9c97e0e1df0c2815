//! [`Query`] collection related to a single [`User`].

use common::{
    operations::{By, Select},
    Price,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        item::{self, PurchaseRequest},
        user, Circle, Item, User,
    },
    infra::{database, Database},
    read::{
        circle::Condition,
        item::{self as read_item, Deleted, Owner, SortKey},
    },
    Query, Service,
};

use super::Lookup;

/// Queries a [`User`] by its [`user::Id`].
pub type ById = Lookup<By<Option<User>, user::Id>>;

/// [`Query`] assembling the purchase list of a [`User`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Detail {
    /// ID of the [`User`] whose purchase list is assembled.
    pub user_id: user::Id,

    /// [`SortKey`] to order the purchase list by.
    pub sort: SortKey,

    /// [`Condition`] the [`Circle`]s of the listed [`Item`]s should match,
    /// if any.
    pub condition: Option<Condition>,
}

/// Output of the [`Detail`] [`Query`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// [`User`] owning the purchase list.
    pub user: User,

    /// [`Row`]s of the purchase list.
    pub rows: Vec<Row>,

    /// Total [`Price`] of all the [`Row`]s.
    pub total: Price,
}

impl Output {
    /// Returns the number of [`Row`]s in this [`Output`].
    #[must_use]
    pub fn count(&self) -> usize {
        self.rows.len()
    }
}

/// Single [`Item`] of a purchase list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Row {
    /// Requested [`Item`].
    pub item: Item,

    /// [`Owner`] of the [`Item`].
    pub owner: Owner,

    /// [`PurchaseRequest`] of the [`User`] for the [`Item`].
    pub request: PurchaseRequest,

    /// [`Price`] of the whole [`PurchaseRequest`].
    pub subtotal: Price,
}

impl AsRef<Item> for Row {
    fn as_ref(&self) -> &Item {
        &self.item
    }
}

impl<Db> Query<Detail> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Item>, ()>>,
            Ok = Vec<Item>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Circle>, ()>>,
            Ok = Vec<Circle>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        Detail {
            user_id,
            sort,
            condition,
        }: Detail,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let user = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        let mut items = self
            .database()
            .execute(Select(By::<Vec<Item>, ()>::all()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        items.retain(|i| i.request_of(user_id).is_some());

        let circles = self
            .database()
            .execute(Select(By::<Vec<Circle>, ()>::all()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let rows = read_item::filter_active(items, &circles, Deleted::Exclude)
            .into_iter()
            .filter(|l| {
                condition.as_ref().map_or(true, |cond| {
                    l.owner.circle().is_some_and(|c| cond.matches(c))
                })
            })
            .filter_map(|read_item::Listed { item, owner }| {
                let request = *item.request_of(user_id)?;
                Some(match request.subtotal(item.price) {
                    Some(subtotal) => Ok(Row {
                        item,
                        owner,
                        request,
                        subtotal,
                    }),
                    None => Err(E::PriceOverflow(item.id)),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(tracerr::wrap!())?;
        let rows = sort.sort(rows, &circles, user_id);
        let total = Price::checked_sum(rows.iter().map(|r| r.subtotal))
            .ok_or(E::TotalOverflow(user_id))
            .map_err(tracerr::wrap!())?;

        Ok(Output { user, rows, total })
    }
}

/// Error of [`Detail`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`Price`] of the [`PurchaseRequest`] for the [`Item`] is not
    /// representable.
    #[display("`Item(id: {_0})` subtotal overflows")]
    #[from(ignore)]
    PriceOverflow(#[error(not(source))] item::Id),

    /// Total [`Price`] of the purchase list is not representable.
    #[display("Total of `User(id: {_0})` purchase list overflows")]
    #[from(ignore)]
    TotalOverflow(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::Price;

    use crate::{
        domain::{
            circle::{self, Day, Wing},
            user,
        },
        fixture,
        read::{
            circle::{Condition, Toggles},
            item::{Direction, Owner, SortKey},
        },
        Query as _,
    };

    use super::{Detail, ExecutionError};

    fn price(s: &str) -> Price {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn assembles_purchase_list() {
        let me = fixture::user("me");
        let other = fixture::user("other");
        let west = fixture::circle("West", Day::First, Wing::West, "a01");
        let east = fixture::circle("East", Day::First, Wing::East, "a01");
        let mut gone = fixture::circle("Gone", Day::First, Wing::West, "a00");
        gone.deleted = true;

        let items = vec![
            fixture::item(east.id, "1,000", &[(me.id, 2, 1)]),
            fixture::item(gone.id, "300", &[(me.id, 1, 2)]),
            fixture::item(circle::Id::new(), "500円", &[(me.id, 1, 3)]),
            fixture::item(west.id, "200", &[(other.id, 1, 1), (me.id, 3, 4)]),
            fixture::item(west.id, "9999", &[(other.id, 1, 1)]),
        ];
        let svc = fixture::service(
            vec![west.clone(), east.clone(), gone],
            items.clone(),
            vec![me.clone(), other],
        )
        .await;

        let out = svc
            .execute(Detail {
                user_id: me.id,
                sort: SortKey::Location,
                condition: None,
            })
            .await
            .unwrap();

        assert_eq!(out.user, me);
        assert_eq!(
            out.rows.iter().map(|r| r.item.id).collect::<Vec<_>>(),
            vec![items[3].id, items[0].id, items[2].id],
        );
        assert_eq!(out.rows[0].owner, Owner::Active(west));
        assert_eq!(out.rows[0].subtotal, price("600"));
        assert_eq!(out.rows[2].owner, Owner::Missing);
        assert_eq!(out.total, price("3100"));
        assert_eq!(out.count(), 3);
    }

    #[tokio::test]
    async fn orders_by_priority() {
        let me = fixture::user("me");
        let c = fixture::circle("C", Day::First, Wing::West, "a01");
        let items = vec![
            fixture::item(c.id, "100", &[(me.id, 1, 2)]),
            fixture::item(c.id, "100", &[(me.id, 1, 1)]),
            fixture::item(c.id, "100", &[(me.id, 1, 3)]),
        ];
        let svc =
            fixture::service(vec![c], items.clone(), vec![me.clone()]).await;

        for (direction, expected) in [
            (Direction::Ascending, [1, 0, 2]),
            (Direction::Descending, [2, 0, 1]),
        ] {
            let out = svc
                .execute(Detail {
                    user_id: me.id,
                    sort: SortKey::Priority(direction),
                    condition: None,
                })
                .await
                .unwrap();

            assert_eq!(
                out.rows.iter().map(|r| r.item.id).collect::<Vec<_>>(),
                expected.map(|i| items[i].id).to_vec(),
            );
        }
    }

    #[tokio::test]
    async fn restricts_by_circle_condition() {
        let me = fixture::user("me");
        let first = fixture::circle("A", Day::First, Wing::West, "a01");
        let second = fixture::circle("B", Day::Second, Wing::West, "a01");
        let items = vec![
            fixture::item(first.id, "100", &[(me.id, 1, 1)]),
            fixture::item(second.id, "100", &[(me.id, 1, 1)]),
            fixture::item(circle::Id::new(), "100", &[(me.id, 1, 1)]),
        ];
        let svc = fixture::service(
            vec![first, second],
            items.clone(),
            vec![me.clone()],
        )
        .await;

        let out = svc
            .execute(Detail {
                user_id: me.id,
                sort: SortKey::Location,
                condition: Some(Condition {
                    days: Some(Toggles::checked([Day::Second])),
                    ..Condition::all()
                }),
            })
            .await
            .unwrap();

        assert_eq!(
            out.rows.iter().map(|r| r.item.id).collect::<Vec<_>>(),
            vec![items[1].id],
        );
        assert_eq!(out.total, price("100"));
    }

    #[tokio::test]
    async fn fails_on_unknown_user() {
        let svc = fixture::service(vec![], vec![], vec![]).await;
        let id = user::Id::new();

        let err = svc
            .execute(Detail {
                user_id: id,
                sort: SortKey::default(),
                condition: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(u) if *u == id,
        ));
    }

    #[tokio::test]
    async fn fails_on_unrepresentable_prices() {
        let me = fixture::user("me");
        let c = fixture::circle("C", Day::First, Wing::West, "a01");
        let max = "79228162514264337593543950335";

        let doubled = fixture::item(c.id, max, &[(me.id, 2, 1)]);
        let svc = fixture::service(
            vec![c.clone()],
            vec![doubled.clone()],
            vec![me.clone()],
        )
        .await;
        let err = svc
            .execute(Detail {
                user_id: me.id,
                sort: SortKey::default(),
                condition: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::PriceOverflow(i) if *i == doubled.id,
        ));

        let svc = fixture::service(
            vec![c.clone()],
            vec![
                fixture::item(c.id, max, &[(me.id, 1, 1)]),
                fixture::item(c.id, max, &[(me.id, 1, 2)]),
            ],
            vec![me.clone()],
        )
        .await;
        let err = svc
            .execute(Detail {
                user_id: me.id,
                sort: SortKey::default(),
                condition: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::TotalOverflow(u) if *u == me.id,
        ));
    }
}
