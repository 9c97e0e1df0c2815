//! [`Item`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        item::{self, PurchaseRequest},
        Item,
    },
    infra::{
        database::{
            self,
            postgres::{self, Connection},
            Postgres,
        },
        Database,
    },
};

/// Reads an [`Item`] from the provided [`Row`] without its
/// [`PurchaseRequest`]s.
fn from_row(row: &Row) -> Item {
    Item {
        id: row.get("id"),
        circle_id: row.get("circle_id"),
        name: row.get("name"),
        price: row.get("price"),
        requests: vec![],
    }
}

/// Selects [`PurchaseRequest`]s of the [`Item`]s with the provided IDs, in
/// the order they were made.
async fn select_requests<C: Connection>(
    db: &Postgres<C>,
    ids: &[item::Id],
) -> Result<HashMap<item::Id, Vec<PurchaseRequest>>, Traced<database::Error>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    const SQL: &str = "\
        SELECT item_id, user_id, count, priority \
        FROM item_buyers \
        WHERE item_id = ANY($1::UUID[]) \
        ORDER BY item_id, position";
    let requests = db
        .query(SQL, &[&ids])
        .await
        .map_err(tracerr::wrap!())?
        .iter()
        .map(|row| {
            Ok((
                row.get::<_, item::Id>("item_id"),
                PurchaseRequest {
                    user_id: row.get("user_id"),
                    count: row.try_get("count")?,
                    priority: row.get("priority"),
                },
            ))
        })
        .collect::<Result<Vec<_>, postgres::connection::Error>>()
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)?;
    Ok(requests.into_iter().into_group_map())
}

impl<C> Database<Select<By<Vec<Item>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Item>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Item>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, circle_id, name, price \
            FROM items \
            ORDER BY position";
        let mut items = self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect::<Vec<_>>();

        let ids = items.iter().map(|i| i.id).collect::<Vec<_>>();
        let mut requests = select_requests(self, &ids)
            .await
            .map_err(tracerr::wrap!())?;
        for item in &mut items {
            item.requests = requests.remove(&item.id).unwrap_or_default();
        }
        Ok(items)
    }
}

impl<C> Database<Select<By<Option<Item>, item::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Item>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Item>, item::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: item::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, circle_id, name, price \
            FROM items \
            WHERE id = $1::UUID";
        let Some(mut item) = self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row)
        else {
            return Ok(None);
        };

        item.requests = select_requests(self, &[id])
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id)
            .unwrap_or_default();
        Ok(Some(item))
    }
}

impl<C> Database<Insert<Item>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Item>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(item): Insert<Item>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(item)).await.map_err(tracerr::wrap!())
    }
}

/// Stores the whole [`Item`] replacing all its [`PurchaseRequest`]s.
///
/// Should be executed inside a transaction to be atomic.
impl<C> Database<Update<Item>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(item): Update<Item>,
    ) -> Result<Self::Ok, Self::Err> {
        let Item {
            id,
            circle_id,
            name,
            price,
            requests,
        } = item;

        const UPSERT_SQL: &str = "\
            INSERT INTO items (id, circle_id, name, price) \
            VALUES ($1::UUID, $2::UUID, $3::VARCHAR, $4::NUMERIC) \
            ON CONFLICT (id) DO UPDATE \
            SET circle_id = EXCLUDED.circle_id, \
                name = EXCLUDED.name, \
                price = EXCLUDED.price";
        self.exec(UPSERT_SQL, &[&id, &circle_id, &name, &price])
            .await
            .map_err(tracerr::wrap!())?;

        const DELETE_SQL: &str = "\
            DELETE FROM item_buyers \
            WHERE item_id = $1::UUID";
        self.exec(DELETE_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?;
        if requests.is_empty() {
            return Ok(());
        }

        let positions = (0_i32..).take(requests.len()).collect::<Vec<_>>();
        let (user_ids, counts, priorities): (Vec<_>, Vec<_>, Vec<_>) =
            requests
                .iter()
                .map(|r| (r.user_id, r.count, r.priority))
                .multiunzip();

        const INSERT_SQL: &str = "\
            INSERT INTO item_buyers (\
                item_id, position, user_id, count, priority\
            ) \
            SELECT $1::UUID, * \
            FROM unnest(\
                $2::INT4[], $3::UUID[], $4::INT4[], $5::INT4[]\
            )";
        self.exec(
            INSERT_SQL,
            &[&id, &positions, &user_ids, &counts, &priorities],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Item, item::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Item, item::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: item::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO items_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE \
            SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
