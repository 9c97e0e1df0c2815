//! [`Circle`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{circle, Circle},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Reads a [`Circle`] from the provided [`Row`].
fn from_row(row: &Row) -> Circle {
    Circle {
        id: row.get("id"),
        name: row.get("name"),
        day: row.get("day"),
        wing: row.get("wing"),
        place: row.get("place"),
        deleted: row.get("deleted"),
    }
}

impl<C> Database<Select<By<Vec<Circle>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Circle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Circle>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, name, day, wing, place, deleted \
            FROM circles \
            ORDER BY position";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Option<Circle>, circle::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Circle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Circle>, circle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: circle::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, day, wing, place, deleted \
            FROM circles \
            WHERE id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<Circle>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(circle): Insert<Circle>,
    ) -> Result<Self::Ok, Self::Err> {
        let Circle {
            id,
            name,
            day,
            wing,
            place,
            deleted,
        } = circle;

        const SQL: &str = "\
            INSERT INTO circles (id, name, day, wing, place, deleted) \
            VALUES (\
                $1::UUID, $2::VARCHAR, \
                $3::INT2, $4::INT2, $5::VARCHAR, \
                $6::BOOLEAN\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                day = EXCLUDED.day, \
                wing = EXCLUDED.wing, \
                place = EXCLUDED.place, \
                deleted = EXCLUDED.deleted";
        self.exec(SQL, &[&id, &name, &day, &wing, &place, &deleted])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
