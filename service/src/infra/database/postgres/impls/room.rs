//! [`Room`]-related [`Database`] implementations.

use std::{collections::HashMap, str::FromStr as _};

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tracerr::Traced;

use crate::{
    domain::{room, Room},
    infra::{
        database::{
            self,
            postgres::{Connection, FuzzPattern},
            Postgres,
        },
        Database,
    },
    read,
};

impl<C, IDs> Database<Select<By<HashMap<room::Id, Room>, IDs>>> for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[room::Id]>,
{
    type Ok = HashMap<room::Id, Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<room::Id, Room>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[room::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT id, number, kind, \
                   base_price, currency, \
                   max_occupancy, \
                   created_at \
            FROM rooms \
            WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        let mut rooms: HashMap<room::Id, Room> = self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let id = row.get("id");
                (
                    id,
                    Room {
                        id,
                        number: row.get("number"),
                        kind: row.get("kind"),
                        base_price: Money {
                            amount: row.get("base_price"),
                            currency: row.get("currency"),
                        },
                        max_occupancy: u16::try_from(
                            row.get::<_, i32>("max_occupancy"),
                        )
                        .expect("`max_occupancy` overflow"),
                        special_prices: Vec::new(),
                        created_at: row.get("created_at"),
                    },
                )
            })
            .collect();

        const PRICES_SQL: &str = "\
            SELECT room_id, key, price, currency \
            FROM room_special_prices \
            WHERE room_id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            ORDER BY key";
        for row in self
            .query(PRICES_SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
        {
            let room_id: room::Id = row.get("room_id");
            let key = room::PriceKey::from_str(row.get("key"))
                .expect("`key` is validated on write");
            if let Some(r) = rooms.get_mut(&room_id) {
                r.special_prices.push(room::SpecialPrice {
                    key,
                    price: Money {
                        amount: row.get("price"),
                        currency: row.get("currency"),
                    },
                });
            }
        }

        Ok(rooms)
    }
}

impl<C> Database<Select<By<Option<Room>, room::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<room::Id, Room>, [room::Id; 1]>>,
        Ok = HashMap<room::Id, Room>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Room>, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Option<Room>, room::Number>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Room>, room::Id>>,
        Ok = Option<Room>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Room>, room::Number>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let number: room::Number = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM rooms \
            WHERE number = $1::VARCHAR \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[&number])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        self.execute(Select(By::new(row.get("id"))))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<Room>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(room): Insert<Room>,
    ) -> Result<Self::Ok, Self::Err> {
        let max_occupancy = i32::from(room.max_occupancy);

        // Plain `INSERT`: a `rooms_number_key` violation must surface, so
        // that an occupied room number is reported to the caller.
        const SQL: &str = "\
            INSERT INTO rooms (\
                id, number, kind, \
                base_price, currency, \
                max_occupancy, \
                created_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::INT2, \
                $4::NUMERIC, $5::INT2, \
                $6::INT4, \
                $7::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &room.id,
                &room.number,
                &room.kind,
                &room.base_price.amount,
                &room.base_price.currency,
                &max_occupancy,
                &room.created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

        replace_special_prices(self, &room).await
    }
}

impl<C> Database<Update<Room>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(room): Update<Room>,
    ) -> Result<Self::Ok, Self::Err> {
        let max_occupancy = i32::from(room.max_occupancy);

        const SQL: &str = "\
            UPDATE rooms \
            SET number = $2::VARCHAR, \
                kind = $3::INT2, \
                base_price = $4::NUMERIC, \
                currency = $5::INT2, \
                max_occupancy = $6::INT4 \
            WHERE id = $1::UUID";
        self.exec(
            SQL,
            &[
                &room.id,
                &room.number,
                &room.kind,
                &room.base_price.amount,
                &room.base_price.currency,
                &max_occupancy,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

        replace_special_prices(self, &room).await
    }
}

/// Replaces the `room_special_prices` rows of the provided [`Room`] with its
/// current [`room::SpecialPrice`]s.
async fn replace_special_prices<C: Connection>(
    db: &Postgres<C>,
    room: &Room,
) -> Result<(), Traced<database::Error>> {
    const DELETE_SQL: &str = "\
        DELETE FROM room_special_prices \
        WHERE room_id = $1::UUID";
    db.exec(DELETE_SQL, &[&room.id])
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

    const INSERT_SQL: &str = "\
        INSERT INTO room_special_prices (room_id, key, price, currency) \
        VALUES ($1::UUID, $2::VARCHAR, $3::NUMERIC, $4::INT2)";
    for special in &room.special_prices {
        let key = special.key.to_string();
        db.exec(
            INSERT_SQL,
            &[
                &room.id,
                &key,
                &special.price.amount,
                &special.price.currency,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;
    }

    Ok(())
}

impl<C> Database<Lock<By<Room, room::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Room, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: room::Id = by.into_inner();

        // `DO UPDATE` (unlike `DO NOTHING`) takes a row-level lock on the
        // existing lock row, serializing concurrent writers of the `Room`
        // until the transaction ends.
        const SQL: &str = "\
            INSERT INTO rooms_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE \
            SET id = rooms_lock.id";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<read::room::list::Page, read::room::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::room::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::room::list::Page, read::room::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::room::list::Selector {
            arguments,
            filter: read::room::list::Filter { number },
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit()).unwrap() + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });

        let number_pattern =
            number.as_ref().map(|n| FuzzPattern::new(n.as_ref()));
        let number_pattern_idx = number_pattern.as_ref().map(|n| {
            ps.push(n);
            ps.len()
        });

        let sql = format!(
            "SELECT id \
             FROM rooms \
             WHERE true \
                   {cursor} \
                   {number_filtering} \
             ORDER BY id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = arguments.kind().operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            order = arguments.kind().order().sql(),
            number_filtering =
                number_pattern_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(
                        "AND LOWER(number) SIMILAR TO LOWER(${idx}::VARCHAR)"
                    ))
                }),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .into_iter()
            .take(arguments.limit())
            .map(|row| {
                let id = row.get("id");
                (id, id)
            })
            .collect::<Vec<_>>();

        Ok(read::room::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::room::list::TotalCount, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::room::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::room::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM rooms";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i32>(0).into())
    }
}
