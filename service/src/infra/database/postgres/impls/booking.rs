//! [`Booking`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tracerr::Traced;

use crate::{
    domain::{booking, Booking, Guest},
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

/// Columns selected for materializing a [`Booking`].
const COLUMNS: &str = "\
    id, number, room_id, \
    guest_name, guest_email, guest_phone, \
    check_in, check_out, \
    is_tourist, vat_rate, \
    base_price, price_per_night, total_price, currency, \
    payment_status, \
    cancellation_reason, cancellation_fee, \
    created_at, confirmed_at, cancelled_at";

/// Materializes a [`Booking`] out of the provided row.
fn from_row(row: &tokio_postgres::Row) -> Booking {
    let currency = row.get("currency");
    let money = |column: &str| Money {
        amount: row.get(column),
        currency,
    };

    #[expect(unsafe_code, reason = "dates are validated before insertion")]
    let stay = unsafe {
        booking::StayPeriod::new_unchecked(
            row.get("check_in"),
            row.get("check_out"),
        )
    };
    Booking {
        id: row.get("id"),
        number: row.get("number"),
        room_id: row.get("room_id"),
        guest: Guest {
            name: row.get("guest_name"),
            email: row.get("guest_email"),
            phone: row.get("guest_phone"),
        },
        stay,
        is_tourist: row.get("is_tourist"),
        vat_rate: row.get("vat_rate"),
        price: booking::Breakdown {
            base: money("base_price"),
            per_night: money("price_per_night"),
            total: money("total_price"),
        },
        payment_status: row.get("payment_status"),
        cancellation_reason: row.get("cancellation_reason"),
        cancellation_fee: row
            .get::<_, Option<_>>("cancellation_fee")
            .map(|amount| Money { amount, currency }),
        created_at: row.get("created_at"),
        confirmed_at: row.get("confirmed_at"),
        cancelled_at: row.get("cancelled_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<booking::Id, Booking>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[booking::Id]>,
{
    type Ok = HashMap<booking::Id, Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<booking::Id, Booking>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[booking::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
             WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
             LIMIT $2::INT4",
        );
        Ok(self
            .query(&sql, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let booking = from_row(&row);
                (booking.id, booking)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Booking>, booking::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<booking::Id, Booking>, [booking::Id; 1]>>,
        Ok = HashMap<booking::Id, Booking>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            number,
            room_id,
            guest: Guest { name, email, phone },
            stay,
            is_tourist,
            vat_rate,
            price,
            payment_status,
            cancellation_reason,
            cancellation_fee,
            created_at,
            confirmed_at,
            cancelled_at,
        } = booking;

        let check_in = stay.check_in();
        let check_out = stay.check_out();
        let cancellation_fee = cancellation_fee.map(|f| f.amount);

        // Plain `INSERT`: a `bookings_number_key` violation must surface, so
        // that number assignment can be retried with a fresh maximum.
        const SQL: &str = "\
            INSERT INTO bookings (\
                id, number, room_id, \
                guest_name, guest_email, guest_phone, \
                check_in, check_out, \
                is_tourist, vat_rate, \
                base_price, price_per_night, total_price, currency, \
                payment_status, \
                cancellation_reason, cancellation_fee, \
                created_at, confirmed_at, cancelled_at \
            ) VALUES (\
                $1::UUID, $2::INT4, $3::UUID, \
                $4::VARCHAR, $5::VARCHAR, $6::VARCHAR, \
                $7::DATE, $8::DATE, \
                $9::BOOL, $10::NUMERIC, \
                $11::NUMERIC, $12::NUMERIC, $13::NUMERIC, $14::INT2, \
                $15::INT2, \
                $16::VARCHAR, $17::NUMERIC, \
                $18::TIMESTAMPTZ, $19::TIMESTAMPTZ, $20::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &number,
                &room_id,
                &name,
                &email,
                &phone,
                &check_in,
                &check_out,
                &is_tourist,
                &vat_rate,
                &price.base.amount,
                &price.per_night.amount,
                &price.total.amount,
                &price.total.currency,
                &payment_status,
                &cancellation_reason,
                &cancellation_fee,
                &created_at,
                &confirmed_at,
                &cancelled_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            number: _,
            room_id,
            guest: Guest { name, email, phone },
            stay,
            is_tourist,
            vat_rate,
            price,
            payment_status,
            cancellation_reason,
            cancellation_fee,
            created_at: _,
            confirmed_at,
            cancelled_at,
        } = booking;

        let check_in = stay.check_in();
        let check_out = stay.check_out();
        let cancellation_fee = cancellation_fee.map(|f| f.amount);

        // `number` and `created_at` are immutable once assigned.
        const SQL: &str = "\
            UPDATE bookings \
            SET room_id = $2::UUID, \
                guest_name = $3::VARCHAR, \
                guest_email = $4::VARCHAR, \
                guest_phone = $5::VARCHAR, \
                check_in = $6::DATE, \
                check_out = $7::DATE, \
                is_tourist = $8::BOOL, \
                vat_rate = $9::NUMERIC, \
                base_price = $10::NUMERIC, \
                price_per_night = $11::NUMERIC, \
                total_price = $12::NUMERIC, \
                currency = $13::INT2, \
                payment_status = $14::INT2, \
                cancellation_reason = $15::VARCHAR, \
                cancellation_fee = $16::NUMERIC, \
                confirmed_at = $17::TIMESTAMPTZ, \
                cancelled_at = $18::TIMESTAMPTZ \
            WHERE id = $1::UUID";
        self.exec(
            SQL,
            &[
                &id,
                &room_id,
                &name,
                &email,
                &phone,
                &check_in,
                &check_out,
                &is_tourist,
                &vat_rate,
                &price.base.amount,
                &price.per_night.amount,
                &price.total.amount,
                &price.total.currency,
                &payment_status,
                &cancellation_reason,
                &cancellation_fee,
                &confirmed_at,
                &cancelled_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Booking, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        // `DO UPDATE` (unlike `DO NOTHING`) takes a row-level lock on the
        // existing lock row, serializing concurrent writers of the `Booking`
        // until the transaction ends.
        const SQL: &str = "\
            INSERT INTO bookings_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE \
            SET id = bookings_lock.id";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<Select<By<read::booking::Conflicts, read::booking::ProposedStay>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::Conflicts;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::booking::Conflicts, read::booking::ProposedStay>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::ProposedStay {
            room_id,
            stay,
            exclude,
        } = by.into_inner();

        let check_in = stay.check_in();
        let check_out = stay.check_out();

        // Half-open `[check_in, check_out)` intersection: a stay checking out
        // the day another checks in does not conflict.
        const SQL: &str = "\
            SELECT id \
            FROM bookings \
            WHERE room_id = $1::UUID \
              AND cancelled_at IS NULL \
              AND payment_status <> $2::INT2 \
              AND check_in < $4::DATE \
              AND check_out > $3::DATE \
              AND ($5::UUID IS NULL OR id <> $5::UUID) \
            ORDER BY check_in";
        Ok(read::booking::Conflicts(
            self.query(
                SQL,
                &[
                    &room_id,
                    &booking::PaymentStatus::Canceled,
                    &check_in,
                    &check_out,
                    &exclude,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect(),
        ))
    }
}

impl<C> Database<Select<By<read::booking::NextNumber, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::NextNumber;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::booking::NextNumber, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COALESCE(MAX(number) + 1, $1::INT4) AS next \
            FROM bookings";
        self.query_opt(SQL, &[&booking::Number::FIRST])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| {
                read::booking::NextNumber(
                    row.expect("always exists").get("next"),
                )
            })
    }
}

impl<C>
    Database<
        Select<By<read::booking::list::Page, read::booking::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::booking::list::Page, read::booking::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::list::Selector {
            arguments,
            filter:
                read::booking::list::Filter {
                    room_id,
                    guest_name,
                },
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit()).unwrap() + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let room_idx = room_id.as_ref().map(|r| {
            ps.push(r);
            ps.len()
        });
        let name_idx = guest_name.as_ref().map(|n| {
            ps.push(n);
            ps.len()
        });

        let name_pattern =
            guest_name.as_ref().map(|n| FuzzPattern::new(n.as_ref()));
        let name_pattern_idx = name_pattern.as_ref().map(|n| {
            ps.push(n);
            ps.len()
        });

        let sql = format!(
            "SELECT id \
             FROM bookings \
             WHERE true \
                   {cursor} \
                   {room_filtering} \
                   {name_filtering} \
             ORDER BY {name_ordering} \
                      id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = arguments.kind().operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            order = arguments.kind().order().sql(),
            room_filtering =
                room_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND room_id = ${idx}::UUID"))
                }),
            name_filtering =
                name_pattern_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(
                        "AND LOWER(guest_name) SIMILAR TO \
                         LOWER(${idx}::VARCHAR)"
                    ))
                }),
            name_ordering = name_idx.into_iter().format_with("", |idx, f| {
                let order = arguments.kind().order().sql();
                f(&format_args!(
                    "LEVENSHTEIN(guest_name, ${idx}::VARCHAR, 1, 1, 0) \
                     {order},"
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

        Ok(read::booking::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::booking::list::TotalCount, ()>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::booking::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM bookings";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i32>(0).into())
    }
}

impl<C> Database<Update<By<Booking, booking::CreationDateTime>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(by): Update<By<Booking, booking::CreationDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        let deadline: booking::CreationDateTime = by.into_inner();

        // Releases stale holds: unconfirmed bookings created before the
        // deadline are cancelled free of charge, unless their stay has
        // already started.
        const SQL: &str = "\
            UPDATE bookings \
            SET cancelled_at = NOW(), \
                cancellation_fee = 0 \
            WHERE confirmed_at IS NULL \
              AND cancelled_at IS NULL \
              AND created_at < $1::TIMESTAMPTZ \
              AND check_in > CURRENT_DATE";
        self.exec(SQL, &[&deadline])
            .await
            .map_err(tracerr::wrap!())
    }
}
