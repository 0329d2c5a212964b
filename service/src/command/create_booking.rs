//! [`Command`] for creating a new [`Booking`].

use std::error::Error;

use common::{
    operations::{By, Commit, Insert, Lock, Perform, Select, Transact, Transacted},
    Date, DateTime,
};
use derive_more::{Display, Error as StdError, From};
use itertools::Itertools as _;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        booking::{self, price, stay},
        room, Booking, Guest, Room,
    },
    infra::{
        database,
        notifier::{Notification, Notifier},
        Database,
    },
    read,
    Service,
};

use super::Command;

/// Number of attempts to assign a unique [`booking::Number`] before giving
/// up.
const MAX_NUMBER_ATTEMPTS: u32 = 3;

/// [`Command`] for creating a new [`Booking`].
#[derive(Clone, Debug)]
pub struct CreateBooking {
    /// ID of the [`Room`] to book.
    pub room_id: room::Id,

    /// [`Guest`] the [`Booking`] is made for.
    pub guest: Guest,

    /// Day the [`Guest`] checks in.
    pub check_in: Date,

    /// Day the [`Guest`] checks out.
    pub check_out: Date,

    /// Price [`price::Anchor`] to derive the [`Booking`] prices from.
    pub anchor: price::Anchor,

    /// Indicator whether the [`Guest`] is a tourist (VAT-exempt).
    pub is_tourist: bool,
}

impl<Db, N> Command<CreateBooking> for Service<Db, N>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Room>, room::Id>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<Lock<By<Room, room::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<read::booking::Conflicts, read::booking::ProposedStay>>,
            Ok = read::booking::Conflicts,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::booking::NextNumber, ()>>,
            Ok = read::booking::NextNumber,
            Err = Traced<database::Error>,
        > + Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    N: Notifier<Perform<Notification>, Ok = (), Err: Error>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            room_id,
            guest,
            check_in,
            check_out,
            anchor,
            is_tourist,
        } = cmd;

        let stay = booking::StayPeriod::new(check_in, check_out)
            .map_err(E::InvalidDateRange)
            .map_err(tracerr::wrap!())?;

        let room = self
            .database()
            .execute(Select(By::<Option<Room>, _>::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(room_id))
            .map_err(tracerr::wrap!())?;

        let vat_rate = self.config().vat_rate;
        let price =
            booking::Breakdown::derive(anchor, stay.nights(), vat_rate, is_tourist)
                .map_err(E::InvalidPriceInput)
                .map_err(tracerr::wrap!())?;

        for _ in 0..MAX_NUMBER_ATTEMPTS {
            let tx = self
                .database()
                .execute(Transact)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;

            // Avoid concurrent actions upon the same `Room`.
            tx.execute(Lock(By::new(room.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            let conflicts = tx
                .execute(Select(By::<read::booking::Conflicts, _>::new(
                    read::booking::ProposedStay {
                        room_id: room.id,
                        stay,
                        exclude: None,
                    },
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if !conflicts.is_available() {
                return Err(tracerr::new!(E::RoomUnavailable {
                    room_id: room.id,
                    conflicts: conflicts.0,
                }));
            }

            let read::booking::NextNumber(number) = tx
                .execute(Select(By::<read::booking::NextNumber, _>::new(())))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;

            let created = Booking {
                id: booking::Id::new(),
                number,
                room_id: room.id,
                guest: guest.clone(),
                stay,
                is_tourist,
                vat_rate,
                price,
                payment_status: booking::PaymentStatus::Pending,
                cancellation_reason: None,
                cancellation_fee: None,
                created_at: DateTime::now().coerce(),
                confirmed_at: None,
                cancelled_at: None,
            };
            if let Err(e) = tx.execute(Insert(created.clone())).await {
                // Another creation took the same number first: retry with a
                // fresh maximum.
                if e.as_ref().is_unique_violation(Some("bookings_number_key"))
                {
                    log::debug!(
                        "`booking::Number({number})` is already assigned, \
                         retrying",
                    );
                    continue;
                }
                return Err(e).map_err(tracerr::map_from_and_wrap!(=> E));
            }

            tx.execute(Commit)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            if let Err(e) = self
                .notifier()
                .execute(Perform(Notification::BookingCreated {
                    number: created.number,
                    email: created.guest.email.clone(),
                }))
                .await
            {
                log::warn!("failed to notify about created `Booking`: {e}");
            }

            return Ok(created);
        }

        Err(tracerr::new!(E::NumberAssignment {
            attempts: MAX_NUMBER_ATTEMPTS,
        }))
    }
}

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, From, StdError)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided check-in/check-out dates are misordered.
    #[display("{_0}")]
    InvalidDateRange(stay::InvalidDateRange),

    /// Provided price input cannot be derived from.
    #[display("{_0}")]
    InvalidPriceInput(price::InvalidPriceInput),

    /// Failed to assign a unique [`booking::Number`].
    #[display(
        "failed to assign a unique `booking::Number` in {attempts} attempts"
    )]
    NumberAssignment {
        /// Number of attempts made.
        attempts: u32,
    },

    /// [`Room`] with the provided ID does not exist.
    #[display("`Room(id: {_0})` does not exist")]
    RoomNotExists(#[error(not(source))] room::Id),

    /// [`Room`] is already booked over the requested period.
    #[display(
        "`Room(id: {room_id})` is unavailable: conflicting bookings [{}]",
        conflicts.iter().format(", ")
    )]
    RoomUnavailable {
        /// ID of the unavailable [`Room`].
        room_id: room::Id,

        /// [`Booking`]s conflicting with the requested period.
        conflicts: Vec<booking::Id>,
    },
}
