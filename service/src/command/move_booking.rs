//! [`Command`] for moving a [`Booking`] to another [`Room`] and/or start
//! day.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Date,
};
use derive_more::{Display, Error as StdError, From};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{booking, room, Booking, Room},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for moving a [`Booking`] to another [`Room`] and/or start
/// day.
///
/// The server side of a calendar drag-and-drop: the stay is shifted so it
/// starts on the target day, preserving its nights, and is re-validated
/// against the target [`Room`] before anything is written. On a conflict
/// nothing is committed, so the calendar can simply revert the move.
#[derive(Clone, Copy, Debug)]
pub struct MoveBooking {
    /// ID of the [`Booking`] to be moved.
    pub booking_id: booking::Id,

    /// ID of the [`Room`] the [`Booking`] is moved to.
    ///
    /// May be the same [`Room`] the [`Booking`] is already in.
    pub target_room_id: room::Id,

    /// Day the moved stay starts on.
    pub target_date: Date,
}

impl<Db, N> Command<MoveBooking> for Service<Db, N>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Room>, room::Id>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<Lock<By<Room, room::Id>>, Err = Traced<database::Error>>
        + Database<Lock<By<Booking, booking::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::booking::Conflicts, read::booking::ProposedStay>>,
            Ok = read::booking::Conflicts,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: MoveBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MoveBooking {
            booking_id,
            target_room_id,
            target_date,
        } = cmd;
        let today = Date::today_utc();

        let booking = self
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        if !booking.is_editable(today) {
            return Err(tracerr::new!(E::BookingNotMovable(booking_id)));
        }

        let target_room = self
            .database()
            .execute(Select(By::<Option<Room>, _>::new(target_room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(target_room_id))
            .map_err(tracerr::wrap!())?;

        let moved_stay = booking
            .stay
            .shift_to(target_date)
            .ok_or(E::TargetDateOutOfRange(target_date))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the involved `Room`s.
        tx.execute(Lock(By::<Room, _>::new(target_room.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        if booking.room_id != target_room.id {
            tx.execute(Lock(By::<Room, _>::new(booking.room_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        // Avoid concurrent edits of the same `Booking`.
        tx.execute(Lock(By::<Booking, _>::new(booking.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        if !booking.is_editable(today) {
            return Err(tracerr::new!(E::BookingNotMovable(booking_id)));
        }

        let conflicts = tx
            .execute(Select(By::<read::booking::Conflicts, _>::new(
                read::booking::ProposedStay {
                    room_id: target_room.id,
                    stay: moved_stay,
                    exclude: Some(booking.id),
                },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !conflicts.is_available() {
            return Err(tracerr::new!(E::RoomUnavailable {
                room_id: target_room.id,
                conflicts: conflicts.0,
            }));
        }

        booking.room_id = target_room.id;
        booking.stay = moved_stay;

        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(booking)
    }
}

/// Error of [`MoveBooking`] [`Command`] execution.
#[derive(Debug, Display, From, StdError)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Booking`] is cancelled or completed and cannot be moved.
    #[display("`Booking(id: {_0})` cannot be moved anymore")]
    BookingNotMovable(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Room`] with the provided ID does not exist.
    #[display("`Room(id: {_0})` does not exist")]
    RoomNotExists(#[error(not(source))] room::Id),

    /// [`Room`] is already booked over the moved period.
    #[display(
        "`Room(id: {room_id})` is unavailable: conflicting bookings [{}]",
        conflicts.iter().format(", ")
    )]
    RoomUnavailable {
        /// ID of the unavailable [`Room`].
        room_id: room::Id,

        /// [`Booking`]s conflicting with the moved period.
        conflicts: Vec<booking::Id>,
    },

    /// Moved stay does not fit the supported dates range.
    #[display("target date {_0} is out of the supported range")]
    TargetDateOutOfRange(#[error(not(source))] Date),
}
