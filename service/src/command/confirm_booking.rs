//! [`Command`] for confirming a pending [`Booking`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Date, DateTime,
};
use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;

use crate::{
    domain::{booking, Booking},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for confirming a pending [`Booking`].
#[derive(Clone, Copy, Debug)]
pub struct ConfirmBooking {
    /// ID of the [`Booking`] to be confirmed.
    pub booking_id: booking::Id,
}

impl<Db, N> Command<ConfirmBooking> for Service<Db, N>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<Lock<By<Booking, booking::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ConfirmBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ConfirmBooking { booking_id } = cmd;
        let today = Date::today_utc();

        let booking = self
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        if booking.status(today) != booking::Status::Pending {
            return Err(tracerr::new!(E::BookingNotPending(booking_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent edits of the same `Booking`.
        tx.execute(Lock(By::new(booking.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        if booking.status(today) != booking::Status::Pending {
            return Err(tracerr::new!(E::BookingNotPending(booking_id)));
        }

        booking.confirmed_at = Some(DateTime::now().coerce());

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

/// Error of [`ConfirmBooking`] [`Command`] execution.
#[derive(Debug, Display, From, StdError)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Booking`] is not pending a confirmation.
    #[display("`Booking(id: {_0})` is not pending a confirmation")]
    BookingNotPending(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
