//! [`Command`] for cancelling a [`Booking`].

use std::error::Error;

use common::{
    operations::{By, Commit, Lock, Perform, Select, Transact, Transacted, Update},
    DateTime, Money,
};
use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{booking, room, Booking, Room},
    infra::{
        database,
        notifier::{Notification, Notifier},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for cancelling a [`Booking`].
#[derive(Clone, Debug)]
pub struct CancelBooking {
    /// ID of the [`Booking`] to be cancelled.
    pub booking_id: booking::Id,

    /// Reason of the cancellation, if provided.
    pub reason: Option<booking::CancellationReason>,

    /// Current time.
    ///
    /// Injected by the caller, so the fee evaluation is reproducible.
    pub now: DateTime,
}

/// Output of a [`CancelBooking`] [`Command`] execution.
#[derive(Clone, Debug)]
pub struct Output {
    /// Cancelled [`Booking`].
    pub booking: Booking,

    /// Fee charged for the cancellation.
    pub fee: Money,

    /// Indicator whether the [`Guest`] is refunded in full.
    ///
    /// [`Guest`]: crate::domain::Guest
    pub is_full_refund: bool,
}

impl<Db, N> Command<CancelBooking> for Service<Db, N>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<Lock<By<Booking, booking::Id>>, Err = Traced<database::Error>>
        + Database<Lock<By<Room, room::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    N: Notifier<Perform<Notification>, Ok = (), Err: Error>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CancelBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelBooking {
            booking_id,
            reason,
            now,
        } = cmd;
        let today = now.date();

        let booking = self
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        if booking.is_cancelled() {
            return Err(tracerr::new!(E::AlreadyCancelled(booking_id)));
        }
        // A stay already underway (or over) cannot be cancelled anymore.
        if booking.stay.has_started(today) {
            return Err(tracerr::new!(E::BookingNotCancellable(booking_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Room`.
        tx.execute(Lock(By::<Room, _>::new(booking.room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // Avoid concurrent cancellations.
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

        if booking.is_cancelled() {
            return Err(tracerr::new!(E::AlreadyCancelled(booking_id)));
        }
        if booking.stay.has_started(today) {
            return Err(tracerr::new!(E::BookingNotCancellable(booking_id)));
        }

        let outcome = self.config().cancellation_policy.evaluate(
            booking.stay.check_in(),
            today,
            booking.price.total,
        );

        booking.cancellation_fee = Some(outcome.fee);
        booking.cancellation_reason = reason;
        booking.cancelled_at = Some(now.coerce());

        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if let Err(e) = self
            .notifier()
            .execute(Perform(Notification::BookingCancelled {
                number: booking.number,
                fee: outcome.fee,
                email: booking.guest.email.clone(),
            }))
            .await
        {
            log::warn!("failed to notify about cancelled `Booking`: {e}");
        }

        Ok(Output {
            booking,
            fee: outcome.fee,
            is_full_refund: outcome.is_full_refund,
        })
    }
}

/// Error of [`CancelBooking`] [`Command`] execution.
#[derive(Debug, Display, From, StdError)]
pub enum ExecutionError {
    /// [`Booking`] is already cancelled.
    #[display("`Booking(id: {_0})` is already cancelled")]
    AlreadyCancelled(#[error(not(source))] booking::Id),

    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Booking`] stay is already underway or over.
    #[display("`Booking(id: {_0})` cannot be cancelled anymore")]
    BookingNotCancellable(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
