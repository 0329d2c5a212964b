//! [`Command`] for re-deriving the prices of a [`Booking`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Date,
};
use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;

use crate::{
    domain::{
        booking::{self, price},
        Booking,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for re-deriving the prices of a [`Booking`] from a single
/// changed [`price::Anchor`] field.
///
/// The remaining two price fields are always recomputed: the three never get
/// out of sync with each other.
#[derive(Clone, Copy, Debug)]
pub struct UpdateBookingPrice {
    /// ID of the [`Booking`] to be re-priced.
    pub booking_id: booking::Id,

    /// Changed price field to derive the others from.
    pub anchor: price::Anchor,
}

impl<Db, N> Command<UpdateBookingPrice> for Service<Db, N>
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
        cmd: UpdateBookingPrice,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateBookingPrice { booking_id, anchor } = cmd;
        let today = Date::today_utc();

        let booking = self
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        if !booking.is_editable(today) {
            return Err(tracerr::new!(E::BookingNotEditable(booking_id)));
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

        if !booking.is_editable(today) {
            return Err(tracerr::new!(E::BookingNotEditable(booking_id)));
        }

        // Re-derive with the VAT rate recorded on the `Booking`, so an edit
        // never silently switches the rate that was in force at creation.
        booking.price = booking::Breakdown::derive(
            anchor,
            booking.stay.nights(),
            booking.vat_rate,
            booking.is_tourist,
        )
        .map_err(E::InvalidPriceInput)
        .map_err(tracerr::wrap!())?;

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

/// Error of [`UpdateBookingPrice`] [`Command`] execution.
#[derive(Debug, Display, From, StdError)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Booking`] is cancelled or completed and cannot be edited.
    #[display("`Booking(id: {_0})` cannot be edited anymore")]
    BookingNotEditable(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided price input cannot be derived from.
    #[display("{_0}")]
    InvalidPriceInput(price::InvalidPriceInput),
}
