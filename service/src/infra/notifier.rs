//! [`Notifier`]-related implementations.

use std::convert::Infallible;

use common::{operations::Perform, Money};
use tracing as log;

use crate::domain::{booking, guest};
#[cfg(doc)]
use crate::domain::Booking;

/// Outbound notification collaborator.
///
/// Delivery is best-effort: operations fire notifications after committing
/// and only log failures, never failing the operation itself.
pub use common::Handler as Notifier;

/// Notification about a [`Booking`] event.
#[derive(Clone, Debug)]
pub enum Notification {
    /// A new [`Booking`] was created.
    BookingCreated {
        /// [`booking::Number`] of the created [`Booking`].
        number: booking::Number,

        /// [`guest::Email`] to notify.
        email: guest::Email,
    },

    /// A [`Booking`] was cancelled.
    BookingCancelled {
        /// [`booking::Number`] of the cancelled [`Booking`].
        number: booking::Number,

        /// Fee charged for the cancellation.
        fee: Money,

        /// [`guest::Email`] to notify.
        email: guest::Email,
    },
}

/// [`Notifier`] writing notifications to the structured log.
///
/// Stands in for a real mailer: carries the same seam, so swapping in an
/// SMTP-backed implementation is a matter of providing another
/// [`Notifier`] to the [`Service`].
///
/// [`Service`]: crate::Service
#[derive(Clone, Copy, Debug, Default)]
pub struct Log;

impl Notifier<Perform<Notification>> for Log {
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Perform(notification): Perform<Notification>,
    ) -> Result<Self::Ok, Self::Err> {
        match notification {
            Notification::BookingCreated { number, email } => {
                log::info!("`Booking(number: {number})` created, \
                            notifying `{email}`");
            }
            Notification::BookingCancelled { number, fee, email } => {
                log::info!("`Booking(number: {number})` cancelled \
                            with a {fee} fee, notifying `{email}`");
            }
        }
        Ok(())
    }
}
