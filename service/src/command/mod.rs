//! [`Command`] definition.

pub mod cancel_booking;
pub mod confirm_booking;
pub mod create_booking;
pub mod create_room;
pub mod move_booking;
pub mod update_booking_price;
pub mod update_payment_status;
pub mod update_room_pricing;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    cancel_booking::CancelBooking, confirm_booking::ConfirmBooking,
    create_booking::CreateBooking, create_room::CreateRoom,
    move_booking::MoveBooking, update_booking_price::UpdateBookingPrice,
    update_payment_status::UpdatePaymentStatus,
    update_room_pricing::UpdateRoomPricing,
};
