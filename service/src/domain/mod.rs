//! Domain entities definitions.

pub mod booking;
pub mod guest;
pub mod room;

pub use self::{booking::Booking, guest::Guest, room::Room};
