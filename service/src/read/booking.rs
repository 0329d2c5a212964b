//! [`Booking`]-related read definitions.

use derive_more::Deref;

use crate::domain::{booking, room};
#[cfg(doc)]
use crate::domain::Booking;

/// Stay proposed for a [`Room`], to be checked against existing [`Booking`]s.
///
/// [`Room`]: crate::domain::Room
#[derive(Clone, Copy, Debug)]
pub struct ProposedStay {
    /// ID of the [`Room`] the stay is proposed for.
    ///
    /// [`Room`]: crate::domain::Room
    pub room_id: room::Id,

    /// Proposed [`booking::StayPeriod`].
    pub stay: booking::StayPeriod,

    /// [`Booking`] to leave out of the check (when editing or moving an
    /// existing one).
    pub exclude: Option<booking::Id>,
}

/// IDs of the [`Booking`]s a [`ProposedStay`] collides with.
///
/// Empty means the [`Room`] is available for the whole proposed period.
///
/// [`Room`]: crate::domain::Room
#[derive(Clone, Debug, Default, Deref)]
pub struct Conflicts(pub Vec<booking::Id>);

impl Conflicts {
    /// Returns whether the proposed stay is conflict-free.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.0.is_empty()
    }
}

/// Next free human-facing [`booking::Number`].
#[derive(Clone, Copy, Debug, Deref, Eq, PartialEq)]
pub struct NextNumber(pub booking::Number);

pub mod list {
    //! [`Booking`]s list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::{booking, guest, room};
    #[cfg(doc)]
    use crate::domain::Booking;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = booking::Id;

    /// Cursor pointing to a specific [`Booking`] in a list.
    pub type Cursor = booking::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// ID of the [`Room`] to list [`Booking`]s of.
        ///
        /// [`Room`]: crate::domain::Room
        pub room_id: Option<room::Id>,

        /// [`guest::Name`] (or its part) to fuzzy search for.
        pub guest_name: Option<guest::Name>,
    }

    /// Total count of [`Booking`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}
