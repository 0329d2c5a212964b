//! [`Booking`] definitions.

pub mod cancellation;
pub mod price;
pub mod stay;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Date, DateTimeOf, Money, Percent};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{room, Guest};
#[cfg(doc)]
use crate::domain::Room;

pub use self::{
    cancellation::Policy as CancellationPolicy, price::Breakdown,
    stay::StayPeriod,
};

/// Reservation of a [`Room`] by a [`Guest`] for a [`StayPeriod`].
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// Human-facing sequential [`Number`] of this [`Booking`].
    ///
    /// Unique across all [`Booking`]s and never reused.
    pub number: Number,

    /// ID of the [`Room`] this [`Booking`] reserves.
    pub room_id: room::Id,

    /// [`Guest`] this [`Booking`] is made for.
    pub guest: Guest,

    /// [`StayPeriod`] of this [`Booking`].
    pub stay: StayPeriod,

    /// Indicator whether the [`Guest`] is a tourist.
    ///
    /// Tourists are exempt from VAT.
    pub is_tourist: bool,

    /// VAT rate applied when the prices of this [`Booking`] were derived.
    pub vat_rate: Percent,

    /// Price [`Breakdown`] of this [`Booking`].
    pub price: Breakdown,

    /// [`PaymentStatus`] of this [`Booking`].
    pub payment_status: PaymentStatus,

    /// Reason the [`Guest`] provided on cancellation, if any.
    pub cancellation_reason: Option<CancellationReason>,

    /// Fee charged on cancellation.
    ///
    /// Set only once this [`Booking`] is cancelled.
    pub cancellation_fee: Option<Money>,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Booking`] was confirmed, if it was.
    pub confirmed_at: Option<ConfirmationDateTime>,

    /// [`DateTime`] when this [`Booking`] was cancelled, if it was.
    pub cancelled_at: Option<CancellationDateTime>,
}

impl Booking {
    /// Returns [`Status`] of this [`Booking`] as of the provided day.
    #[must_use]
    pub fn status(&self, today: Date) -> Status {
        use Status as S;

        if self.cancelled_at.is_some() {
            return S::Cancelled;
        }
        if self.stay.has_ended(today) {
            return S::Completed;
        }
        if self.confirmed_at.is_some() {
            S::Confirmed
        } else {
            S::Pending
        }
    }

    /// Returns whether this [`Booking`] is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled_at.is_some()
    }

    /// Returns whether this [`Booking`] may still be edited as of the
    /// provided day (it is neither cancelled nor completed).
    #[must_use]
    pub fn is_editable(&self, today: Date) -> bool {
        !self.is_cancelled() && !self.stay.has_ended(today)
    }

    /// Returns whether this [`Booking`] makes its [`Room`] unavailable for
    /// other stays over its [`StayPeriod`].
    #[must_use]
    pub fn blocks_availability(&self) -> bool {
        !self.is_cancelled() && self.payment_status != PaymentStatus::Canceled
    }
}

/// ID of a [`Booking`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Human-facing sequential number of a [`Booking`].
///
/// Distinct from the internal [`struct@Id`]: assigned in increasing order
/// starting from [`Number::FIRST`], and never reused once assigned, even
/// after a cancellation.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Number(i32);

impl Number {
    /// [`Number`] assigned to the very first [`Booking`].
    pub const FIRST: Self = Self(1001);

    /// Returns the [`Number`] following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Status of a [`Booking`] stay.
///
/// Derived from the [`Booking`] state, not stored.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Status {
    /// The [`Booking`] awaits confirmation.
    Pending = 1,

    /// The [`Booking`] is confirmed.
    Confirmed = 2,

    /// The [`Booking`] is cancelled.
    Cancelled = 3,

    /// The stay is over.
    Completed = 4,
}

define_kind! {
    #[doc = "Payment status of a [`Booking`]."]
    enum PaymentStatus {
        #[doc = "Payment is awaited."]
        Pending = 1,

        #[doc = "Partially paid."]
        Partial = 2,

        #[doc = "Fully paid."]
        Paid = 3,

        #[doc = "Payment is canceled."]
        Canceled = 4,
    }
}

/// Reason a [`Guest`] provided when cancelling a [`Booking`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct CancellationReason(String);

impl CancellationReason {
    /// Creates a new [`CancellationReason`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `reason` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    /// Creates a new [`CancellationReason`] if the given `reason` is valid.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Option<Self> {
        let reason = reason.into();
        Self::check(&reason).then_some(Self(reason))
    }

    /// Checks whether the given `reason` is a valid [`CancellationReason`].
    fn check(reason: impl AsRef<str>) -> bool {
        let reason = reason.as_ref();
        reason.trim() == reason && !reason.is_empty() && reason.len() <= 512
    }
}

impl std::str::FromStr for CancellationReason {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `CancellationReason`")
    }
}

/// [`DateTime`] when a [`Booking`] was created.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

/// [`DateTime`] when a [`Booking`] was confirmed.
pub type ConfirmationDateTime = DateTimeOf<(Booking, unit::Confirmation)>;

/// [`DateTime`] when a [`Booking`] was cancelled.
pub type CancellationDateTime = DateTimeOf<(Booking, unit::Cancellation)>;

#[cfg(test)]
mod spec {
    use common::{money::Currency, Date, DateTime, Money, Percent};
    use rust_decimal::Decimal;

    use crate::domain::{guest, Guest};

    use super::{
        price, Booking, Id, Number, PaymentStatus, StayPeriod, Status,
    };

    fn date(s: &str) -> Date {
        Date::from_iso8601(s).unwrap()
    }

    fn booking() -> Booking {
        let stay = StayPeriod::new(date("2025-03-10"), date("2025-03-12"))
            .unwrap();
        let vat_rate = Percent::new(Decimal::from(18)).unwrap();
        let base = Money {
            amount: Decimal::from(350),
            currency: Currency::Ils,
        };
        Booking {
            id: Id::new(),
            number: Number::FIRST,
            room_id: crate::domain::room::Id::new(),
            guest: Guest {
                name: guest::Name::new("Dana Levi").unwrap(),
                email: guest::Email::new("dana@example.com").unwrap(),
                phone: guest::Phone::new("+972501234567").unwrap(),
            },
            stay,
            is_tourist: false,
            vat_rate,
            price: price::Breakdown::derive(
                price::Anchor::Base(base),
                stay.nights(),
                vat_rate,
                false,
            )
            .unwrap(),
            payment_status: PaymentStatus::Pending,
            cancellation_reason: None,
            cancellation_fee: None,
            created_at: DateTime::now().coerce(),
            confirmed_at: None,
            cancelled_at: None,
        }
    }

    #[test]
    fn number_sequence_starts_at_1001() {
        assert_eq!(Number::FIRST, Number::from(1001));
        assert_eq!(Number::from(1050).next(), Number::from(1051));
        assert_eq!(Number::FIRST.to_string(), "1001");
    }

    #[test]
    fn status_is_derived_from_state() {
        let mut b = booking();
        assert_eq!(b.status(date("2025-03-01")), Status::Pending);

        b.confirmed_at = Some(DateTime::now().coerce());
        assert_eq!(b.status(date("2025-03-01")), Status::Confirmed);

        // Day of check-out and later: the stay is over.
        assert_eq!(b.status(date("2025-03-12")), Status::Completed);
        assert_eq!(b.status(date("2025-04-01")), Status::Completed);
        // Last night still counts as an ongoing stay.
        assert_eq!(b.status(date("2025-03-11")), Status::Confirmed);

        b.cancelled_at = Some(DateTime::now().coerce());
        assert_eq!(b.status(date("2025-03-01")), Status::Cancelled);
        assert_eq!(b.status(date("2025-04-01")), Status::Cancelled);
    }

    #[test]
    fn blocks_availability_unless_canceled() {
        let mut b = booking();
        assert!(b.blocks_availability());

        b.payment_status = PaymentStatus::Canceled;
        assert!(!b.blocks_availability());

        b.payment_status = PaymentStatus::Paid;
        b.cancelled_at = Some(DateTime::now().coerce());
        assert!(!b.blocks_availability());
    }
}
