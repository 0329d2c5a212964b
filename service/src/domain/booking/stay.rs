//! [`StayPeriod`] definitions.

use common::Date;
use derive_more::{Display, Error};

#[cfg(doc)]
use crate::domain::{Booking, Room};

/// Half-open `[check_in, check_out)` period of a [`Booking`].
///
/// The check-out day itself is not a night spent in the [`Room`]: a stay
/// checking out on some day does not collide with another stay checking in
/// on that same day.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StayPeriod {
    /// Day the [`Guest`] checks in.
    ///
    /// [`Guest`]: crate::domain::Guest
    check_in: Date,

    /// Day the [`Guest`] checks out.
    ///
    /// Always strictly after [`StayPeriod::check_in`].
    ///
    /// [`Guest`]: crate::domain::Guest
    check_out: Date,
}

impl StayPeriod {
    /// Creates a new [`StayPeriod`] by checking the provided dates are
    /// strictly ordered.
    ///
    /// # Errors
    ///
    /// If `check_out` is not strictly after `check_in`.
    pub fn new(
        check_in: Date,
        check_out: Date,
    ) -> Result<Self, InvalidDateRange> {
        if check_out <= check_in {
            return Err(InvalidDateRange {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Creates a new [`StayPeriod`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `check_out` is strictly after `check_in`.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(check_in: Date, check_out: Date) -> Self {
        Self {
            check_in,
            check_out,
        }
    }

    /// Returns the check-in [`Date`] of this [`StayPeriod`].
    #[must_use]
    pub fn check_in(&self) -> Date {
        self.check_in
    }

    /// Returns the check-out [`Date`] of this [`StayPeriod`].
    #[must_use]
    pub fn check_out(&self) -> Date {
        self.check_out
    }

    /// Returns the number of nights this [`StayPeriod`] spans.
    ///
    /// Always at least `1`.
    #[expect(
        clippy::missing_panics_doc,
        reason = "dates ordering is a construction invariant"
    )]
    #[must_use]
    pub fn nights(&self) -> u32 {
        u32::try_from(self.check_out - self.check_in)
            .expect("`check_out` is after `check_in`")
    }

    /// Returns whether this [`StayPeriod`] shares at least one night with the
    /// `other` one.
    ///
    /// Touching periods (one checking out the day the other checks in) do not
    /// overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    /// Returns this [`StayPeriod`] moved to start on the provided `check_in`
    /// day, preserving the number of nights.
    ///
    /// [`None`] is returned if the resulting check-out day is out of the
    /// representable range.
    #[must_use]
    pub fn shift_to(&self, check_in: Date) -> Option<Self> {
        let check_out =
            check_in.checked_add_days(i64::from(self.nights()))?;
        Some(Self {
            check_in,
            check_out,
        })
    }

    /// Returns whether this [`StayPeriod`] has started as of the provided
    /// day (the check-in day has been reached).
    #[must_use]
    pub fn has_started(&self, today: Date) -> bool {
        today >= self.check_in
    }

    /// Returns whether this [`StayPeriod`] has ended as of the provided day
    /// (the check-out day has been reached).
    #[must_use]
    pub fn has_ended(&self, today: Date) -> bool {
        today >= self.check_out
    }
}

/// Error of creating a [`StayPeriod`] with misordered dates.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display(
    "`check_out` date ({check_out}) must be strictly after `check_in` date \
     ({check_in})"
)]
pub struct InvalidDateRange {
    /// Provided check-in [`Date`].
    pub check_in: Date,

    /// Provided check-out [`Date`].
    pub check_out: Date,
}

#[cfg(test)]
mod spec {
    use common::Date;

    use super::StayPeriod;

    fn date(s: &str) -> Date {
        Date::from_iso8601(s).unwrap()
    }

    fn stay(check_in: &str, check_out: &str) -> StayPeriod {
        StayPeriod::new(date(check_in), date(check_out)).unwrap()
    }

    #[test]
    fn counts_nights() {
        assert_eq!(stay("2025-03-10", "2025-03-11").nights(), 1);
        assert_eq!(stay("2025-03-10", "2025-03-15").nights(), 5);
        assert_eq!(stay("2025-02-27", "2025-03-02").nights(), 3);
    }

    #[test]
    fn check_in_plus_nights_is_check_out() {
        let s = stay("2025-03-10", "2025-03-15");
        assert_eq!(
            s.check_in().checked_add_days(i64::from(s.nights())).unwrap(),
            s.check_out(),
        );
    }

    #[test]
    fn rejects_misordered_dates() {
        assert!(StayPeriod::new(date("2025-03-10"), date("2025-03-10"))
            .is_err());
        assert!(StayPeriod::new(date("2025-03-15"), date("2025-03-10"))
            .is_err());
    }

    #[test]
    fn touching_periods_do_not_overlap() {
        let first = stay("2025-03-10", "2025-03-15");

        // Check-out on another's check-in day is fine.
        assert!(!first.overlaps(&stay("2025-03-15", "2025-03-18")));
        assert!(!first.overlaps(&stay("2025-03-05", "2025-03-10")));

        assert!(first.overlaps(&stay("2025-03-14", "2025-03-16")));
        assert!(first.overlaps(&stay("2025-03-09", "2025-03-11")));
        assert!(first.overlaps(&stay("2025-03-11", "2025-03-12")));
        assert!(first.overlaps(&stay("2025-03-01", "2025-04-01")));
    }

    #[test]
    fn shift_preserves_nights() {
        let s = stay("2025-03-10", "2025-03-15");
        let moved = s.shift_to(date("2025-04-01")).unwrap();
        assert_eq!(moved.check_in(), date("2025-04-01"));
        assert_eq!(moved.check_out(), date("2025-04-06"));
        assert_eq!(moved.nights(), s.nights());
    }

    #[test]
    fn start_and_end_boundaries() {
        let s = stay("2025-03-10", "2025-03-12");
        assert!(!s.has_started(date("2025-03-09")));
        assert!(s.has_started(date("2025-03-10")));
        assert!(!s.has_ended(date("2025-03-11")));
        assert!(s.has_ended(date("2025-03-12")));
    }
}
