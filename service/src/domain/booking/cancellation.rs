//! Cancellation fee [`Policy`].

use common::{Date, Money};

#[cfg(doc)]
use crate::domain::Booking;

/// Cancellation fee policy of [`Booking`]s.
#[derive(Clone, Copy, Debug)]
pub struct Policy {
    /// Number of days before check-in within which a cancellation is still
    /// free of charge.
    pub free_cancellation_days: u16,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            free_cancellation_days: 3,
        }
    }
}

impl Policy {
    /// Evaluates this [`Policy`] for a [`Booking`] checking in on `check_in`
    /// and priced at `total`, as of the provided day.
    ///
    /// The cancellation is free when at least
    /// [`Policy::free_cancellation_days`] whole days remain until check-in
    /// (the boundary day itself is still free); otherwise the whole `total`
    /// is charged.
    #[must_use]
    pub fn evaluate(&self, check_in: Date, today: Date, total: Money) -> Outcome {
        let days_until = check_in - today;
        if days_until >= i64::from(self.free_cancellation_days) {
            Outcome {
                fee: Money::zero(total.currency),
                is_full_refund: true,
            }
        } else {
            Outcome {
                fee: total,
                is_full_refund: false,
            }
        }
    }
}

/// Outcome of a [`Policy`] evaluation.
#[derive(Clone, Copy, Debug)]
pub struct Outcome {
    /// Fee to be charged for the cancellation.
    pub fee: Money,

    /// Indicator whether the [`Guest`] is refunded in full.
    ///
    /// [`Guest`]: crate::domain::Guest
    pub is_full_refund: bool,
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Date, Money};
    use rust_decimal::Decimal;

    use super::Policy;

    fn ils(amount: i64) -> Money {
        Money {
            amount: Decimal::from(amount),
            currency: Currency::Ils,
        }
    }

    fn date(s: &str) -> Date {
        Date::from_iso8601(s).unwrap()
    }

    #[test]
    fn free_at_three_or_more_days_before_check_in() {
        let policy = Policy::default();
        let today = date("2025-03-10");

        // Exactly at the boundary: still free.
        let outcome = policy.evaluate(date("2025-03-13"), today, ils(826));
        assert!(outcome.is_full_refund);
        assert_eq!(outcome.fee, Money::zero(Currency::Ils));

        let outcome = policy.evaluate(date("2025-04-01"), today, ils(826));
        assert!(outcome.is_full_refund);
    }

    #[test]
    fn charges_total_within_the_window() {
        let policy = Policy::default();
        let today = date("2025-03-10");

        let outcome = policy.evaluate(date("2025-03-12"), today, ils(826));
        assert!(!outcome.is_full_refund);
        assert_eq!(outcome.fee, ils(826));

        let outcome = policy.evaluate(date("2025-03-10"), today, ils(826));
        assert!(!outcome.is_full_refund);
    }

    #[test]
    fn window_is_configurable() {
        let policy = Policy {
            free_cancellation_days: 7,
        };
        let today = date("2025-03-10");

        assert!(
            !policy
                .evaluate(date("2025-03-13"), today, ils(826))
                .is_full_refund
        );
        assert!(
            policy
                .evaluate(date("2025-03-17"), today, ils(826))
                .is_full_refund
        );
    }
}
