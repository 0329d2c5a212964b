//! Price [`Breakdown`] derivation.

use common::{Money, Percent};
use derive_more::{Display, Error};
use rust_decimal::Decimal;

#[cfg(doc)]
use crate::domain::Booking;

/// Mutually consistent price fields of a [`Booking`].
///
/// All three are derived from a single [`Anchor`]; none is ever written
/// without the other two being re-derived.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Breakdown {
    /// Tax-exclusive nightly rate.
    pub base: Money,

    /// Tax-inclusive nightly rate.
    pub per_night: Money,

    /// Tax-inclusive total for the whole stay.
    pub total: Money,
}

impl Breakdown {
    /// Derives a full [`Breakdown`] from the provided [`Anchor`] value.
    ///
    /// The effective VAT rate is zero when `is_tourist` is set, `vat_rate`
    /// otherwise. Every derived field is rounded to 2 decimal places
    /// independently, with midpoints away from zero, and already-rounded
    /// values feed the next derivation step. Re-deriving from a derived
    /// field may therefore drift by up to `0.01` from the original: this
    /// matches how the prices are displayed and charged, and is deliberate.
    ///
    /// # Errors
    ///
    /// If the anchor amount is negative, or `nights` is zero.
    pub fn derive(
        anchor: Anchor,
        nights: u32,
        vat_rate: Percent,
        is_tourist: bool,
    ) -> Result<Self, InvalidPriceInput> {
        use InvalidPriceInput as E;

        let amount = anchor.amount();
        if amount.is_negative() {
            return Err(E::NegativeAmount(amount));
        }
        if nights == 0 {
            return Err(E::NoNights);
        }

        let effective_vat = if is_tourist { Percent::ZERO } else { vat_rate };
        let gross = Decimal::ONE + effective_vat.fraction();
        let nights = Decimal::from(nights);
        let currency = amount.currency;
        let money = |amount: Decimal| {
            Money { amount, currency }.round2()
        };

        Ok(match anchor {
            Anchor::Base(base) => {
                let per_night = money(base.amount * gross);
                let total = money(per_night.amount * nights);
                Self {
                    base,
                    per_night,
                    total,
                }
            }
            Anchor::PerNight(per_night) => {
                let base = money(per_night.amount / gross);
                let total = money(per_night.amount * nights);
                Self {
                    base,
                    per_night,
                    total,
                }
            }
            Anchor::Total(total) => {
                let per_night = money(total.amount / nights);
                let base = money(per_night.amount / gross);
                Self {
                    base,
                    per_night,
                    total,
                }
            }
        })
    }
}

/// Single price field a [`Breakdown`] is derived from.
#[derive(Clone, Copy, Debug)]
pub enum Anchor {
    /// Tax-exclusive nightly rate.
    Base(Money),

    /// Tax-inclusive nightly rate.
    PerNight(Money),

    /// Tax-inclusive total for the whole stay.
    Total(Money),
}

impl Anchor {
    /// Returns the [`Money`] amount of this [`Anchor`].
    #[must_use]
    pub fn amount(&self) -> Money {
        match *self {
            Self::Base(m) | Self::PerNight(m) | Self::Total(m) => m,
        }
    }
}

/// Error of deriving a [`Breakdown`].
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum InvalidPriceInput {
    /// Provided anchor amount is negative.
    #[display("price amount cannot be negative: {_0}")]
    NegativeAmount(#[error(not(source))] Money),

    /// Provided stay has no nights to price.
    #[display("cannot price a stay of zero nights")]
    NoNights,
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Money, Percent};
    use rust_decimal::Decimal;

    use super::{Anchor, Breakdown};

    fn ils(amount: &str) -> Money {
        Money {
            amount: amount.parse::<Decimal>().unwrap(),
            currency: Currency::Ils,
        }
    }

    fn vat18() -> Percent {
        Percent::new(Decimal::from(18)).unwrap()
    }

    #[test]
    fn derives_from_base() {
        let b = Breakdown::derive(Anchor::Base(ils("350")), 2, vat18(), false)
            .unwrap();
        assert_eq!(b.base, ils("350"));
        assert_eq!(b.per_night, ils("413.00"));
        assert_eq!(b.total, ils("826.00"));
    }

    #[test]
    fn derives_from_per_night() {
        let b = Breakdown::derive(
            Anchor::PerNight(ils("413")),
            2,
            vat18(),
            false,
        )
        .unwrap();
        assert_eq!(b.base, ils("350.00"));
        assert_eq!(b.per_night, ils("413"));
        assert_eq!(b.total, ils("826.00"));
    }

    #[test]
    fn derives_from_total() {
        let b = Breakdown::derive(Anchor::Total(ils("826")), 2, vat18(), false)
            .unwrap();
        assert_eq!(b.per_night, ils("413.00"));
        assert_eq!(b.base, ils("350.00"));
        assert_eq!(b.total, ils("826"));
    }

    #[test]
    fn tourists_are_vat_exempt() {
        let b = Breakdown::derive(Anchor::Base(ils("350")), 2, vat18(), true)
            .unwrap();
        assert_eq!(b.per_night, ils("350.00"));
        assert_eq!(b.total, ils("700.00"));
    }

    #[test]
    fn total_is_rounded_per_night_times_nights() {
        let b = Breakdown::derive(
            Anchor::Base(ils("123.45")),
            3,
            Percent::new(Decimal::from(17)).unwrap(),
            false,
        )
        .unwrap();
        // 123.45 * 1.17 = 144.4365, rounded per night first.
        assert_eq!(b.per_night, ils("144.44"));
        assert_eq!(b.total, ils("433.32"));
    }

    #[test]
    fn round_trip_stays_within_a_cent() {
        for base in ["350", "123.45", "99.99", "0.01", "1234.56"] {
            let derived =
                Breakdown::derive(Anchor::Base(ils(base)), 2, vat18(), false)
                    .unwrap();
            let back = Breakdown::derive(
                Anchor::PerNight(derived.per_night),
                2,
                vat18(),
                false,
            )
            .unwrap();
            let drift = (back.base.amount - ils(base).amount).abs();
            assert!(
                drift <= "0.01".parse::<Decimal>().unwrap(),
                "base {base} drifted by {drift}",
            );
        }
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(
            Breakdown::derive(Anchor::Base(ils("-1")), 2, vat18(), false)
                .is_err()
        );
        assert!(
            Breakdown::derive(Anchor::Total(ils("826")), 0, vat18(), false)
                .is_err()
        );
        assert!(
            Breakdown::derive(Anchor::Base(ils("0")), 1, vat18(), false)
                .is_ok()
        );
    }
}
