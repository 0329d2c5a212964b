//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{
    prelude::ToPrimitive as _, Decimal, RoundingStrategy,
};

use crate::define_kind;

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Rounds the amount of this [`Money`] to 2 decimal places, with midpoints
    /// rounded away from zero (commercial rounding).
    #[must_use]
    pub fn round2(self) -> Self {
        Self {
            amount: self
                .amount
                .round_dp_with_strategy(
                    2,
                    RoundingStrategy::MidpointAwayFromZero,
                ),
            currency: self.currency,
        }
    }

    /// Indicates whether the amount of this [`Money`] is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Returns a zero [`Money`] amount in the provided [`Currency`].
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        if amount.is_integer() {
            write!(f, "{}{currency}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{amount}{currency}")
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 {
            return Err("too short");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "Israeli New Shekel."]
        Ils = 1,

        #[doc = "US Dollar."]
        Usd = 2,

        #[doc = "Euro."]
        Eur = 3,
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Money in `{major}.{minor}{currency}` format, where:
    /// - `major` is an integer;
    /// - `minor` is an optional integer;
    /// - `currency` is a three-letter currency code.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Money` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Money` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Currency, Money};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("413.45ILS").unwrap(),
            Money {
                amount: decimal("413.45"),
                currency: Currency::Ils,
            },
        );

        assert_eq!(
            Money::from_str("99.9USD").unwrap(),
            Money {
                amount: decimal("99.9"),
                currency: Currency::Usd,
            },
        );

        assert_eq!(
            Money::from_str("350EUR").unwrap(),
            Money {
                amount: decimal("350"),
                currency: Currency::Eur,
            },
        );

        assert!(Money::from_str("413.45").is_err());
        assert!(Money::from_str("413.45Il").is_err());
        assert!(Money::from_str("413.45Shekel").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(
            Money {
                amount: decimal("413.45"),
                currency: Currency::Ils,
            }
            .to_string(),
            "413.45ILS",
        );

        assert_eq!(
            Money {
                amount: decimal("826.00"),
                currency: Currency::Ils,
            }
            .to_string(),
            "826ILS",
        );

        assert_eq!(
            Money {
                amount: decimal("826.0"),
                currency: Currency::Eur,
            }
            .to_string(),
            "826EUR",
        );
    }

    #[test]
    fn round2_midpoint_goes_away_from_zero() {
        let cases = [
            ("413.005", "413.01"),
            ("413.004", "413"),
            ("412.995", "413"),
            ("0.125", "0.13"),
            ("-0.125", "-0.13"),
            ("826", "826"),
        ];
        for (given, expected) in cases {
            assert_eq!(
                Money {
                    amount: decimal(given),
                    currency: Currency::Ils,
                }
                .round2()
                .amount,
                decimal(expected),
                "round2({given})",
            );
        }
    }

    #[test]
    fn is_negative() {
        assert!(Money {
            amount: decimal("-0.01"),
            currency: Currency::Ils,
        }
        .is_negative());
        assert!(!Money::zero(Currency::Ils).is_negative());
        assert!(!Money {
            amount: decimal("0.01"),
            currency: Currency::Ils,
        }
        .is_negative());
    }
}
