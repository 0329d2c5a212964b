//! [`Room`] definitions.

use std::fmt;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Date, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hotel room available for booking.
#[derive(Clone, Debug)]
pub struct Room {
    /// ID of this [`Room`].
    pub id: Id,

    /// Human-facing [`Number`] of this [`Room`].
    ///
    /// Unique across all [`Room`]s.
    pub number: Number,

    /// [`Kind`] of this [`Room`].
    pub kind: Kind,

    /// Tax-exclusive nightly rate of this [`Room`].
    pub base_price: Money,

    /// Maximum number of guests this [`Room`] accommodates.
    pub max_occupancy: MaxOccupancy,

    /// Nightly rate overrides keyed by weekday or concrete date.
    pub special_prices: Vec<SpecialPrice>,

    /// [`DateTime`] when this [`Room`] was created.
    pub created_at: CreationDateTime,
}

impl Room {
    /// Returns the tax-exclusive nightly rate of this [`Room`] effective on
    /// the provided [`Date`].
    ///
    /// A [`PriceKey::Date`] override takes precedence over a
    /// [`PriceKey::Weekday`] one, which in turn takes precedence over the
    /// regular [`Room::base_price`].
    #[must_use]
    pub fn nightly_base_price(&self, date: Date) -> Money {
        let mut weekday_price = None;
        for special in &self.special_prices {
            match special.key {
                PriceKey::Date(d) if d == date => return special.price,
                PriceKey::Weekday(w) if w == date.weekday() => {
                    weekday_price = Some(special.price);
                }
                PriceKey::Date(_) | PriceKey::Weekday(_) => {}
            }
        }
        weekday_price.unwrap_or(self.base_price)
    }
}

/// ID of a [`Room`].
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

/// Human-facing number of a [`Room`] (e.g. `101` or `2B`).
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Number(String);

impl Number {
    /// Creates a new [`Number`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `number` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Creates a new [`Number`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Number`].
    fn check(number: impl AsRef<str>) -> bool {
        let number = number.as_ref();
        number.trim() == number && !number.is_empty() && number.len() <= 16
    }
}

impl std::str::FromStr for Number {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Number`")
    }
}

/// Maximum number of guests a [`Room`] accommodates.
pub type MaxOccupancy = u16;

define_kind! {
    #[doc = "Kind of a [`Room`]."]
    enum Kind {
        #[doc = "A single room."]
        Single = 1,

        #[doc = "A double room."]
        Double = 2,

        #[doc = "A twin room."]
        Twin = 3,

        #[doc = "A suite."]
        Suite = 4,

        #[doc = "A family room."]
        Family = 5,
    }
}

/// Nightly rate override of a [`Room`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SpecialPrice {
    /// [`PriceKey`] selecting the nights this override applies to.
    pub key: PriceKey,

    /// Overridden tax-exclusive nightly rate.
    pub price: Money,
}

/// Key selecting the nights a [`SpecialPrice`] applies to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PriceKey {
    /// A concrete calendar [`Date`].
    Date(Date),

    /// Every occurrence of a weekday.
    Weekday(time::Weekday),
}

impl fmt::Display for PriceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{date}"),
            Self::Weekday(weekday) => {
                write!(f, "{}", weekday.to_string().to_uppercase())
            }
        }
    }
}

impl std::str::FromStr for PriceKey {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let weekday = match s.to_ascii_uppercase().as_str() {
            "MONDAY" => Some(time::Weekday::Monday),
            "TUESDAY" => Some(time::Weekday::Tuesday),
            "WEDNESDAY" => Some(time::Weekday::Wednesday),
            "THURSDAY" => Some(time::Weekday::Thursday),
            "FRIDAY" => Some(time::Weekday::Friday),
            "SATURDAY" => Some(time::Weekday::Saturday),
            "SUNDAY" => Some(time::Weekday::Sunday),
            _ => None,
        };
        if let Some(weekday) = weekday {
            return Ok(Self::Weekday(weekday));
        }
        Date::from_iso8601(s)
            .map(Self::Date)
            .map_err(|_| "invalid `PriceKey`")
    }
}

/// [`DateTime`] when a [`Room`] was created.
pub type CreationDateTime = DateTimeOf<(Room, unit::Creation)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{money::Currency, Date, DateTime, Money};
    use rust_decimal::Decimal;

    use super::{Id, Kind, Number, PriceKey, Room, SpecialPrice};

    fn ils(amount: &str) -> Money {
        Money {
            amount: amount.parse::<Decimal>().unwrap(),
            currency: Currency::Ils,
        }
    }

    fn room(special_prices: Vec<SpecialPrice>) -> Room {
        Room {
            id: Id::new(),
            number: Number::new("101").unwrap(),
            kind: Kind::Double,
            base_price: ils("350"),
            max_occupancy: 2,
            special_prices,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn price_key_round_trips_through_str() {
        for (input, expected) in [
            ("FRIDAY", PriceKey::Weekday(time::Weekday::Friday)),
            ("friday", PriceKey::Weekday(time::Weekday::Friday)),
            (
                "2025-03-14",
                PriceKey::Date(Date::from_iso8601("2025-03-14").unwrap()),
            ),
        ] {
            assert_eq!(PriceKey::from_str(input).unwrap(), expected);
        }
        assert_eq!(
            PriceKey::Weekday(time::Weekday::Friday).to_string(),
            "FRIDAY",
        );
        assert!(PriceKey::from_str("someday").is_err());
    }

    #[test]
    fn nightly_base_price_prefers_date_over_weekday() {
        // 2025-03-14 is a Friday.
        let date = Date::from_iso8601("2025-03-14").unwrap();

        let plain = room(vec![]);
        assert_eq!(plain.nightly_base_price(date), ils("350"));

        let weekends = room(vec![SpecialPrice {
            key: PriceKey::Weekday(time::Weekday::Friday),
            price: ils("420"),
        }]);
        assert_eq!(weekends.nightly_base_price(date), ils("420"));

        let holiday = room(vec![
            SpecialPrice {
                key: PriceKey::Weekday(time::Weekday::Friday),
                price: ils("420"),
            },
            SpecialPrice {
                key: PriceKey::Date(date),
                price: ils("500"),
            },
        ]);
        assert_eq!(holiday.nightly_base_price(date), ils("500"));
        assert_eq!(
            holiday.nightly_base_price(
                Date::from_iso8601("2025-03-21").unwrap(),
            ),
            ils("420"),
        );
        assert_eq!(
            holiday.nightly_base_price(
                Date::from_iso8601("2025-03-17").unwrap(),
            ),
            ils("350"),
        );
    }
}
