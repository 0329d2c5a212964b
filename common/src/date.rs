//! Calendar date utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{cmp::Ordering, fmt, hash::Hash, marker::PhantomData, ops, str::FromStr};

use derive_more::{Debug, Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{
    format_description::BorrowedFormatItem, macros::format_description,
};

/// Untyped calendar date.
pub type Date = DateOf;

/// [ISO 8601] (`YYYY-MM-DD`) format of a [`Date`].
///
/// [ISO 8601]: https://wikipedia.org/wiki/ISO_8601
const ISO8601: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Calendar date without a time-of-day component.
///
/// Used wherever only the day matters (check-in/check-out boundaries, night
/// counting), as opposed to [`DateTimeOf`] carrying a full timestamp.
///
/// [`DateTimeOf`]: crate::DateTimeOf
#[derive(Debug)]
pub struct DateOf<Of: ?Sized = ()> {
    /// Inner representation of the date.
    inner: time::Date,

    /// Type parameter describing the kind of date.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateOf<Of> {
    /// Creates a new [`Date`] representing the current day in UTC.
    #[must_use]
    pub fn today_utc() -> Self {
        Self {
            inner: time::OffsetDateTime::now_utc().date(),
            _of: PhantomData,
        }
    }

    /// Creates a new [`Date`] from the provided [ISO 8601] (`YYYY-MM-DD`)
    /// string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid [ISO 8601] date.
    ///
    /// [ISO 8601]: https://wikipedia.org/wiki/ISO_8601
    pub fn from_iso8601(input: &str) -> Result<Self, ParseError> {
        time::Date::parse(input, ISO8601)
            .map(|inner| Self {
                inner,
                _of: PhantomData,
            })
            .map_err(ParseError)
    }

    /// Returns the [`Date`] as an [ISO 8601] (`YYYY-MM-DD`) string.
    ///
    /// [ISO 8601]: https://wikipedia.org/wiki/ISO_8601
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn to_iso8601(&self) -> String {
        self.inner
            .format(ISO8601)
            .unwrap_or_else(|e| panic!("cannot format `Date` as ISO 8601: {e}"))
    }

    /// Returns the day of the week of this [`Date`].
    #[must_use]
    pub fn weekday(&self) -> time::Weekday {
        self.inner.weekday()
    }

    /// Returns the [`Date`] shifted forward by the provided number of whole
    /// days (backward for negative values).
    ///
    /// [`None`] is returned if the result is out of the representable range.
    #[must_use]
    pub fn checked_add_days(self, days: i64) -> Option<Self> {
        self.inner
            .checked_add(time::Duration::days(days))
            .map(|inner| Self {
                inner,
                _of: PhantomData,
            })
    }

}

/// Error of parsing [`Date`] from a string.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid ISO 8601 date: {_0}")]
pub struct ParseError(time::error::Parse);

impl<Of: ?Sized> Copy for DateOf<Of> {}
impl<Of: ?Sized> Clone for DateOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateOf<Of> {}
impl<Of: ?Sized> PartialEq for DateOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> Hash for DateOf<Of> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<Of: ?Sized> Ord for DateOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> fmt::Display for DateOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_iso8601())
    }
}

impl<Of: ?Sized> FromStr for DateOf<Of> {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_iso8601(s)
    }
}

impl<Of: ?Sized> From<time::Date> for DateOf<Of> {
    fn from(inner: time::Date) -> Self {
        Self {
            inner,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> ops::Sub for DateOf<Of> {
    type Output = i64;

    /// Returns the number of whole days between two [`Date`]s.
    fn sub(self, rhs: Self) -> Self::Output {
        (self.inner - rhs.inner).whole_days()
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateOf<Of> {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        Ok(time::Date::from_sql(ty, raw)?.into())
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> ToSql for DateOf<Of> {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.inner.to_sql(ty, w)
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Calendar date in [ISO 8601] (`YYYY-MM-DD`) format.
    ///
    /// [ISO 8601]: https://wikipedia.org/wiki/ISO_8601
    #[graphql_scalar(with = Self, parse_token(String))]
    type Date = crate::Date;

    impl Date {
        fn to_output<S: ScalarValue>(d: &Date) -> Value<S> {
            Value::scalar(d.to_iso8601())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Date` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_iso8601(s).map_err(|e| {
                        format!("Cannot parse `Date` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use super::Date;

    #[test]
    fn parses_and_formats_iso8601() {
        let date = Date::from_iso8601("2025-03-10").unwrap();
        assert_eq!(date.to_iso8601(), "2025-03-10");

        assert!(Date::from_iso8601("2025-3-10").is_err());
        assert!(Date::from_iso8601("10.03.2025").is_err());
        assert!(Date::from_iso8601("2025-02-30").is_err());
    }

    #[test]
    fn whole_days_between() {
        let check_in = Date::from_iso8601("2025-03-10").unwrap();
        let check_out = Date::from_iso8601("2025-03-15").unwrap();
        assert_eq!(check_out - check_in, 5);
        assert_eq!(check_in - check_out, -5);
        assert_eq!(check_in - check_in, 0);
    }

    #[test]
    fn checked_add_days() {
        let date = Date::from_iso8601("2025-02-27").unwrap();
        assert_eq!(
            date.checked_add_days(2).unwrap().to_iso8601(),
            "2025-03-01",
        );
        assert_eq!(
            date.checked_add_days(-27).unwrap().to_iso8601(),
            "2025-01-31",
        );
    }
}
