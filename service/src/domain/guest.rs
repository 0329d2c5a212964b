//! [`Guest`] definitions.

use std::{str::FromStr, sync::LazyLock};

use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;

#[cfg(doc)]
use crate::domain::Booking;

/// Guest a [`Booking`] is made for.
///
/// Embedded value object: lives and dies with its [`Booking`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Guest {
    /// [`Name`] of this [`Guest`].
    pub name: Name,

    /// [`Email`] address of this [`Guest`].
    pub email: Email,

    /// [`Phone`] number of this [`Guest`].
    pub phone: Phone,
}

/// Name of a [`Guest`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Email address of a [`Guest`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format:
        /// one `@` separating a non-empty local part and a domain with at
        /// least one dot, no whitespace anywhere.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 320 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Phone number of a [`Guest`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `number` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format:
        /// an optional leading `+`, then 4 to 24 digits with optional
        /// space/dash/parentheses separators in between.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\+?[\d(][\d\s()-]{2,22}\d$").expect("valid regex")
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

#[cfg(test)]
mod spec {
    use super::{Email, Phone};

    #[test]
    fn email_format() {
        assert!(Email::new("guest@example.com").is_some());
        assert!(Email::new("a.b+c@mail.co.il").is_some());

        assert!(Email::new("").is_none());
        assert!(Email::new("guest@localhost").is_none());
        assert!(Email::new("guest example.com").is_none());
        assert!(Email::new("@example.com").is_none());
    }

    #[test]
    fn phone_format() {
        assert!(Phone::new("+972501234567").is_some());
        assert!(Phone::new("050-123-4567").is_some());
        assert!(Phone::new("(03) 555 0110").is_some());

        assert!(Phone::new("").is_none());
        assert!(Phone::new("123").is_none());
        assert!(Phone::new("phone").is_none());
        assert!(Phone::new("+972 5x 123").is_none());
    }
}
