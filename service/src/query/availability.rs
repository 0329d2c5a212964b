//! [`Query`] checking a [`Room`] availability.
//!
//! [`Room`]: crate::domain::Room

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::{domain::Booking, Query};

use super::DatabaseQuery;

/// Queries the [`Booking`]s conflicting with a proposed stay.
///
/// Must be re-run (never cached) by every operation that creates or moves a
/// stay: a stale result here is a double-booking.
pub type Conflicts = DatabaseQuery<
    By<read::booking::Conflicts, read::booking::ProposedStay>,
>;
