//! [`Query`] collection related to a single [`Room`].

use common::operations::By;

use crate::domain::{room, Room};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Room`] by its [`room::Id`].
pub type ById = DatabaseQuery<By<Option<Room>, room::Id>>;

/// Queries a [`Room`] by its [`room::Number`].
pub type ByNumber = DatabaseQuery<By<Option<Room>, room::Number>>;
