//! GraphQL API definitions.

pub mod booking;
mod mutation;
mod query;
pub mod room;
pub mod scalar;

use juniper::EmptySubscription;

use crate::{define_error, Context};

pub use self::{
    booking::Booking, mutation::Mutation, query::Query, room::Room,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

define_error! {
    enum PaginationError {
        #[code = "AMBIGUOUS_PAGINATION_ARGUMENTS"]
        #[status = BAD_REQUEST]
        #[message = "Ambiguous pagination arguments"]
        Ambiguous,
    }
}
