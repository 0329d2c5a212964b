//! Background [`Task`]s definitions.

mod background;
pub mod release_stale_holds;

pub use common::Handler as Task;

pub use self::{
    background::Background, release_stale_holds::ReleaseStaleHolds,
};
