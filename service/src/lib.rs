//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use std::error::Error;

use common::{
    operations::{By, Start},
    Percent,
};

use crate::domain::booking;
#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Default VAT rate applied to [`Booking`]s of non-exempt guests.
    ///
    /// [`Booking`]: domain::Booking
    pub vat_rate: Percent,

    /// Cancellation fee policy applied to [`Booking`]s.
    ///
    /// [`Booking`]: domain::Booking
    pub cancellation_policy: booking::CancellationPolicy,

    /// [`task::ReleaseStaleHolds`] configuration.
    pub release_stale_holds: task::release_stale_holds::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, N = infra::notifier::Log> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Notifier`] of this [`Service`].
    ///
    /// [`Notifier`]: infra::Notifier
    notifier: N,
}

impl<Db, N> Service<Db, N> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(config: Config, database: Db, notifier: N) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::ReleaseStaleHolds<Self>,
                        task::release_stale_holds::Config,
                    >,
                >,
                Ok = (),
                Err: Error + 'static,
            > + Clone
            + 'static,
    {
        let this = Service {
            config,
            database,
            notifier,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().release_stale_holds)))
                .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns notifier of this [`Service`].
    #[must_use]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}
