//! [`ReleaseStaleHolds`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Start, Update};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{booking, Booking},
    infra::{database, Database},
    Service,
};

use super::Task;

/// Configuration for [`ReleaseStaleHolds`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between stale [`Booking`] holds releasing.
    pub interval: time::Duration,

    /// Timeout after which an unconfirmed [`Booking`] is considered stale.
    pub timeout: time::Duration,
}

/// [`Task`] releasing stale [`Booking`] holds.
///
/// A hold is a [`Booking`] that was created but never confirmed: once it
/// outlives the configured timeout (and its stay has not started yet), it is
/// cancelled free of charge, releasing the [`Room`] nights it blocks.
///
/// [`Room`]: crate::domain::Room
#[derive(Clone, Copy, Debug)]
pub struct ReleaseStaleHolds<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, N> Task<Start<By<ReleaseStaleHolds<Self>, Config>>> for Service<Db, N>
where
    ReleaseStaleHolds<Service<Db, N>>:
        Task<Perform<()>, Ok = u64, Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<ReleaseStaleHolds<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = ReleaseStaleHolds {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            match task.execute(Perform(())).await {
                Ok(0) => {}
                Ok(released) => {
                    log::info!("`task::ReleaseStaleHolds` cancelled \
                                {released} stale holds");
                }
                Err(e) => {
                    log::error!("`task::ReleaseStaleHolds` failed: {e}");
                }
            }
        }
    }
}

impl<Db, N> Task<Perform<()>> for ReleaseStaleHolds<Service<Db, N>>
where
    Db: Database<
        Update<By<Booking, booking::CreationDateTime>>,
        Ok = u64,
        Err = Traced<database::Error>,
    >,
{
    type Ok = u64;
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let deadline = booking::CreationDateTime::now() - self.config.timeout;
        self.service
            .database()
            .execute(Update(By::new(deadline)))
            .await
            .map_err(tracerr::map_from_and_wrap!())
    }
}

/// Error of [`ReleaseStaleHolds`] execution.
pub type ExecutionError = Traced<database::Error>;
