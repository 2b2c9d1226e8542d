//! [`PruneDeletedListings`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Delete, Perform, Start};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{listing, Listing},
    infra::{database, Database},
    Service,
};

use super::Task;

/// Configuration for [`PruneDeletedListings`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between prune passes.
    pub interval: time::Duration,

    /// Period a soft-deleted [`Listing`] is retained before its storage is
    /// reclaimed.
    pub retention: time::Duration,
}

/// [`Task`] reclaiming [`Listing`]s soft-deleted longer than the retention
/// period ago.
///
/// Deletion itself is a soft one, hiding the [`Listing`] from reads
/// immediately. This [`Task`] performs the actual removal, taking the
/// embedded reviews, responses and reports along.
#[derive(Clone, Copy, Debug)]
pub struct PruneDeletedListings<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<PruneDeletedListings<Self>, Config>>> for Service<Db>
where
    PruneDeletedListings<Service<Db>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone + Sync,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<PruneDeletedListings<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = PruneDeletedListings {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::PruneDeletedListings` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for PruneDeletedListings<Service<Db>>
where
    Db: Database<
        Delete<By<Listing, listing::DeletionDateTime>>,
        Ok = u64,
        Err = Traced<database::Error>,
    > + Sync,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let deadline =
            listing::DeletionDateTime::now() - self.config.retention;
        let removed = self
            .service
            .database()
            .execute(Delete(By::new(deadline)))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;
        if removed > 0 {
            log::info!("`task::PruneDeletedListings` reclaimed {removed}");
        }
        Ok(())
    }
}

/// Error of [`PruneDeletedListings`] execution.
pub type ExecutionError = Traced<database::Error>;
