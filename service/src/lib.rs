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

use common::operations::{By, Start};
use derive_more::{Debug, Display, Error};

#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// [`task::PruneDeletedListings`] configuration.
    pub prune_deleted_listings: task::prune_deleted_listings::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(config: Config, database: Db) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::PruneDeletedListings<Self>,
                        task::prune_deleted_listings::Config,
                    >,
                >,
                Ok = (),
                Err: Error + Send + 'static,
            > + Clone
            + Send
            + Sync
            + 'static,
    {
        let this = Service { config, database };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().prune_deleted_listings)))
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
}

/// Shortcut for the error of starting a [`Task`].
type TaskStartError<Svc, T, Args> = <Svc as Task<Start<By<T, Args>>>>::Err;

/// Error of starting a [`Service`].
#[derive(Debug, Display, Error)]
pub enum StartupError<Svc>
where
    Svc: Task<
        Start<
            By<
                task::PruneDeletedListings<Svc>,
                task::prune_deleted_listings::Config,
            >,
        >,
    >,
{
    /// [`task::PruneDeletedListings`] failed to start.
    PruneDeletedListingsTask(
        TaskStartError<
            Svc,
            task::PruneDeletedListings<Svc>,
            task::prune_deleted_listings::Config,
        >,
    ),
}

#[cfg(test)]
mod testing {
    use std::time::Duration;

    use crate::{
        command::CreateListing,
        domain::{user, Listing},
        infra::Memory,
        task, Command as _, Config, Service,
    };

    impl Service<Memory> {
        /// Creates a [`Service`] backed by the provided [`Memory`] store,
        /// without spawning background tasks.
        pub(crate) fn in_memory(database: Memory) -> Self {
            Self {
                config: Config {
                    prune_deleted_listings:
                        task::prune_deleted_listings::Config {
                            interval: Duration::from_secs(60 * 60),
                            retention: Duration::from_secs(30 * 24 * 60 * 60),
                        },
                },
                database,
            }
        }

        /// Publishes a canned [`Listing`] owned by the provided seller.
        pub(crate) async fn create_test_listing(
            &self,
            owner: user::Id,
        ) -> Listing {
            self.execute(CreateListing {
                owner_id: owner,
                title: "Sunny two-bedroom".parse().unwrap(),
                address: "12 Harbour Rd, Bristol".parse().unwrap(),
                price: "250000GBP".parse().unwrap(),
            })
            .await
            .unwrap()
        }
    }
}
