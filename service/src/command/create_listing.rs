//! [`Command`] for publishing a new [`Listing`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for publishing a new [`Listing`].
#[derive(Clone, Debug)]
pub struct CreateListing {
    /// ID of the seller owning the new [`Listing`].
    pub owner_id: user::Id,

    /// [`listing::Title`] of the new [`Listing`].
    pub title: listing::Title,

    /// [`listing::Address`] of the new [`Listing`].
    pub address: listing::Address,

    /// Asking price of the new [`Listing`].
    pub price: Money,
}

impl<Db> Command<CreateListing> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>> + Sync,
    Transacted<Db>: Database<Insert<Listing>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>
        + Send,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateListing {
            owner_id,
            title,
            address,
            price,
        } = cmd;

        let listing = Listing {
            id: listing::Id::new(),
            owner: owner_id,
            title,
            address,
            price,
            boosted_until: None,
            stats: listing::ViewStats::default(),
            favorites: listing::Favorites::default(),
            reviews: Vec::new(),
            reports: Vec::new(),
            revision: listing::Revision::default(),
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Insert(listing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(listing)
    }
}

/// Error of [`CreateListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
