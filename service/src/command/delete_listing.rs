//! [`Command`] for deleting a [`Listing`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing},
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::task::PruneDeletedListings;

use super::Command;

/// [`Command`] for deleting a [`Listing`] together with its reviews,
/// responses and reports.
///
/// The [`Listing`] is soft-deleted and disappears from all reads at once,
/// while [`PruneDeletedListings`] reclaims the storage later.
#[derive(Clone, Copy, Debug)]
pub struct DeleteListing {
    /// ID of the [`Listing`] to delete.
    pub listing_id: listing::Id,

    /// ID of the [`user`] requesting the deletion.
    ///
    /// Must be the [`Listing`] owner.
    pub initiator_id: user::Id,
}

impl<Db> Command<DeleteListing> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>> + Sync,
    Transacted<Db>: Database<
            Lock<By<Listing, listing::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<Update<Listing>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>
        + Send,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteListing {
            listing_id,
            initiator_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent deletions.
        tx.execute(Lock(By::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut listing = tx
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;

        if listing.owner != initiator_id {
            return Err(tracerr::new!(E::NotOwner(initiator_id)));
        }

        _ = listing.deleted_at.insert(DateTime::now().coerce());

        tx.execute(Update(listing.clone()))
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

/// Error of [`DeleteListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// Requesting [`user`] is not the [`Listing`] owner.
    #[display("`User(id: {_0})` does not own the `Listing`")]
    NotOwner(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{listing, user},
        infra::Memory,
        query, Query as _, Service,
    };

    use super::{Command as _, DeleteListing, ExecutionError};

    #[tokio::test]
    async fn only_owner_may_delete() {
        let owner = user::Id::new();
        let service = Service::in_memory(Memory::new());
        let listing = service.create_test_listing(owner).await;

        let err = service
            .execute(DeleteListing {
                listing_id: listing.id,
                initiator_id: user::Id::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::NotOwner(_)));

        service
            .execute(DeleteListing {
                listing_id: listing.id,
                initiator_id: owner,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn deleted_listing_vanishes_from_reads_with_its_engagement() {
        let owner = user::Id::new();
        let service = Service::in_memory(Memory::new());
        let listing = service.create_test_listing(owner).await;

        service
            .execute(DeleteListing {
                listing_id: listing.id,
                initiator_id: owner,
            })
            .await
            .unwrap();

        let found: Option<listing::Listing> = service
            .execute(query::listing::ById::by(listing.id))
            .await
            .unwrap();
        assert!(found.is_none());

        let err = service
            .execute(DeleteListing {
                listing_id: listing.id,
                initiator_id: owner,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::ListingNotExists(_),
        ));
    }
}
