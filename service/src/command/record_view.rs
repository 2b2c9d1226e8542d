//! [`Command`] for recording a view of a [`Listing`].

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

use super::Command;

/// [`Command`] for recording a single view of a [`Listing`].
///
/// Available to anonymous viewers: without a `viewer_id` only the daily
/// traffic counter moves.
#[derive(Clone, Copy, Debug)]
pub struct RecordView {
    /// ID of the [`Listing`] being viewed.
    pub listing_id: listing::Id,

    /// ID of the viewer, if authenticated.
    pub viewer_id: Option<user::Id>,
}

impl<Db> Command<RecordView> for Service<Db>
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

    async fn execute(&self, cmd: RecordView) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordView {
            listing_id,
            viewer_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize engagement writes upon the same `Listing`.
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

        listing.record_view(viewer_id, DateTime::now());

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

/// Error of [`RecordView`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    ListingNotExists(#[error(not(source))] listing::Id),
}

#[cfg(test)]
mod spec {
    use crate::{domain::user, infra::Memory, Service};

    use super::{Command as _, ExecutionError, RecordView};

    #[tokio::test]
    async fn repeat_views_dedup_lifetime_counter_through_the_store() {
        let service = Service::in_memory(Memory::new());
        let listing = service.create_test_listing(user::Id::new()).await;
        let viewer = user::Id::new();

        for _ in 0..2 {
            service
                .execute(RecordView {
                    listing_id: listing.id,
                    viewer_id: Some(viewer),
                })
                .await
                .unwrap();
        }
        let updated = service
            .execute(RecordView {
                listing_id: listing.id,
                viewer_id: None,
            })
            .await
            .unwrap();

        assert_eq!(updated.stats.views(), 1);
        assert_eq!(updated.stats.today(), 3);
    }

    #[tokio::test]
    async fn viewing_unknown_listing_fails() {
        let service = Service::in_memory(Memory::new());

        let err = service
            .execute(RecordView {
                listing_id: crate::domain::listing::Id::new(),
                viewer_id: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ListingNotExists(_),
        ));
    }
}
