//! [`Command`] for toggling a favorite mark on a [`Listing`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for toggling the `user`'s favorite mark on a [`Listing`].
///
/// Applying it twice restores the original state.
#[derive(Clone, Copy, Debug)]
pub struct ToggleFavorite {
    /// ID of the [`Listing`] to toggle the favorite mark on.
    pub listing_id: listing::Id,

    /// ID of the [`user`] toggling the favorite mark.
    pub user_id: user::Id,
}

impl<Db> Command<ToggleFavorite> for Service<Db>
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
        cmd: ToggleFavorite,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ToggleFavorite {
            listing_id,
            user_id,
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

        _ = listing.toggle_favorite(user_id);

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

/// Error of [`ToggleFavorite`] [`Command`] execution.
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

    use super::{Command as _, ToggleFavorite};

    #[tokio::test]
    async fn double_toggle_restores_original_state() {
        let service = Service::in_memory(Memory::new());
        let listing = service.create_test_listing(user::Id::new()).await;
        let buyer = user::Id::new();

        let cmd = ToggleFavorite {
            listing_id: listing.id,
            user_id: buyer,
        };

        let favorited = service.execute(cmd).await.unwrap();
        assert!(favorited.favorites.contains(buyer));
        assert_eq!(favorited.favorites.count(), 1);

        let unfavorited = service.execute(cmd).await.unwrap();
        assert!(!unfavorited.favorites.contains(buyer));
        assert_eq!(unfavorited.favorites.count(), 0);
    }
}
