//! [`Command`] for responding to a [`Review`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        listing::{self, review, RespondError},
        user, Listing,
    },
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::listing::{Response, Review};

use super::Command;

/// [`Command`] for attaching the owner's [`Response`] to a [`Review`].
#[derive(Clone, Debug)]
pub struct AddResponse {
    /// ID of the [`Listing`] the [`Review`] belongs to.
    pub listing_id: listing::Id,

    /// ID of the [`Review`] being responded to.
    pub review_id: review::Id,

    /// ID of the responding [`user`].
    ///
    /// Must be the [`Listing`] owner.
    pub author_id: user::Id,

    /// [`response::Text`] of the new [`Response`].
    ///
    /// [`response::Text`]: review::response::Text
    pub text: review::response::Text,
}

impl<Db> Command<AddResponse> for Service<Db>
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

    async fn execute(&self, cmd: AddResponse) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddResponse {
            listing_id,
            review_id,
            author_id,
            text,
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

        listing
            .respond(review_id, author_id, text, DateTime::now())
            .map_err(|e| match e {
                RespondError::AlreadyResponded(id) => E::AlreadyResponded(id),
                RespondError::NotOwner => E::NotOwner(author_id),
                RespondError::ReviewNotExists(id) => E::ReviewNotExists(id),
            })
            .map_err(tracerr::wrap!())
            .map(drop)?;

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

/// Error of [`AddResponse`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Review`] is responded to already.
    #[display("`Review(id: {_0})` has a `Response` already")]
    AlreadyResponded(#[error(not(source))] review::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// Responding [`user`] is not the [`Listing`] owner.
    #[display("`User(id: {_0})` does not own the `Listing`")]
    NotOwner(#[error(not(source))] user::Id),

    /// [`Review`] with the provided ID does not exist.
    #[display("`Review(id: {_0})` does not exist")]
    ReviewNotExists(#[error(not(source))] review::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::AddReview, domain::user, infra::Memory, Service,
    };

    use super::{AddResponse, Command as _, ExecutionError};

    #[tokio::test]
    async fn second_response_to_same_review_conflicts() {
        let owner = user::Id::new();
        let service = Service::in_memory(Memory::new());
        let listing = service.create_test_listing(owner).await;

        let (_, review_id) = service
            .execute(AddReview {
                listing_id: listing.id,
                author_id: user::Id::new(),
                rating: "5".parse().unwrap(),
                comment: "lovely".parse().unwrap(),
            })
            .await
            .unwrap();

        let cmd = AddResponse {
            listing_id: listing.id,
            review_id,
            author_id: owner,
            text: "Thank you!".parse().unwrap(),
        };

        let responded = service.execute(cmd.clone()).await.unwrap();
        assert!(responded
            .review(review_id)
            .unwrap()
            .response
            .is_some());

        let err = service.execute(cmd).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::AlreadyResponded(id) if *id == review_id,
        ));
    }

    #[tokio::test]
    async fn non_owner_response_is_forbidden() {
        let service = Service::in_memory(Memory::new());
        let listing = service.create_test_listing(user::Id::new()).await;

        let (_, review_id) = service
            .execute(AddReview {
                listing_id: listing.id,
                author_id: user::Id::new(),
                rating: "2".parse().unwrap(),
                comment: "noisy street".parse().unwrap(),
            })
            .await
            .unwrap();

        let err = service
            .execute(AddResponse {
                listing_id: listing.id,
                review_id,
                author_id: user::Id::new(),
                text: "Objection".parse().unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotOwner(_)));
    }
}
