//! [`Command`] for leaving a [`Review`] on a [`Listing`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        listing::{self, review, AddReviewError},
        user, Listing,
    },
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::listing::Review;

use super::Command;

/// [`Command`] for leaving a new [`Review`] on a [`Listing`].
#[derive(Clone, Debug)]
pub struct AddReview {
    /// ID of the [`Listing`] being reviewed.
    pub listing_id: listing::Id,

    /// ID of the buyer leaving the [`Review`].
    pub author_id: user::Id,

    /// [`review::Rating`] of the new [`Review`].
    pub rating: review::Rating,

    /// [`review::Comment`] of the new [`Review`].
    pub comment: review::Comment,
}

impl<Db> Command<AddReview> for Service<Db>
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
    type Ok = (Listing, review::Id);
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AddReview) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddReview {
            listing_id,
            author_id,
            rating,
            comment,
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

        let review_id = listing
            .add_review(author_id, rating, comment, DateTime::now())
            .map_err(|AddReviewError::OwnListing| E::OwnListing(author_id))
            .map_err(tracerr::wrap!())?
            .id;

        tx.execute(Update(listing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok((listing, review_id))
    }
}

/// Error of [`AddReview`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`Listing`] owner attempted to review their own [`Listing`].
    #[display("`User(id: {_0})` owns the `Listing` being reviewed")]
    OwnListing(#[error(not(source))] user::Id),
}
