//! [`Command`] for reporting a [`Listing`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        listing::{self, report},
        user, Listing,
    },
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::listing::Report;

use super::Command;

/// [`Command`] for filing a moderation [`Report`] against a [`Listing`].
///
/// Reports always append: repeated reports by the same [`user`] are kept
/// as separate queue entries.
#[derive(Clone, Debug)]
pub struct ReportListing {
    /// ID of the [`Listing`] being reported.
    pub listing_id: listing::Id,

    /// ID of the reporting [`user`].
    pub reporter_id: user::Id,

    /// [`report::Reason`] of the new [`Report`].
    pub reason: report::Reason,
}

impl<Db> Command<ReportListing> for Service<Db>
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
        cmd: ReportListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReportListing {
            listing_id,
            reporter_id,
            reason,
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

        _ = listing.report(reporter_id, reason, DateTime::now());

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

/// Error of [`ReportListing`] [`Command`] execution.
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
