//! [`Listing`] definitions.

pub mod report;
pub mod review;
pub mod stats;


#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user;

pub use self::{
    report::Report,
    review::{Response, Review},
    stats::{Favorites, ViewStats},
};

/// Property listing published by a seller.
///
/// The whole engagement state of a property lives on this aggregate:
/// counters, reviews, responses and reports are all mutated within one
/// consistency boundary.
#[derive(Clone, Debug)]
pub struct Listing {
    /// ID of this [`Listing`].
    pub id: Id,

    /// [`user::Id`] of the seller owning this [`Listing`].
    ///
    /// Immutable after creation.
    pub owner: user::Id,

    /// [`Title`] of this [`Listing`].
    pub title: Title,

    /// [`Address`] of the property behind this [`Listing`].
    pub address: Address,

    /// Asking price of this [`Listing`].
    pub price: Money,

    /// [`DateTime`] until which this [`Listing`] is boosted in search,
    /// if it is.
    pub boosted_until: Option<BoostDateTime>,

    /// View counters of this [`Listing`].
    pub stats: ViewStats,

    /// Buyers having favorited this [`Listing`].
    pub favorites: Favorites,

    /// [`Review`]s left on this [`Listing`], in chronological order.
    pub reviews: Vec<Review>,

    /// Moderation [`Report`]s filed against this [`Listing`] or its
    /// [`Review`]s, in chronological order. Append-only.
    pub reports: Vec<Report>,

    /// [`Revision`] of this [`Listing`] for conditional writes.
    pub revision: Revision,

    /// [`DateTime`] when this [`Listing`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Listing`] was deleted, if it was.
    pub deleted_at: Option<DeletionDateTime>,
}

impl Listing {
    /// Indicates whether this [`Listing`] is soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Records a view of this [`Listing`].
    ///
    /// Anonymous views bump the daily counter only; the lifetime counter
    /// deduplicates by the viewer's identity.
    pub fn record_view(
        &mut self,
        viewer: Option<user::Id>,
        now: common::DateTime,
    ) {
        self.stats.record(viewer, now);
    }

    /// Toggles the `user`'s favorite mark on this [`Listing`], returning
    /// whether the [`Listing`] is favorited by the `user` afterwards.
    pub fn toggle_favorite(&mut self, user: user::Id) -> bool {
        self.favorites.toggle(user)
    }

    /// Appends a new [`Review`] to this [`Listing`].
    ///
    /// # Errors
    ///
    /// Errors if the `author` owns this [`Listing`]: sellers may not review
    /// their own properties.
    pub fn add_review(
        &mut self,
        author: user::Id,
        rating: review::Rating,
        comment: review::Comment,
        now: common::DateTime,
    ) -> Result<&Review, AddReviewError> {
        if author == self.owner {
            return Err(AddReviewError::OwnListing);
        }

        self.reviews.push(Review {
            id: review::Id::new(),
            author,
            rating,
            comment,
            created_at: now.coerce(),
            response: None,
        });
        Ok(self.reviews.last().unwrap_or_else(|| unreachable!()))
    }

    /// Returns the [`Review`] with the provided ID, if it exists.
    #[must_use]
    pub fn review(&self, id: review::Id) -> Option<&Review> {
        self.reviews.iter().find(|r| r.id == id)
    }

    /// Attaches the owner's [`Response`] to the [`Review`] with the
    /// provided ID.
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the [`Review`] doesn't exist on this [`Listing`];
    /// - the `author` is not the owner of this [`Listing`];
    /// - the [`Review`] is responded to already (a [`Review`] carries at
    ///   most one [`Response`]).
    pub fn respond(
        &mut self,
        review_id: review::Id,
        author: user::Id,
        text: review::response::Text,
        now: common::DateTime,
    ) -> Result<&Response, RespondError> {
        use RespondError as E;

        if author != self.owner {
            return Err(E::NotOwner);
        }

        let review = self
            .reviews
            .iter_mut()
            .find(|r| r.id == review_id)
            .ok_or(E::ReviewNotExists(review_id))?;
        if review.response.is_some() {
            return Err(E::AlreadyResponded(review_id));
        }

        Ok(review.response.insert(Response {
            author,
            text,
            created_at: now.coerce(),
        }))
    }

    /// Appends a new moderation [`Report`] against this [`Listing`] itself.
    ///
    /// Reports are never deduplicated: the queue is raw input for
    /// downstream human review.
    pub fn report(
        &mut self,
        reporter: user::Id,
        reason: report::Reason,
        now: common::DateTime,
    ) -> &Report {
        self.reports.push(Report {
            reporter,
            reason,
            target: report::Target::Listing,
            created_at: now.coerce(),
        });
        self.reports.last().unwrap_or_else(|| unreachable!())
    }

    /// Appends a new moderation [`Report`] against the [`Review`] with the
    /// provided ID.
    ///
    /// # Errors
    ///
    /// Errors if the [`Review`] doesn't exist on this [`Listing`].
    pub fn report_review(
        &mut self,
        review_id: review::Id,
        reporter: user::Id,
        reason: report::Reason,
        now: common::DateTime,
    ) -> Result<&Report, ReportReviewError> {
        if self.review(review_id).is_none() {
            return Err(ReportReviewError::ReviewNotExists(review_id));
        }

        self.reports.push(Report {
            reporter,
            reason,
            target: report::Target::Review(review_id),
            created_at: now.coerce(),
        });
        Ok(self.reports.last().unwrap_or_else(|| unreachable!()))
    }
}

/// Error of appending a [`Review`] to a [`Listing`].
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum AddReviewError {
    /// Author owns the [`Listing`].
    #[display("owner may not review their own `Listing`")]
    OwnListing,
}

/// Error of attaching a [`Response`] to a [`Review`].
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum RespondError {
    /// [`Review`] is responded to already.
    #[display("`Review(id: {_0})` has a `Response` already")]
    AlreadyResponded(#[error(not(source))] review::Id),

    /// Author is not the [`Listing`] owner.
    #[display("only the `Listing` owner may respond to a `Review`")]
    NotOwner,

    /// [`Review`] doesn't exist.
    #[display("`Review(id: {_0})` does not exist")]
    ReviewNotExists(#[error(not(source))] review::Id),
}

/// Error of reporting a [`Review`].
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum ReportReviewError {
    /// [`Review`] doesn't exist.
    #[display("`Review(id: {_0})` does not exist")]
    ReviewNotExists(#[error(not(source))] review::Id),
}

/// ID of a [`Listing`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Revision of a [`Listing`], stamped on every write.
///
/// The aggregate store refuses an update carrying a stale [`Revision`],
/// so concurrent writers cannot silently overwrite each other.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Revision(u64);

impl Revision {
    /// Returns the [`Revision`] following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Title of a [`Listing`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `title` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title && !title.is_empty() && title.len() <= 512
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Full address of the property behind a [`Listing`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Address(String);

impl Address {
    /// Creates a new [`Address`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Address`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Address`].
    fn check(address: impl AsRef<str>) -> bool {
        let address = address.as_ref();
        address.trim() == address && !address.is_empty() && address.len() <= 512
    }
}

impl FromStr for Address {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Address`")
    }
}

/// [`DateTime`] when a [`Listing`] was created.
pub type CreationDateTime = DateTimeOf<(Listing, unit::Creation)>;

/// [`DateTime`] when a [`Listing`] was deleted.
pub type DeletionDateTime = DateTimeOf<(Listing, unit::Deletion)>;

/// [`DateTime`] until which a [`Listing`] is boosted.
pub type BoostDateTime = DateTimeOf<(Listing, unit::Boost)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::user;

    use super::{review, AddReviewError, Listing, RespondError};

    fn listing(owner: user::Id) -> Listing {
        Listing {
            id: super::Id::new(),
            owner,
            title: "Sunny two-bedroom".parse().unwrap(),
            address: "12 Harbour Rd, Bristol".parse().unwrap(),
            price: "250000GBP".parse().unwrap(),
            boosted_until: None,
            stats: super::ViewStats::default(),
            favorites: super::Favorites::default(),
            reviews: Vec::new(),
            reports: Vec::new(),
            revision: super::Revision::default(),
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        }
    }

    fn rating(n: u8) -> review::Rating {
        review::Rating::new(n).unwrap()
    }

    #[test]
    fn owner_cannot_review_own_listing() {
        let owner = user::Id::new();
        let mut listing = listing(owner);

        let res = listing.add_review(
            owner,
            rating(4),
            "nice place".parse().unwrap(),
            DateTime::now(),
        );

        assert!(matches!(res, Err(AddReviewError::OwnListing)));
        assert!(listing.reviews.is_empty());
    }

    #[test]
    fn duplicate_reviews_by_same_author_are_permitted() {
        let mut listing = listing(user::Id::new());
        let buyer = user::Id::new();

        for _ in 0..2 {
            _ = listing
                .add_review(
                    buyer,
                    rating(5),
                    "great".parse().unwrap(),
                    DateTime::now(),
                )
                .unwrap();
        }

        assert_eq!(listing.reviews.len(), 2);
    }

    #[test]
    fn review_takes_single_response() {
        let owner = user::Id::new();
        let mut listing = listing(owner);
        let review_id = listing
            .add_review(
                user::Id::new(),
                rating(3),
                "okay".parse().unwrap(),
                DateTime::now(),
            )
            .unwrap()
            .id;

        _ = listing
            .respond(review_id, owner, "Thanks!".parse().unwrap(), DateTime::now())
            .unwrap();

        let res = listing.respond(
            review_id,
            owner,
            "Again".parse().unwrap(),
            DateTime::now(),
        );
        assert!(matches!(res, Err(RespondError::AlreadyResponded(id)) if id == review_id));
    }

    #[test]
    fn non_owner_cannot_respond() {
        let mut listing = listing(user::Id::new());
        let review_id = listing
            .add_review(
                user::Id::new(),
                rating(2),
                "meh".parse().unwrap(),
                DateTime::now(),
            )
            .unwrap()
            .id;

        let res = listing.respond(
            review_id,
            user::Id::new(),
            "I disagree".parse().unwrap(),
            DateTime::now(),
        );

        assert!(matches!(res, Err(RespondError::NotOwner)));
        assert!(listing.review(review_id).unwrap().response.is_none());
    }

    #[test]
    fn responding_to_unknown_review_fails() {
        let owner = user::Id::new();
        let mut listing = listing(owner);

        let res = listing.respond(
            review::Id::new(),
            owner,
            "Hello?".parse().unwrap(),
            DateTime::now(),
        );

        assert!(matches!(res, Err(RespondError::ReviewNotExists(_))));
    }

    #[test]
    fn reporting_unknown_review_fails() {
        let mut listing = listing(user::Id::new());

        let res = listing.report_review(
            review::Id::new(),
            user::Id::new(),
            "spam".parse().unwrap(),
            DateTime::now(),
        );

        assert!(matches!(
            res,
            Err(super::ReportReviewError::ReviewNotExists(_)),
        ));
        assert!(listing.reports.is_empty());
    }

    #[test]
    fn reports_are_append_only_without_dedup() {
        let mut listing = listing(user::Id::new());
        let reporter = user::Id::new();

        _ = listing.report(reporter, "scam".parse().unwrap(), DateTime::now());
        _ = listing.report(reporter, "scam".parse().unwrap(), DateTime::now());

        assert_eq!(listing.reports.len(), 2);
    }
}
