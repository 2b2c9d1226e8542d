//! GraphQL [`Mutation`]s definitions.

use common::Money;
use juniper::graphql_object;
use service::{command, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Publishes a new `Listing` owned by the current `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            address = %address,
            gql.name = "createListing",
            otel.name = Self::SPAN_NAME,
            title = %title,
        ),
    )]
    pub async fn create_listing(
        title: api::listing::Title,
        address: api::listing::Address,
        price: Money,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateListing {
                owner_id: my_id.into(),
                title: title.into(),
                address: address.into(),
                price,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Records a single view of the `Listing` with the provided ID.
    ///
    /// Open to anonymous callers: an anonymous view moves the daily traffic
    /// counter only, while an authenticated one also counts towards the
    /// deduplicated lifetime counter.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the provided ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "recordView",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn record_view(
        id: api::listing::Id,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let viewer = ctx.try_current_session().await?.map(|s| s.user_id);

        ctx.service()
            .execute(command::RecordView {
                listing_id: id.into(),
                viewer_id: viewer.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Toggles the current `User`'s favorite mark on the `Listing` with the
    /// provided ID.
    ///
    /// Toggling twice restores the original state.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the provided ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "toggleFavorite",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn toggle_favorite(
        id: api::listing::Id,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::ToggleFavorite {
                listing_id: id.into(),
                user_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Leaves a new `Review` on the `Listing` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_RATING` - the provided rating is out of the 1..=5 range;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the provided ID does not
    ///                          exist;
    /// - `OWN_LISTING` - the current `User` owns the `Listing` and may not
    ///                   review it.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "addReview",
            id = %id,
            otel.name = Self::SPAN_NAME,
            rating = %rating,
        ),
    )]
    pub async fn add_review(
        id: api::listing::Id,
        rating: i32,
        comment: api::review::Comment,
        ctx: &Context,
    ) -> Result<api::Review, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let rating = rating
            .try_into()
            .map_err(|_| RatingError::OutOfRange.into())
            .map_err(ctx.error())?;

        let (listing, review_id) = ctx
            .service()
            .execute(command::AddReview {
                listing_id: id.into(),
                author_id: my_id.into(),
                rating,
                comment: comment.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        listing
            .review(review_id)
            .cloned()
            .map(Into::into)
            .ok_or_else(|| Error::internal(&"created `Review` not found"))
            .map_err(ctx.error())
    }

    /// Attaches the owner's response to the `Review` with the provided ID.
    ///
    /// A `Review` carries at most one response.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the provided ID does not
    ///                          exist;
    /// - `NOT_OWNER` - the current `User` does not own the `Listing`;
    /// - `RESPONSE_EXISTS` - the `Review` is responded to already;
    /// - `REVIEW_NOT_EXISTS` - the `Review` with the provided ID does not
    ///                         exist on the `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "addResponse",
            id = %id,
            otel.name = Self::SPAN_NAME,
            review_id = %review_id,
        ),
    )]
    pub async fn add_response(
        id: api::listing::Id,
        review_id: api::review::Id,
        text: api::review::ResponseText,
        ctx: &Context,
    ) -> Result<api::Review, Error> {
        let my_id = ctx.current_session().await?.user_id;

        let listing = ctx
            .service()
            .execute(command::AddResponse {
                listing_id: id.into(),
                review_id: review_id.into(),
                author_id: my_id.into(),
                text: text.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        listing
            .review(review_id.into())
            .cloned()
            .map(Into::into)
            .ok_or_else(|| Error::internal(&"responded `Review` not found"))
            .map_err(ctx.error())
    }

    /// Files a moderation report against the `Listing` with the provided ID.
    ///
    /// Reports are append-only and never deduplicated: repeated reports by
    /// the same `User` are all preserved for human review.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the provided ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "reportListing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn report_listing(
        id: api::listing::Id,
        reason: api::report::Reason,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::ReportListing {
                listing_id: id.into(),
                reporter_id: my_id.into(),
                reason: reason.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Files a moderation report against the `Review` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the provided ID does not
    ///                          exist;
    /// - `REVIEW_NOT_EXISTS` - the `Review` with the provided ID does not
    ///                         exist on the `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "reportComment",
            id = %id,
            otel.name = Self::SPAN_NAME,
            review_id = %review_id,
        ),
    )]
    pub async fn report_comment(
        id: api::listing::Id,
        review_id: api::review::Id,
        reason: api::report::Reason,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::ReportComment {
                listing_id: id.into(),
                review_id: review_id.into(),
                reporter_id: my_id.into(),
                reason: reason.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Listing` with the provided ID.
    ///
    /// The `Listing` vanishes from all reads immediately, together with its
    /// reviews, responses and reports.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the provided ID does not
    ///                          exist;
    /// - `NOT_OWNER` - the current `User` does not own the `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteListing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_listing(
        id: api::listing::Id,
        ctx: &Context,
    ) -> Result<api::listing::Id, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteListing {
                listing_id: id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|listing| listing.id.into())
    }
}

impl AsError for command::create_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::record_view::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LISTING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Listing` with the provided ID does not exist"]
                ListingNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) => Error::ListingNotExists.into(),
        })
    }
}

impl AsError for command::toggle_favorite::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LISTING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Listing` with the provided ID does not exist"]
                ListingNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) => Error::ListingNotExists.into(),
        })
    }
}

impl AsError for command::add_review::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LISTING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Listing` with the provided ID does not exist"]
                ListingNotExists,

                #[code = "OWN_LISTING"]
                #[status = FORBIDDEN]
                #[message = "Owner may not review their own `Listing`"]
                OwnListing,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) => Error::ListingNotExists.into(),
            Self::OwnListing(_) => Error::OwnListing.into(),
        })
    }
}

impl AsError for command::add_response::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LISTING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Listing` with the provided ID does not exist"]
                ListingNotExists,

                #[code = "RESPONSE_EXISTS"]
                #[status = CONFLICT]
                #[message = "`Review` with the provided ID is responded to \
                             already"]
                AlreadyResponded,

                #[code = "REVIEW_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Review` with the provided ID does not exist"]
                ReviewNotExists,
            }
        }

        Some(match self {
            Self::AlreadyResponded(_) => Error::AlreadyResponded.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) => Error::ListingNotExists.into(),
            Self::NotOwner(_) => api::PrivilegeError::Owner.into(),
            Self::ReviewNotExists(_) => Error::ReviewNotExists.into(),
        })
    }
}

impl AsError for command::report_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LISTING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Listing` with the provided ID does not exist"]
                ListingNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) => Error::ListingNotExists.into(),
        })
    }
}

impl AsError for command::report_comment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LISTING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Listing` with the provided ID does not exist"]
                ListingNotExists,

                #[code = "REVIEW_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Review` with the provided ID does not exist"]
                ReviewNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) => Error::ListingNotExists.into(),
            Self::ReviewNotExists(_) => Error::ReviewNotExists.into(),
        })
    }
}

impl AsError for command::delete_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LISTING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Listing` with the provided ID does not exist"]
                ListingNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) => Error::ListingNotExists.into(),
            Self::NotOwner(_) => api::PrivilegeError::Owner.into(),
        })
    }
}

define_error! {
    enum RatingError {
        #[code = "INVALID_RATING"]
        #[status = BAD_REQUEST]
        #[message = "`Rating` must be an integer in 1..=5"]
        OutOfRange,
    }
}
