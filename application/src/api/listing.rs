//! [`Listing`]-related definitions.

use std::future;

use common::{DateTime, DateTimeOf, Handler as _, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// A property listing.
#[derive(Clone, Debug, From)]
pub struct Listing {
    /// ID of this [`Listing`].
    id: Id,

    /// Underlying [`domain::Listing`].
    listing: OnceCell<domain::Listing>,
}

impl From<domain::Listing> for Listing {
    fn from(listing: domain::Listing) -> Self {
        Self {
            id: listing.id.into(),
            listing: OnceCell::new_with(Some(listing)),
        }
    }
}

impl Listing {
    /// Creates a new [`Listing`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Listing`] with the provided ID exists,
    /// otherwise accessing this [`Listing`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            listing: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Listing`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Listing`] doesn't exist.
    async fn listing(&self, ctx: &Context) -> Result<&domain::Listing, Error> {
        let id = self.id.into();
        self.listing
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::listing::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|u| {
                        future::ready(u.ok_or_else(|| {
                            api::query::ListingError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A property listing.
#[graphql_object(context = Context)]
impl Listing {
    /// Unique identifier of this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Title of this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.title",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn title(&self, ctx: &Context) -> Result<Title, Error> {
        Ok(self.listing(ctx).await?.title.clone().into())
    }

    /// Address of the property behind this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.address",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn address(&self, ctx: &Context) -> Result<Address, Error> {
        Ok(self.listing(ctx).await?.address.clone().into())
    }

    /// Asking price of this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.price",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn price(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.listing(ctx).await?.price)
    }

    /// ID of the seller owning this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.owner",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn owner(&self, ctx: &Context) -> Result<api::user::Id, Error> {
        Ok(self.listing(ctx).await?.owner.into())
    }

    /// `DateTime` until which this `Listing` is boosted in search, if it is.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.boostedUntil",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn boosted_until(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.listing(ctx).await?.boosted_until.map(DateTimeOf::coerce))
    }

    /// Lifetime view count of this `Listing`.
    ///
    /// Deduplicated by viewer identity: a returning viewer is counted once.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.views",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn views(&self, ctx: &Context) -> Result<i32, Error> {
        let views = self.listing(ctx).await?.stats.views();
        Ok(i32::try_from(views).unwrap_or(i32::MAX))
    }

    /// View count of this `Listing` for the current UTC day.
    ///
    /// Raw traffic counter: every recorded view bumps it, and it resets on
    /// the calendar day boundary.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.viewsToday",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn views_today(&self, ctx: &Context) -> Result<i32, Error> {
        let listing = self.listing(ctx).await?;
        let today = (listing.stats.today_date() == Some(DateTime::now().date()))
            .then(|| listing.stats.today())
            .unwrap_or_default();
        Ok(i32::try_from(today).unwrap_or(i32::MAX))
    }

    /// Count of users having favorited this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.favorites",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn favorites(&self, ctx: &Context) -> Result<i32, Error> {
        let count = self.listing(ctx).await?.favorites.count();
        Ok(i32::try_from(count).unwrap_or(i32::MAX))
    }

    /// Indicator whether the current `User` has favorited this `Listing`.
    ///
    /// Always `false` for anonymous callers.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.isFavorited",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_favorited(&self, ctx: &Context) -> Result<bool, Error> {
        let session = ctx.try_current_session().await?;
        let listing = self.listing(ctx).await?;
        Ok(session
            .map_or(false, |s| listing.favorites.contains(s.user_id.into())))
    }

    /// `Review`s left on this `Listing`, in chronological order.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.reviews",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn reviews(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::Review>, Error> {
        Ok(self
            .listing(ctx)
            .await?
            .reviews
            .iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// Count of moderation reports filed against this `Listing` and its
    /// `Review`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_OWNER` - the current `User` does not own this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.reportCount",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn report_count(&self, ctx: &Context) -> Result<i32, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let listing = self.listing(ctx).await?;
        if listing.owner != my_id.into() {
            return Err(ctx.error()(api::PrivilegeError::Owner.into()));
        }
        Ok(i32::try_from(listing.reports.len()).unwrap_or(i32::MAX))
    }

    /// `DateTime` when this `Listing` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.listing(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Listing`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::listing::Id)]
#[into(domain::listing::Id)]
#[graphql(name = "ListingId", transparent)]
pub struct Id(Uuid);

/// Title of a `Listing`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingTitle",
    with = scalar::Via::<domain::listing::Title>,
)]
pub struct Title(domain::listing::Title);

/// Address of the property behind a `Listing`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingAddress",
    with = scalar::Via::<domain::listing::Address>,
)]
pub struct Address(domain::listing::Address);

pub mod list {
    //! Definitions related to the [`Listing`] list.

    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLScalar};
    use service::{query, read, Query as _};

    use super::{Id, Listing};
    use crate::{api::scalar, AsError, Context, Error};

    /// Cursor for the `Listing` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[from(Id, read::listing::list::Cursor)]
    #[graphql(
        name = "ListingListCursor",
        with = scalar::Via::<read::listing::list::Cursor>,
    )]
    pub struct Cursor(pub read::listing::list::Cursor);

    /// Edge in the [`Listing`] list.
    #[derive(Clone, Copy, Debug, From, Into)]
    pub struct Edge(read::listing::list::Edge);

    /// Edge in the `Listing` list.
    #[graphql_object(name = "ListingListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `ListingListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `ListingListEdge`.
        #[must_use]
        pub fn node(&self) -> Listing {
            #[expect(
                unsafe_code,
                reason = "`Edge` loaded from the store guarantees `Listing` \
                          existence"
            )]
            unsafe {
                Listing::new_unchecked(self.0.node)
            }
        }
    }

    /// Connection of the [`Listing`] list.
    #[derive(Clone, Debug, From, Into)]
    pub struct Connection(read::listing::list::Connection);

    /// Connection of the `Listing` list.
    #[graphql_object(name = "ListingListConnection", context = Context)]
    impl Connection {
        /// Edges of this `ListingListConnection`.
        #[must_use]
        pub fn edges(&self) -> Vec<Edge> {
            self.0.edges.iter().copied().map(Into::into).collect()
        }

        /// Information about the page.
        #[must_use]
        pub fn page_info(&self) -> PageInfo {
            PageInfo {
                info: self.0.page_info(),
                start_cursor: self.0.edges.first().map(|e| e.cursor.into()),
                end_cursor: self.0.edges.last().map(|e| e.cursor.into()),
            }
        }
    }

    /// Information about a [`Connection`] page.
    #[derive(Clone, Copy, Debug)]
    pub struct PageInfo {
        /// Underlying [`read::listing::list::PageInfo`].
        info: read::listing::list::PageInfo,

        /// Start cursor of the page.
        start_cursor: Option<Cursor>,

        /// End cursor of the page.
        end_cursor: Option<Cursor>,
    }

    /// Information about a `ListingListConnection` page.
    #[graphql_object(name = "ListingListPageInfo", context = Context)]
    impl PageInfo {
        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.info.has_next_page
        }

        /// Indicator whether there is a previous page.
        #[must_use]
        pub fn has_previous_page(&self) -> bool {
            self.info.has_previous_page
        }

        /// Start cursor of the page.
        #[must_use]
        pub fn start_cursor(&self) -> &Option<Cursor> {
            &self.start_cursor
        }

        /// End cursor of the page.
        #[must_use]
        pub fn end_cursor(&self) -> &Option<Cursor> {
            &self.end_cursor
        }

        /// Total `Listing` count.
        pub async fn total_count(&self, ctx: &Context) -> Result<i32, Error> {
            ctx.service()
                .execute(query::listings::TotalCount::by(()))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())
                .map(Into::into)
        }
    }
}
