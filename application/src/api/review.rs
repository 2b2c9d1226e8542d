//! [`Review`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, api::scalar, Context};

/// A buyer's review of a `Listing`.
#[derive(Clone, Debug, From)]
pub struct Review(domain::listing::Review);

/// A buyer's review of a `Listing`.
#[graphql_object(context = Context)]
impl Review {
    /// Unique identifier of this `Review`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Review.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// ID of the `User` having left this `Review`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Review.author",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn author(&self) -> api::user::Id {
        self.0.author.into()
    }

    /// Star rating of this `Review`, in 1..=5.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Review.rating",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn rating(&self) -> i32 {
        self.0.rating.stars().into()
    }

    /// Comment of this `Review`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Review.comment",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn comment(&self) -> Comment {
        self.0.comment.clone().into()
    }

    /// Owner's `Response` to this `Review`, if any.
    ///
    /// A `Review` carries at most one `Response`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Review.response",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn response(&self) -> Option<Response> {
        self.0.response.clone().map(Into::into)
    }

    /// `DateTime` when this `Review` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Review.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Owner's response to a `Review`.
#[derive(Clone, Debug, From)]
pub struct Response(domain::listing::review::Response);

/// Owner's response to a `Review`.
#[graphql_object(name = "ReviewResponse", context = Context)]
impl Response {
    /// ID of the `User` having authored this `ReviewResponse`.
    ///
    /// Always the owner of the `Listing` the `Review` belongs to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "ReviewResponse.author",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn author(&self) -> api::user::Id {
        self.0.author.into()
    }

    /// Text of this `ReviewResponse`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "ReviewResponse.text",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn text(&self) -> ResponseText {
        self.0.text.clone().into()
    }

    /// `DateTime` when this `ReviewResponse` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "ReviewResponse.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Review`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::listing::review::Id)]
#[into(domain::listing::review::Id)]
#[graphql(name = "ReviewId", transparent)]
pub struct Id(Uuid);

/// Comment of a `Review`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ReviewComment",
    with = scalar::Via::<domain::listing::review::Comment>,
)]
pub struct Comment(domain::listing::review::Comment);

/// Text of a `ReviewResponse`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ReviewResponseText",
    with = scalar::Via::<domain::listing::review::response::Text>,
)]
pub struct ResponseText(domain::listing::review::response::Text);
