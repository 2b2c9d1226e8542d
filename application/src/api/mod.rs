//! GraphQL API definitions.

pub mod listing;
mod mutation;
mod query;
pub mod report;
pub mod review;
pub mod scalar;
mod subscription;
pub mod user;

use crate::define_error;

pub use self::{
    listing::Listing, mutation::Mutation, query::Query, review::Review,
    subscription::Subscription,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;

define_error! {
    enum PrivilegeError {
        #[code = "NOT_OWNER"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must own the `Listing`"]
        Owner,
    }
}

define_error! {
    enum PaginationError {
        #[code = "AMBIGUOUS_PAGINATION_ARGUMENTS"]
        #[status = BAD_REQUEST]
        #[message = "Ambiguous pagination arguments"]
        Ambiguous,
    }
}
