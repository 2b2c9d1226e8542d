//! Moderation report definitions.
//!
//! Reports are write-only for the public API: they are filed through
//! mutations and consumed by a separate moderation tooling, so only the
//! input scalar lives here.

use derive_more::{AsRef, Display, From, Into};
use juniper::GraphQLScalar;
use service::domain;

use crate::api::scalar;

/// Reason of a moderation report.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ReportReason",
    with = scalar::Via::<domain::listing::report::Reason>,
)]
pub struct Reason(domain::listing::report::Reason);
