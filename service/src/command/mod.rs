//! [`Command`] definition.

pub mod add_response;
pub mod add_review;
pub mod create_listing;
pub mod delete_listing;
pub mod record_view;
pub mod report_comment;
pub mod report_listing;
pub mod toggle_favorite;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_response::AddResponse, add_review::AddReview,
    create_listing::CreateListing, delete_listing::DeleteListing,
    record_view::RecordView, report_comment::ReportComment,
    report_listing::ReportListing, toggle_favorite::ToggleFavorite,
};
