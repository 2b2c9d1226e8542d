//! Background [`Task`]s definitions.

mod background;
pub mod prune_deleted_listings;

pub use common::Handler as Task;

pub use self::{
    background::Background, prune_deleted_listings::PruneDeletedListings,
};
