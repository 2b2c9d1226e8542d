//! [`Listing`]-related read definitions.

#[cfg(doc)]
use crate::domain::Listing;

pub mod list {
    //! [`Listing`] list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::listing;
    #[cfg(doc)]
    use crate::domain::Listing;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = listing::Id;

    /// Cursor pointing to a specific [`Listing`] in a list.
    pub type Cursor = listing::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`listing::Title`] (or its part) to search for.
        pub title: Option<listing::Title>,
    }

    /// Total count of [`Listing`] list items.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}
