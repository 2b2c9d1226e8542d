//! [`Review`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;

pub use self::response::Response;

/// Buyer's review of a [`Listing`].
///
/// [`Listing`]: super::Listing
#[derive(Clone, Debug)]
pub struct Review {
    /// ID of this [`Review`].
    pub id: Id,

    /// [`user::Id`] of the buyer having left this [`Review`].
    pub author: user::Id,

    /// [`Rating`] given by this [`Review`].
    pub rating: Rating,

    /// [`Comment`] of this [`Review`].
    pub comment: Comment,

    /// [`DateTime`] when this [`Review`] was created.
    pub created_at: CreationDateTime,

    /// Owner's [`Response`] to this [`Review`], if any.
    ///
    /// A [`Review`] carries at most one [`Response`], expressed by the
    /// type rather than checked at runtime.
    pub response: Option<Response>,
}

/// ID of a [`Review`].
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

/// Star rating of a [`Review`].
#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Into, PartialEq,
    Serialize,
)]
pub struct Rating(u8);

impl Rating {
    /// Minimum allowed [`Rating`].
    pub const MIN: u8 = 1;

    /// Maximum allowed [`Rating`].
    pub const MAX: u8 = 5;

    /// Creates a new [`Rating`] if the given `stars` are in range.
    #[must_use]
    pub fn new(stars: u8) -> Option<Self> {
        ((Self::MIN..=Self::MAX).contains(&stars)).then_some(Self(stars))
    }

    /// Returns this [`Rating`] as a number of stars.
    #[must_use]
    pub fn stars(self) -> u8 {
        self.0
    }
}

impl FromStr for Rating {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u8>()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Rating`: expected an integer in 1..=5")
    }
}

impl TryFrom<i32> for Rating {
    type Error = &'static str;

    fn try_from(stars: i32) -> Result<Self, Self::Error> {
        u8::try_from(stars)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Rating`: expected an integer in 1..=5")
    }
}

/// Comment of a [`Review`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Comment(String);

impl Comment {
    /// Creates a new [`Comment`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `comment` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(comment: impl Into<String>) -> Self {
        Self(comment.into())
    }

    /// Creates a new [`Comment`] if the given `comment` is valid.
    #[must_use]
    pub fn new(comment: impl Into<String>) -> Option<Self> {
        let comment = comment.into();
        Self::check(&comment).then_some(Self(comment))
    }

    /// Checks whether the given `comment` is a valid [`Comment`].
    fn check(comment: impl AsRef<str>) -> bool {
        let comment = comment.as_ref();
        comment.trim() == comment
            && !comment.is_empty()
            && comment.len() <= 4096
    }
}

impl FromStr for Comment {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Comment`")
    }
}

/// [`DateTime`] when a [`Review`] was created.
pub type CreationDateTime = DateTimeOf<(Review, unit::Creation)>;

pub mod response {
    //! [`Response`] definitions.

    use std::str::FromStr;

    #[cfg(doc)]
    use common::DateTime;
    use common::{unit, DateTimeOf};
    use derive_more::{AsRef, Display};

    use crate::domain::user;

    #[cfg(doc)]
    use super::Review;

    /// Owner's response to a [`Review`].
    #[derive(Clone, Debug)]
    pub struct Response {
        /// [`user::Id`] of the author of this [`Response`].
        ///
        /// Always the owner of the [`Listing`] the [`Review`] belongs to.
        ///
        /// [`Listing`]: crate::domain::Listing
        pub author: user::Id,

        /// [`Text`] of this [`Response`].
        pub text: Text,

        /// [`DateTime`] when this [`Response`] was created.
        pub created_at: CreationDateTime,
    }

    /// Text of a [`Response`].
    #[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
    #[as_ref(forward)]
    pub struct Text(String);

    impl Text {
        /// Creates a new [`Text`].
        ///
        /// # Safety
        ///
        /// The caller must ensure that the given `text` matches the format.
        #[expect(unsafe_code, reason = "bypass")]
        #[must_use]
        pub unsafe fn new_unchecked(text: impl Into<String>) -> Self {
            Self(text.into())
        }

        /// Creates a new [`Text`] if the given `text` is valid.
        #[must_use]
        pub fn new(text: impl Into<String>) -> Option<Self> {
            let text = text.into();
            Self::check(&text).then_some(Self(text))
        }

        /// Checks whether the given `text` is a valid [`Text`].
        fn check(text: impl AsRef<str>) -> bool {
            let text = text.as_ref();
            text.trim() == text && !text.is_empty() && text.len() <= 4096
        }
    }

    impl FromStr for Text {
        type Err = &'static str;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Self::new(s).ok_or("invalid `Text`")
        }
    }

    /// [`DateTime`] when a [`Response`] was created.
    pub type CreationDateTime = DateTimeOf<(Response, unit::Creation)>;
}

#[cfg(test)]
mod spec {
    use super::Rating;

    #[test]
    fn rating_accepts_one_through_five_only() {
        assert!(Rating::new(0).is_none());
        assert!(Rating::new(6).is_none());
        for stars in 1..=5 {
            assert_eq!(Rating::new(stars).unwrap().stars(), stars);
        }
    }

    #[test]
    fn rating_rejects_out_of_range_api_input() {
        assert!(Rating::try_from(6_i32).is_err());
        assert!(Rating::try_from(-1_i32).is_err());
        assert!(Rating::try_from(5_i32).is_ok());
    }

    #[test]
    fn comment_must_be_non_empty_and_trimmed() {
        assert!(super::Comment::new("").is_none());
        assert!(super::Comment::new("  padded  ").is_none());
        assert!(super::Comment::new("fine").is_some());
    }
}
