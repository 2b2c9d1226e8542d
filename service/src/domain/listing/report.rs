//! Moderation [`Report`] definitions.

use std::str::FromStr;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display};

use crate::domain::user;

use super::review;

/// Moderation report filed by a user against a [`Listing`] or one of its
/// [`Review`]s.
///
/// Reports are append-only input for downstream human review: the model
/// enforces no dedup and triggers no automated takedown.
///
/// [`Listing`]: super::Listing
/// [`Review`]: super::Review
#[derive(Clone, Debug)]
pub struct Report {
    /// [`user::Id`] of the user having filed this [`Report`].
    pub reporter: user::Id,

    /// [`Reason`] of this [`Report`].
    pub reason: Reason,

    /// [`Target`] this [`Report`] is filed against.
    pub target: Target,

    /// [`DateTime`] when this [`Report`] was created.
    pub created_at: CreationDateTime,
}

/// Target of a [`Report`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Target {
    /// The [`Listing`] itself.
    ///
    /// [`Listing`]: super::Listing
    Listing,

    /// A [`Review`] on the [`Listing`].
    ///
    /// [`Listing`]: super::Listing
    /// [`Review`]: super::Review
    Review(review::Id),
}

/// Reason of a [`Report`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Reason(String);

impl Reason {
    /// Creates a new [`Reason`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `reason` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    /// Creates a new [`Reason`] if the given `reason` is valid.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Option<Self> {
        let reason = reason.into();
        Self::check(&reason).then_some(Self(reason))
    }

    /// Checks whether the given `reason` is a valid [`Reason`].
    fn check(reason: impl AsRef<str>) -> bool {
        let reason = reason.as_ref();
        reason.trim() == reason && !reason.is_empty() && reason.len() <= 1024
    }
}

impl FromStr for Reason {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Reason`")
    }
}

/// [`DateTime`] when a [`Report`] was created.
pub type CreationDateTime = DateTimeOf<(Report, unit::Creation)>;
