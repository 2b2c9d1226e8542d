//! User-related definitions.
//!
//! Users themselves live in the external identity provider. The engagement
//! core only ever sees their canonical [`Id`], and trusts it verbatim.

use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID of a platform user.
///
/// The single identity representation used end-to-end: issued by the
/// identity provider, compared nowhere else in any other shape.
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
