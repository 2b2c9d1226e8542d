//! View and favorite counters of a [`Listing`].
//!
//! [`Listing`]: super::Listing

use std::collections::HashSet;

use common::{Date, DateTime};

use crate::domain::user;

/// Count of [`Listing`] views.
///
/// [`Listing`]: super::Listing
pub type ViewCount = u64;

/// View counters of a [`Listing`].
///
/// The lifetime counter deduplicates by viewer identity, while the daily
/// counter measures raw traffic and so bumps on every recorded view. The
/// asymmetry is deliberate.
///
/// [`Listing`]: super::Listing
#[derive(Clone, Debug, Default)]
pub struct ViewStats {
    /// Lifetime view count. Monotonically non-decreasing.
    views: ViewCount,

    /// View count for [`ViewStats::today_date`].
    today: ViewCount,

    /// [`Date`] the [`ViewStats::today`] counter belongs to.
    ///
    /// A counter stamped with any other date is stale and resets before
    /// the next increment.
    today_date: Option<Date>,

    /// Identities having viewed the [`Listing`] at least once.
    ///
    /// Write-only dedup signal, never exposed to clients.
    ///
    /// [`Listing`]: super::Listing
    viewers: HashSet<user::Id>,
}

impl ViewStats {
    /// Records a single view happening at the `now` moment.
    ///
    /// A repeated view by the same `viewer` bumps the daily counter but
    /// not the lifetime one. An anonymous view bumps the daily counter
    /// only.
    pub fn record(&mut self, viewer: Option<user::Id>, now: DateTime) {
        let today = now.date();
        if self.today_date != Some(today) {
            self.today = 0;
            self.today_date = Some(today);
        }
        self.today += 1;

        if let Some(viewer) = viewer {
            if self.viewers.insert(viewer) {
                self.views += 1;
            }
        }
    }

    /// Returns the lifetime view count.
    #[must_use]
    pub fn views(&self) -> ViewCount {
        self.views
    }

    /// Returns the view count of the day this [`ViewStats`] was last
    /// recorded on.
    #[must_use]
    pub fn today(&self) -> ViewCount {
        self.today
    }

    /// Returns the [`Date`] the [`ViewStats::today`] counter belongs to.
    #[must_use]
    pub fn today_date(&self) -> Option<Date> {
        self.today_date
    }
}

/// Buyers having favorited a [`Listing`].
///
/// The public count is always the size of the underlying set, so the two
/// can never diverge.
///
/// [`Listing`]: super::Listing
#[derive(Clone, Debug, Default)]
pub struct Favorites(HashSet<user::Id>);

impl Favorites {
    /// Toggles the `user`'s membership, returning whether the `user` is a
    /// favoriter afterwards.
    ///
    /// Toggling twice by the same `user` restores the original state.
    pub fn toggle(&mut self, user: user::Id) -> bool {
        if self.0.remove(&user) {
            false
        } else {
            _ = self.0.insert(user);
            true
        }
    }

    /// Indicates whether the `user` has favorited the [`Listing`].
    ///
    /// [`Listing`]: super::Listing
    #[must_use]
    pub fn contains(&self, user: user::Id) -> bool {
        self.0.contains(&user)
    }

    /// Returns the favorite count.
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::user;

    use super::{Favorites, ViewStats};

    fn at(rfc3339: &str) -> DateTime {
        DateTime::from_rfc3339(rfc3339).unwrap()
    }

    #[test]
    fn repeat_viewer_counted_once_for_lifetime_twice_for_today() {
        let mut stats = ViewStats::default();
        let viewer = user::Id::new();
        let now = at("2024-06-10T10:00:00Z");

        stats.record(Some(viewer), now);
        stats.record(Some(viewer), now);

        assert_eq!(stats.views(), 1);
        assert_eq!(stats.today(), 2);
        assert_eq!(stats.today_date(), Some(now.date()));
    }

    #[test]
    fn daily_counter_resets_across_date_boundary() {
        let mut stats = ViewStats::default();

        stats.record(Some(user::Id::new()), at("2024-06-10T23:59:00Z"));
        stats.record(Some(user::Id::new()), at("2024-06-10T23:59:30Z"));
        assert_eq!(stats.today(), 2);

        let next_day = at("2024-06-11T00:01:00Z");
        stats.record(Some(user::Id::new()), next_day);

        assert_eq!(stats.today(), 1);
        assert_eq!(stats.today_date(), Some(next_day.date()));
        assert_eq!(stats.views(), 3);
    }

    #[test]
    fn anonymous_view_skips_lifetime_counter() {
        let mut stats = ViewStats::default();

        stats.record(None, at("2024-06-10T12:00:00Z"));

        assert_eq!(stats.views(), 0);
        assert_eq!(stats.today(), 1);
    }

    #[test]
    fn favorite_count_always_matches_membership() {
        let mut favorites = Favorites::default();
        let (u1, u2) = (user::Id::new(), user::Id::new());

        assert!(favorites.toggle(u1));
        assert_eq!(favorites.count(), 1);

        assert!(favorites.toggle(u2));
        assert_eq!(favorites.count(), 2);

        assert!(!favorites.toggle(u1));
        assert_eq!(favorites.count(), 1);
        assert!(!favorites.contains(u1));
        assert!(favorites.contains(u2));
    }

    #[test]
    fn favorite_toggle_pair_is_identity() {
        let mut favorites = Favorites::default();
        let user = user::Id::new();

        assert!(favorites.toggle(user));
        assert!(!favorites.toggle(user));

        assert_eq!(favorites.count(), 0);
        assert!(!favorites.contains(user));
    }
}
