//! History window bounds.
//!
//! A [`HistoryWindow`] describes which slice of a conversation is read back
//! before each completion call. Both bounds are optional and compose: the
//! time bound narrows the candidate set first, then the count bound keeps the
//! most recent survivors.

use std::num::NonZeroU32;

use chrono::{DateTime, Duration, SubsecRound, Utc};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryWindow {
    /// Only messages newer than `now - time_limit`.
    pub time_limit: Option<Duration>,
    /// Only the most recent `count_limit` messages.
    pub count_limit: Option<NonZeroU32>,
}

impl HistoryWindow {
    /// A window with no bounds: the full conversation.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Restrict to messages created within `limit` of the read time.
    pub fn within(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Keep only the `count` most recent messages.
    pub fn latest(mut self, count: NonZeroU32) -> Self {
        self.count_limit = Some(count);
        self
    }

    /// Build a window from the plain session options.
    ///
    /// Zero is treated as "no limit" for both options.
    pub fn from_limits(message_limit: Option<u32>, time_limit_hours: Option<u32>) -> Self {
        let mut window = Self::unbounded();
        if let Some(hours) = time_limit_hours.filter(|h| *h > 0) {
            window = window.within(Duration::hours(i64::from(hours)));
        }
        if let Some(count) = message_limit.and_then(NonZeroU32::new) {
            window = window.latest(count);
        }
        window
    }

    /// Earliest admissible timestamp for a read performed at `now`.
    ///
    /// Truncated to whole seconds, matching the resolution of stored
    /// timestamps. A limit reaching past the earliest representable time
    /// admits every message, so there is no cutoff.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.time_limit
            .and_then(|limit| now.checked_sub_signed(limit))
            .map(|cutoff| cutoff.trunc_subsecs(0))
    }

    pub fn is_unbounded(&self) -> bool {
        self.time_limit.is_none() && self.count_limit.is_none()
    }
}
