//! Search debouncer and projection state.
//!
//! Requests are debounced with a delayed action and ordered with a
//! generation counter: every keystroke bumps `latest_seq`, and both the
//! debounce timer firing and the network response carry the seq they were
//! issued under. Anything carrying a stale seq is discarded, which gives
//! "last query wins" without cancelling in-flight requests.

use crate::types::LessonId;
use serde::{Deserialize, Serialize};

/// Where the debouncer currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchPhase {
    /// No query active
    #[default]
    Idle,
    /// Debounce timer armed, request not yet sent
    Pending,
    /// Request in flight
    Fetching,
}

/// State of the search projection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    /// Trimmed text of the most recent keystroke
    query: String,
    /// Generation counter, bumped on every keystroke (including clears)
    latest_seq: u64,
    /// Debouncer phase
    pub phase: SearchPhase,
    /// Ids of the displayed search results, `None` when the projection is
    /// inactive and the catalog view is authoritative
    active: Option<Vec<LessonId>>,
}

impl SearchState {
    /// Record a keystroke with a non-empty trimmed query. Returns the seq
    /// the caller must tag its debounce timer with.
    pub fn issue(&mut self, query: String) -> u64 {
        self.query = query;
        self.latest_seq += 1;
        self.phase = SearchPhase::Pending;
        self.latest_seq
    }

    /// Deactivate the projection (empty query or catalog refetch).
    ///
    /// The seq is bumped so an in-flight response for an earlier query can
    /// no longer re-activate a cleared search.
    pub fn clear(&mut self) {
        self.query.clear();
        self.latest_seq += 1;
        self.phase = SearchPhase::Idle;
        self.active = None;
    }

    /// Whether `seq` is the latest issued generation
    #[must_use]
    pub const fn is_current(&self, seq: u64) -> bool {
        seq == self.latest_seq
    }

    /// Mark the current generation's request as dispatched
    pub const fn mark_fetching(&mut self) {
        self.phase = SearchPhase::Fetching;
    }

    /// Adopt results for the current generation
    pub fn adopt(&mut self, ids: Vec<LessonId>) {
        self.active = Some(ids);
        self.phase = SearchPhase::Idle;
    }

    /// Best-effort fallback: drop the projection but keep the query text
    pub fn fall_back(&mut self) {
        self.active = None;
        self.phase = SearchPhase::Idle;
    }

    /// The trimmed query of the latest keystroke
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Displayed result ids, if the projection is active
    #[must_use]
    pub fn active_ids(&self) -> Option<&[LessonId]> {
        self.active.as_deref()
    }

    /// Whether the search projection is currently the displayed view
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }
}
