//! Aggregate state for the booking engine.

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::search::SearchState;
use crate::types::{Lesson, Notice};
use serde::{Deserialize, Serialize};

/// Lifecycle of an order submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    /// No submission in progress
    #[default]
    Idle,
    /// Order creation or capacity sync in flight
    Submitting,
    /// Order created and every capacity update applied
    Succeeded {
        /// Server-assigned order id
        order_id: String,
    },
    /// Submission failed; the error says what state the backend was left in
    Failed {
        /// Human-readable failure description
        error: String,
    },
}

/// Everything the engine tracks for one browser session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingState {
    /// Canonical lesson store plus load lifecycle
    pub catalog: Catalog,
    /// Search debouncer and projection
    pub search: SearchState,
    /// The cart ledger
    pub cart: Cart,
    /// Order submission lifecycle
    pub submission: SubmissionStatus,
    /// Current user-facing notice, if any
    pub notice: Option<Notice>,
}

impl BookingState {
    /// The lessons the user is currently looking at: the search projection
    /// while active, the full catalog otherwise.
    pub fn visible_lessons(&self) -> Vec<&Lesson> {
        match self.search.active_ids() {
            Some(ids) => self.catalog.resolve(ids).collect(),
            None => self.catalog.displayed().collect(),
        }
    }
}
