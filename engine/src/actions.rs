//! Actions processed by the booking reducer.
//!
//! User intents and async results share one action type; the seq fields on
//! the search actions implement the generation-counter ordering rule.

use crate::types::{Customer, Lesson, LessonId};
use serde::{Deserialize, Serialize};

/// Every input the booking reducer can process.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BookingAction {
    /// Fetch (or refetch) the full catalog
    LoadCatalog,
    /// Catalog fetch succeeded
    CatalogLoaded {
        /// The complete lesson list; replaces local state wholesale
        lessons: Vec<Lesson>,
    },
    /// Catalog fetch failed
    CatalogLoadFailed {
        /// What went wrong
        error: String,
    },

    /// The search input changed (raw, untrimmed text)
    QueryChanged {
        /// Current content of the search box
        query: String,
    },
    /// Debounce timer fired for generation `seq`
    SearchDue {
        /// Generation the timer was armed under
        seq: u64,
    },
    /// Search response arrived for generation `seq`
    SearchSucceeded {
        /// Generation the request was dispatched under
        seq: u64,
        /// Matching lessons as the server sees them
        lessons: Vec<Lesson>,
    },
    /// Search request failed for generation `seq`
    SearchFailed {
        /// Generation the request was dispatched under
        seq: u64,
        /// What went wrong
        error: String,
    },

    /// Add one space of a lesson to the cart
    AddToCart {
        /// The lesson to book
        lesson_id: LessonId,
    },
    /// Remove a lesson's entire cart line
    RemoveFromCart {
        /// The lesson to drop
        lesson_id: LessonId,
    },
    /// Clear the current user-facing notice
    DismissNotice,

    /// Submit the cart as an order
    SubmitOrder {
        /// Validated checkout info
        customer: Customer,
    },
    /// `POST /order` succeeded
    OrderCreated {
        /// Server-assigned order id
        order_id: String,
    },
    /// `POST /order` failed; nothing happened server-side
    OrderCreateFailed {
        /// What went wrong
        error: String,
    },
    /// The per-lesson capacity fan-out settled
    CapacitySyncSettled {
        /// The order the updates belonged to
        order_id: String,
        /// Lessons whose `PUT /lessons/:id` failed, with the reason
        failures: Vec<(LessonId, String)>,
    },
}
