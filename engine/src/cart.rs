//! Cart ledger: the user's pending (lesson, quantity) selections.
//!
//! The cart owns the add/remove state transitions and is the only writer of
//! optimistic capacity changes into the catalog's shared lesson map. Both
//! operations are synchronous and never touch the network.

use crate::types::{CartLine, LessonId};
use serde::{Deserialize, Serialize};

/// The set of cart lines, in first-add order.
///
/// Invariant: a lesson id appears in at most one line, and every line has
/// `quantity >= 1`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Increment the line for `lesson_id`, creating it at quantity 1 if
    /// absent.
    pub fn increment(&mut self, lesson_id: &LessonId) {
        if let Some(line) = self.lines.iter_mut().find(|l| &l.lesson_id == lesson_id) {
            line.quantity += 1;
        } else {
            self.lines.push(CartLine {
                lesson_id: lesson_id.clone(),
                quantity: 1,
            });
        }
    }

    /// Remove the whole line for `lesson_id`, returning it if present.
    ///
    /// Removal is all-or-nothing per lesson; partial-quantity removal is not
    /// supported.
    pub fn remove(&mut self, lesson_id: &LessonId) -> Option<CartLine> {
        let index = self.lines.iter().position(|l| &l.lesson_id == lesson_id)?;
        Some(self.lines.remove(index))
    }

    /// Quantity currently held for a lesson (0 if absent)
    #[must_use]
    pub fn quantity_of(&self, lesson_id: &LessonId) -> u32 {
        self.lines
            .iter()
            .find(|l| &l.lesson_id == lesson_id)
            .map_or(0, |l| l.quantity)
    }

    /// The cart lines in first-add order
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Total number of booked spaces across all lines
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Whether the cart has no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drop every line (on successful order submission)
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
