//! Domain types for the lesson booking engine.
//!
//! Value objects shared by the catalog, the cart ledger, and the order
//! pipeline. Everything that crosses the wire derives serde with the field
//! names the backend REST contract uses.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque identifier for a lesson.
///
/// Ids are minted by the backend and stable across fetches; the client never
/// creates one. The newtype keeps lesson ids from being confused with other
/// strings in payloads.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonId(String);

impl LessonId {
    /// Wrap a backend-provided id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id as sent by the backend
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LessonId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// Lessons
// ============================================================================

/// A bookable lesson with a price and a finite capacity.
///
/// `spaces` is the remaining bookable capacity. It is mutated only by cart
/// add/remove operations and replaced wholesale on refetch; it can never go
/// negative because decrements are guarded at zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    /// Backend-assigned identifier
    pub id: LessonId,
    /// Subject taught (e.g. "Math")
    pub subject: String,
    /// Where the lesson takes place
    pub location: String,
    /// Price per space, non-negative
    pub price: f64,
    /// Remaining bookable spaces
    pub spaces: u32,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Optional image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Lesson {
    /// Clamp fields that the backend could in principle send out of range.
    ///
    /// `spaces` is non-negative by type; `price` is clamped on ingest.
    pub(crate) fn sanitize(&mut self) {
        if self.price.is_sign_negative() || !self.price.is_finite() {
            self.price = 0.0;
        }
    }

    /// Whether at least one space is left
    #[must_use]
    pub const fn has_capacity(&self) -> bool {
        self.spaces > 0
    }
}

// ============================================================================
// Cart
// ============================================================================

/// One cart line: a lesson id plus the quantity the user intends to book.
///
/// A given lesson id appears in at most one line; repeated adds increment
/// `quantity` instead of duplicating lines. `quantity >= 1` always.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The lesson being booked
    pub lesson_id: LessonId,
    /// How many spaces of it, at least one
    pub quantity: u32,
}

// ============================================================================
// Customer
// ============================================================================

/// Validation failures for checkout input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Name is empty, too short, or contains non-letter characters
    #[error("name must be at least 2 characters, letters and spaces only")]
    InvalidName,
    /// Phone is not 10-15 digits
    #[error("phone must be 10 to 15 digits")]
    InvalidPhone,
}

/// Validated checkout customer info.
///
/// Can only be constructed through [`Customer::new`], so a `Customer` held in
/// an action is known-valid. Validation mirrors the checkout form rules: name
/// is letters and spaces with at least 2 characters, phone is 10-15 digits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    name: String,
    phone: String,
}

impl Customer {
    /// Validate and construct checkout customer info.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if either field fails its rule.
    pub fn new(name: &str, phone: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        let valid_name = name.chars().count() >= 2
            && name.chars().all(|c| c.is_alphabetic() || c == ' ');
        if !valid_name {
            return Err(ValidationError::InvalidName);
        }

        let valid_phone =
            (10..=15).contains(&phone.len()) && phone.chars().all(|c| c.is_ascii_digit());
        if !valid_phone {
            return Err(ValidationError::InvalidPhone);
        }

        Ok(Self {
            name: name.to_string(),
            phone: phone.to_string(),
        })
    }

    /// The validated name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The validated phone number
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }
}

// ============================================================================
// Order wire types
// ============================================================================

/// Body of `POST /order`.
///
/// Field names follow the backend contract: `lessonIds` is the list of
/// booked lessons, `spaces` maps each lesson id to the booked quantity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderPayload {
    /// Customer name
    pub name: String,
    /// Customer phone
    pub phone: String,
    /// Ids of every booked lesson
    #[serde(rename = "lessonIds")]
    pub lesson_ids: Vec<LessonId>,
    /// Booked quantity per lesson id
    pub spaces: HashMap<LessonId, u32>,
}

impl OrderPayload {
    /// Assemble the payload from validated customer info and cart lines.
    #[must_use]
    pub fn new(customer: &Customer, lines: &[CartLine]) -> Self {
        Self {
            name: customer.name().to_string(),
            phone: customer.phone().to_string(),
            lesson_ids: lines.iter().map(|l| l.lesson_id.clone()).collect(),
            spaces: lines
                .iter()
                .map(|l| (l.lesson_id.clone(), l.quantity))
                .collect(),
        }
    }
}

/// Confirmation returned by `POST /order`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Server-assigned order id. Tolerant of the common id spellings.
    #[serde(default, alias = "orderId", alias = "_id", alias = "id")]
    pub order_id: String,
}

// ============================================================================
// Notices
// ============================================================================

/// User-facing notices surfaced by the engine.
///
/// The UI renders the current notice (if any) as a blocking dialog or toast;
/// the engine only records what happened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Notice {
    /// Add-to-cart was rejected because the lesson has no spaces left
    SoldOut {
        /// The lesson that is fully booked
        lesson_id: LessonId,
    },
    /// Order submission failed; the message says whether the cart survived
    OrderError {
        /// Human-readable failure description
        message: String,
    },
    /// Order was created and all capacity updates applied
    OrderConfirmed {
        /// Server-assigned order id
        order_id: String,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SoldOut { lesson_id } => {
                write!(f, "No spaces left for lesson {lesson_id}")
            },
            Self::OrderError { message } => write!(f, "Order failed: {message}"),
            Self::OrderConfirmed { order_id } => {
                write!(f, "Order {order_id} confirmed")
            },
        }
    }
}
