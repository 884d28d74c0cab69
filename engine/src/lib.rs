//! # Booking Engine
//!
//! Client-side inventory consistency for a lesson booking app.
//!
//! The engine keeps one id-keyed lesson store as the single source of truth
//! and renders two views over it (the full catalog and the search
//! projection), so an optimistic capacity change written by the cart can
//! never diverge between views. Around that store it implements:
//!
//! - **Catalog loading**: wholesale replace from `GET /lessons`
//! - **Search**: debounced, generation-counted queries where the last query
//!   always wins, with fallback to the full catalog on failure
//! - **Cart ledger**: optimistic capacity decrements guarded at zero, with
//!   all-or-nothing removal restoring the full quantity
//! - **Order pipeline**: `POST /order` followed by a concurrent
//!   `PUT /lessons/:id` fan-out, with partial failures acknowledged to the
//!   user instead of silently retried
//!
//! All of it is expressed as a single [`reducer::BookingReducer`] driven by
//! the `booking-runtime` store; the network lives behind the
//! [`api::LessonApi`] trait.

pub mod actions;
pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod environment;
pub mod mocks;
pub mod reducer;
pub mod search;
pub mod state;
pub mod types;

pub use actions::BookingAction;
pub use api::{ApiError, HttpLessonApi, LessonApi};
pub use config::EngineConfig;
pub use environment::{BookingEnvironment, ProductionBookingEnvironment};
pub use reducer::BookingReducer;
pub use state::{BookingState, SubmissionStatus};
pub use types::{Customer, Lesson, LessonId, Notice, ValidationError};
