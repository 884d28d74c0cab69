//! Backend REST client for the lesson service.
//!
//! The engine talks to the backend only through the [`LessonApi`] trait so
//! reducers can be exercised against an in-memory mock. The production
//! implementation is [`HttpLessonApi`] on `reqwest`.
//!
//! Capacity updates push the lesson's current, already-decremented `spaces`
//! value as an absolute overwrite. Whether the server treats the body as
//! authoritative-overwrite or additive-delta is a server-contract question;
//! the client deliberately does not convert it to a delta.

use crate::config::EngineConfig;
use crate::types::{Lesson, LessonId, OrderConfirmation, OrderPayload};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Result alias for backend calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Backend call failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Connection, DNS, or timeout failure before a response arrived
    #[error("transport error: {message}")]
    Transport {
        /// Underlying failure description
        message: String,
    },
    /// The server answered with a non-success status
    #[error("unexpected status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },
    /// The response body could not be decoded
    #[error("failed to decode response: {message}")]
    Decode {
        /// Underlying failure description
        message: String,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            Self::Status {
                status: status.as_u16(),
            }
        } else if error.is_decode() {
            Self::Decode {
                message: error.to_string(),
            }
        } else {
            Self::Transport {
                message: error.to_string(),
            }
        }
    }
}

/// Boxed future returned by [`LessonApi`] methods
pub type ApiFuture<T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send>>;

/// Abstraction over the lesson backend REST surface.
///
/// Object-safe so environments can hold an `Arc<dyn LessonApi>`.
pub trait LessonApi: Send + Sync {
    /// `GET /lessons` - the full catalog
    fn fetch_lessons(&self) -> ApiFuture<Vec<Lesson>>;

    /// `GET /search?q=<text>` - lessons matching the query
    fn search(&self, query: String) -> ApiFuture<Vec<Lesson>>;

    /// `POST /order` - create an order from the cart
    fn create_order(&self, payload: OrderPayload) -> ApiFuture<OrderConfirmation>;

    /// `PUT /lessons/:id` - push a lesson's remaining spaces
    fn update_spaces(&self, lesson_id: LessonId, spaces: u32) -> ApiFuture<()>;
}

#[derive(Serialize)]
struct SpacesUpdate {
    spaces: u32,
}

/// `reqwest`-backed [`LessonApi`] implementation.
///
/// Every request carries the configured timeout so a hung backend cannot
/// stall order submission indefinitely.
#[derive(Clone, Debug)]
pub struct HttpLessonApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLessonApi {
    /// Build a client from engine configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: &EngineConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::Transport {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Arc-wrapped instance for sharing with the environment
    ///
    /// # Errors
    ///
    /// Same as [`HttpLessonApi::new`].
    pub fn shared(config: &EngineConfig) -> ApiResult<Arc<dyn LessonApi>> {
        Ok(Arc::new(Self::new(config)?))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl LessonApi for HttpLessonApi {
    fn fetch_lessons(&self) -> ApiFuture<Vec<Lesson>> {
        let request = self.client.get(self.url("/lessons"));
        Box::pin(async move {
            let response = request.send().await?.error_for_status()?;
            let lessons = response.json::<Vec<Lesson>>().await?;
            tracing::debug!(count = lessons.len(), "fetched lesson catalog");
            Ok(lessons)
        })
    }

    fn search(&self, query: String) -> ApiFuture<Vec<Lesson>> {
        let request = self
            .client
            .get(self.url("/search"))
            .query(&[("q", query.as_str())]);
        Box::pin(async move {
            let response = request.send().await?.error_for_status()?;
            let lessons = response.json::<Vec<Lesson>>().await?;
            tracing::debug!(query = %query, count = lessons.len(), "search results");
            Ok(lessons)
        })
    }

    fn create_order(&self, payload: OrderPayload) -> ApiFuture<OrderConfirmation> {
        let request = self.client.post(self.url("/order")).json(&payload);
        Box::pin(async move {
            let response = request.send().await?.error_for_status()?;
            let confirmation = response.json::<OrderConfirmation>().await?;
            tracing::info!(order_id = %confirmation.order_id, "order created");
            Ok(confirmation)
        })
    }

    fn update_spaces(&self, lesson_id: LessonId, spaces: u32) -> ApiFuture<()> {
        let request = self
            .client
            .put(self.url(&format!("/lessons/{lesson_id}")))
            .json(&SpacesUpdate { spaces });
        Box::pin(async move {
            request.send().await?.error_for_status()?;
            tracing::debug!(lesson_id = %lesson_id, spaces, "capacity pushed");
            Ok(())
        })
    }
}
