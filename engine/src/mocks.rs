//! In-memory [`LessonApi`] for tests.
//!
//! Records every call, serves canned lessons, and can be told to fail
//! specific operations or to hold a search response until released, which
//! lets tests interleave responses deterministically.

use crate::api::{ApiError, ApiFuture, LessonApi};
use crate::types::{Lesson, LessonId, OrderConfirmation, OrderPayload};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
struct Inner {
    lessons: Mutex<Vec<Lesson>>,
    fail_fetch: AtomicBool,
    fail_create: AtomicBool,
    failing_updates: Mutex<HashSet<LessonId>>,
    updates: Mutex<Vec<(LessonId, u32)>>,
    orders: Mutex<Vec<OrderPayload>>,
    searches: Mutex<Vec<String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    next_order_id: Mutex<u64>,
}

/// Scripted in-memory backend.
#[derive(Clone, Default)]
pub struct MockLessonApi {
    inner: Arc<Inner>,
}

#[allow(clippy::unwrap_used)]
impl MockLessonApi {
    /// Arc-wrapped instance for wiring into an environment
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replace the canned lesson list
    pub fn set_lessons(&self, lessons: Vec<Lesson>) {
        *self.inner.lessons.lock().unwrap() = lessons;
    }

    /// Make `fetch_lessons` fail with a 500
    pub fn fail_fetch(&self) {
        self.inner.fail_fetch.store(true, Ordering::SeqCst);
    }

    /// Make `create_order` fail with a 500
    pub fn fail_create(&self) {
        self.inner.fail_create.store(true, Ordering::SeqCst);
    }

    /// Make `update_spaces` for one lesson fail with a 500
    pub fn fail_update(&self, lesson_id: &LessonId) {
        self.inner
            .failing_updates
            .lock()
            .unwrap()
            .insert(lesson_id.clone());
    }

    /// Hold the response for `query` until [`Self::release_search`] is called
    pub fn hold_search(&self, query: &str) {
        self.inner
            .gates
            .lock()
            .unwrap()
            .insert(query.to_string(), Arc::new(Notify::new()));
    }

    /// Release a held search response
    pub fn release_search(&self, query: &str) {
        if let Some(gate) = self.inner.gates.lock().unwrap().get(query) {
            gate.notify_one();
        }
    }

    /// Every `(lesson_id, spaces)` pushed via `update_spaces`, in call order
    #[must_use]
    pub fn recorded_updates(&self) -> Vec<(LessonId, u32)> {
        self.inner.updates.lock().unwrap().clone()
    }

    /// Every payload posted via `create_order`
    #[must_use]
    pub fn created_orders(&self) -> Vec<OrderPayload> {
        self.inner.orders.lock().unwrap().clone()
    }

    /// Whether a search request for `query` has been dispatched yet
    #[must_use]
    pub fn search_started(&self, query: &str) -> bool {
        self.inner
            .searches
            .lock()
            .unwrap()
            .iter()
            .any(|q| q == query)
    }

    /// Every search query received, in call order
    #[must_use]
    pub fn search_calls(&self) -> Vec<String> {
        self.inner.searches.lock().unwrap().clone()
    }

    fn matches(lesson: &Lesson, query: &str) -> bool {
        let q = query.to_lowercase();
        lesson.subject.to_lowercase().contains(&q) || lesson.location.to_lowercase().contains(&q)
    }
}

#[allow(clippy::unwrap_used)]
impl LessonApi for MockLessonApi {
    fn fetch_lessons(&self) -> ApiFuture<Vec<Lesson>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            if inner.fail_fetch.load(Ordering::SeqCst) {
                return Err(ApiError::Status { status: 500 });
            }
            Ok(inner.lessons.lock().unwrap().clone())
        })
    }

    fn search(&self, query: String) -> ApiFuture<Vec<Lesson>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            inner.searches.lock().unwrap().push(query.clone());
            let gate = inner.gates.lock().unwrap().get(&query).cloned();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            let results = inner
                .lessons
                .lock()
                .unwrap()
                .iter()
                .filter(|l| Self::matches(l, &query))
                .cloned()
                .collect();
            Ok(results)
        })
    }

    fn create_order(&self, payload: OrderPayload) -> ApiFuture<OrderConfirmation> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            if inner.fail_create.load(Ordering::SeqCst) {
                return Err(ApiError::Status { status: 500 });
            }
            inner.orders.lock().unwrap().push(payload);
            let mut next = inner.next_order_id.lock().unwrap();
            *next += 1;
            Ok(OrderConfirmation {
                order_id: format!("order-{}", *next),
            })
        })
    }

    fn update_spaces(&self, lesson_id: LessonId, spaces: u32) -> ApiFuture<()> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            if inner.failing_updates.lock().unwrap().contains(&lesson_id) {
                return Err(ApiError::Status { status: 500 });
            }
            if let Some(lesson) = inner
                .lessons
                .lock()
                .unwrap()
                .iter_mut()
                .find(|l| l.id == lesson_id)
            {
                lesson.spaces = spaces;
            }
            inner.updates.lock().unwrap().push((lesson_id, spaces));
            Ok(())
        })
    }
}
