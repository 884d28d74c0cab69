//! Lesson catalog store: one id-keyed truth, two rendered views.
//!
//! The catalog holds every fetched lesson in a single `HashMap` keyed by
//! lesson id. The full-catalog view is the fetch-ordered id list; the search
//! view (owned by [`crate::search::SearchState`]) is another id list into the
//! same map. Because both views resolve ids through the shared map, a
//! capacity mutation is written exactly once and can never diverge between
//! views.

use crate::types::{Lesson, LessonId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Load lifecycle of the catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStatus {
    /// Nothing fetched yet
    #[default]
    Idle,
    /// Fetch in flight
    Loading,
    /// Catalog populated
    Loaded,
    /// Fetch failed; the UI shows a retry panel, no partial state
    Failed {
        /// What went wrong
        error: String,
    },
}

/// The canonical in-memory lesson store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Single source of truth for every lesson, keyed by id
    lessons: HashMap<LessonId, Lesson>,
    /// Fetch order of the full-catalog view
    order: Vec<LessonId>,
    /// Load lifecycle
    pub status: LoadStatus,
    /// When the catalog was last replaced from the backend
    pub last_loaded_at: Option<DateTime<Utc>>,
}

impl Catalog {
    /// Replace the whole catalog from a fresh fetch.
    ///
    /// Records are replaced wholesale, not merged: any optimistic local
    /// mutation is discarded in favor of server-authoritative state.
    pub fn replace(&mut self, lessons: Vec<Lesson>, loaded_at: DateTime<Utc>) {
        self.lessons.clear();
        self.order.clear();
        for mut lesson in lessons {
            lesson.sanitize();
            self.order.push(lesson.id.clone());
            self.lessons.insert(lesson.id.clone(), lesson);
        }
        self.status = LoadStatus::Loaded;
        self.last_loaded_at = Some(loaded_at);
    }

    /// Fold search results into the shared map, returning the result ids in
    /// response order.
    ///
    /// Ids already present keep their current record untouched: the local
    /// `spaces` value carries optimistic cart decrements the server does not
    /// know about yet, so a search response must never resurrect consumed
    /// capacity. Unknown ids (a lesson added server-side since the last
    /// fetch) are inserted so the search view can render them.
    pub fn project_search_results(&mut self, lessons: Vec<Lesson>) -> Vec<LessonId> {
        let mut ids = Vec::with_capacity(lessons.len());
        for mut lesson in lessons {
            ids.push(lesson.id.clone());
            if !self.lessons.contains_key(&lesson.id) {
                lesson.sanitize();
                self.lessons.insert(lesson.id.clone(), lesson);
            }
        }
        ids
    }

    /// Look up a lesson by id
    #[must_use]
    pub fn get(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.get(id)
    }

    /// Mutable lookup, used by the cart ledger to write capacity changes
    pub fn get_mut(&mut self, id: &LessonId) -> Option<&mut Lesson> {
        self.lessons.get_mut(id)
    }

    /// The full-catalog view in fetch order
    pub fn displayed(&self) -> impl Iterator<Item = &Lesson> {
        self.order.iter().filter_map(|id| self.lessons.get(id))
    }

    /// Resolve an id list (e.g. the search projection) against the shared map
    pub fn resolve<'a>(&'a self, ids: &'a [LessonId]) -> impl Iterator<Item = &'a Lesson> {
        ids.iter().filter_map(|id| self.lessons.get(id))
    }

    /// Number of lessons in the catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the catalog holds no lessons
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
