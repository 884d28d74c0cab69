//! The booking reducer: every state transition in one place.
//!
//! Pure logic only. Network calls, timers, and the capacity fan-out are
//! returned as effect descriptions and executed by the store runtime, which
//! feeds the resulting actions back through this reducer.

use crate::actions::BookingAction;
use crate::catalog::LoadStatus;
use crate::environment::{BookingEnvironment, ProductionBookingEnvironment};
use crate::state::{BookingState, SubmissionStatus};
use crate::types::{LessonId, Notice, OrderPayload};
use booking_core::effect::Effect;
use booking_core::reducer::Reducer;
use futures::future::join_all;
use smallvec::{SmallVec, smallvec};

/// Reducer for the whole booking session.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingReducer;

impl Reducer for BookingReducer {
    type State = BookingState;
    type Action = BookingAction;
    type Environment = ProductionBookingEnvironment;

    fn reduce(
        &self,
        state: &mut BookingState,
        action: BookingAction,
        env: &ProductionBookingEnvironment,
    ) -> SmallVec<[Effect<BookingAction>; 4]> {
        match action {
            // ----------------------------------------------------------------
            // Catalog
            // ----------------------------------------------------------------
            BookingAction::LoadCatalog => {
                state.catalog.status = LoadStatus::Loading;
                let api = env.api();
                smallvec![Effect::future(async move {
                    Some(match api.fetch_lessons().await {
                        Ok(lessons) => BookingAction::CatalogLoaded { lessons },
                        Err(e) => BookingAction::CatalogLoadFailed {
                            error: e.to_string(),
                        },
                    })
                })]
            },

            BookingAction::CatalogLoaded { lessons } => {
                tracing::info!(count = lessons.len(), "catalog loaded");
                state.catalog.replace(lessons, env.clock().now());
                // A fresh catalog supersedes any search projection and
                // invalidates in-flight search generations.
                state.search.clear();
                smallvec![]
            },

            BookingAction::CatalogLoadFailed { error } => {
                tracing::warn!(error = %error, "catalog load failed");
                state.catalog.status = LoadStatus::Failed { error };
                smallvec![]
            },

            // ----------------------------------------------------------------
            // Search
            // ----------------------------------------------------------------
            BookingAction::QueryChanged { query } => {
                let trimmed = query.trim();
                if trimmed.is_empty() {
                    state.search.clear();
                    return smallvec![];
                }
                let seq = state.search.issue(trimmed.to_string());
                smallvec![Effect::Delay {
                    duration: env.debounce(),
                    action: Box::new(BookingAction::SearchDue { seq }),
                }]
            },

            BookingAction::SearchDue { seq } => {
                if !state.search.is_current(seq) {
                    // A later keystroke re-armed the timer; this one is dead.
                    return smallvec![];
                }
                state.search.mark_fetching();
                let query = state.search.query().to_string();
                let api = env.api();
                smallvec![Effect::future(async move {
                    Some(match api.search(query).await {
                        Ok(lessons) => BookingAction::SearchSucceeded { seq, lessons },
                        Err(e) => BookingAction::SearchFailed {
                            seq,
                            error: e.to_string(),
                        },
                    })
                })]
            },

            BookingAction::SearchSucceeded { seq, lessons } => {
                if !state.search.is_current(seq) {
                    tracing::debug!(seq, "discarding stale search response");
                    return smallvec![];
                }
                let ids = state.catalog.project_search_results(lessons);
                state.search.adopt(ids);
                smallvec![]
            },

            BookingAction::SearchFailed { seq, error } => {
                if state.search.is_current(seq) {
                    tracing::warn!(seq, error = %error, "search failed, showing full catalog");
                    state.search.fall_back();
                }
                smallvec![]
            },

            // ----------------------------------------------------------------
            // Cart
            // ----------------------------------------------------------------
            BookingAction::AddToCart { lesson_id } => {
                let Some(lesson) = state.catalog.get_mut(&lesson_id) else {
                    tracing::warn!(lesson_id = %lesson_id, "add-to-cart for unknown lesson");
                    return smallvec![];
                };
                if !lesson.has_capacity() {
                    state.notice = Some(Notice::SoldOut { lesson_id });
                    return smallvec![];
                }
                lesson.spaces -= 1;
                let remaining = lesson.spaces;
                state.cart.increment(&lesson_id);
                tracing::debug!(lesson_id = %lesson_id, remaining, "added to cart");
                smallvec![]
            },

            BookingAction::RemoveFromCart { lesson_id } => {
                if let Some(line) = state.cart.remove(&lesson_id) {
                    tracing::debug!(lesson_id = %lesson_id, quantity = line.quantity, "removed from cart");
                    if let Some(lesson) = state.catalog.get_mut(&lesson_id) {
                        lesson.spaces += line.quantity;
                    }
                }
                smallvec![]
            },

            BookingAction::DismissNotice => {
                state.notice = None;
                smallvec![]
            },

            // ----------------------------------------------------------------
            // Order pipeline
            // ----------------------------------------------------------------
            BookingAction::SubmitOrder { customer } => {
                if state.cart.is_empty() {
                    tracing::warn!("submit with empty cart ignored");
                    return smallvec![];
                }
                if state.submission == SubmissionStatus::Submitting {
                    tracing::warn!("submit while a submission is in flight ignored");
                    return smallvec![];
                }
                state.submission = SubmissionStatus::Submitting;
                let payload = OrderPayload::new(&customer, state.cart.lines());
                let api = env.api();
                smallvec![Effect::future(async move {
                    Some(match api.create_order(payload).await {
                        Ok(confirmation) => BookingAction::OrderCreated {
                            order_id: confirmation.order_id,
                        },
                        Err(e) => BookingAction::OrderCreateFailed {
                            error: e.to_string(),
                        },
                    })
                })]
            },

            BookingAction::OrderCreated { order_id } => {
                if state.submission != SubmissionStatus::Submitting {
                    tracing::warn!(order_id = %order_id, "order created outside a submission");
                    return smallvec![];
                }
                // The order exists server-side from this point on. Push each
                // lesson's locally decremented capacity; failures are
                // collected, not retried.
                let mut updates: Vec<(LessonId, u32)> = Vec::new();
                let mut failures: Vec<(LessonId, String)> = Vec::new();
                for line in state.cart.lines() {
                    match state.catalog.get(&line.lesson_id) {
                        Some(lesson) => updates.push((line.lesson_id.clone(), lesson.spaces)),
                        None => failures.push((
                            line.lesson_id.clone(),
                            "lesson missing from catalog".to_string(),
                        )),
                    }
                }
                let api = env.api();
                smallvec![Effect::future(async move {
                    let puts = updates.into_iter().map(|(id, spaces)| {
                        let api = api.clone();
                        async move { (id.clone(), api.update_spaces(id, spaces).await) }
                    });
                    for (id, result) in join_all(puts).await {
                        if let Err(e) = result {
                            failures.push((id, e.to_string()));
                        }
                    }
                    Some(BookingAction::CapacitySyncSettled { order_id, failures })
                })]
            },

            BookingAction::OrderCreateFailed { error } => {
                tracing::warn!(error = %error, "order creation failed");
                // Nothing happened server-side, so the cart survives and the
                // user can retry as-is.
                state.submission = SubmissionStatus::Failed {
                    error: error.clone(),
                };
                state.notice = Some(Notice::OrderError { message: error });
                smallvec![]
            },

            BookingAction::CapacitySyncSettled { order_id, failures } => {
                // The order exists either way, so the cart is spent.
                state.cart.clear();
                if failures.is_empty() {
                    tracing::info!(order_id = %order_id, "order submission complete");
                    state.submission = SubmissionStatus::Succeeded {
                        order_id: order_id.clone(),
                    };
                    state.notice = Some(Notice::OrderConfirmed { order_id });
                } else {
                    let failed: Vec<String> =
                        failures.iter().map(|(id, _)| id.to_string()).collect();
                    tracing::warn!(
                        order_id = %order_id,
                        failed = ?failed,
                        "order created but some capacity updates failed"
                    );
                    state.submission = SubmissionStatus::Failed {
                        error: format!(
                            "order {order_id} created, but capacity updates failed for: {}",
                            failed.join(", ")
                        ),
                    };
                    state.notice = Some(Notice::OrderError {
                        message: format!(
                            "Your order was recorded, but availability for {} could not be \
                             updated",
                            failed.join(", ")
                        ),
                    });
                }
                // Refetch so local state converges on whatever the backend
                // now believes.
                smallvec![Effect::future(async { Some(BookingAction::LoadCatalog) })]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mocks::MockLessonApi;
    use crate::types::{Customer, Lesson};
    use booking_testing::mocks::test_clock;
    use std::sync::Arc;
    use std::time::Duration;

    fn lesson(id: &str, spaces: u32) -> Lesson {
        Lesson {
            id: LessonId::from(id),
            subject: "Math".to_string(),
            location: "London".to_string(),
            price: 100.0,
            spaces,
            description: String::new(),
            image: None,
        }
    }

    fn env_with(api: Arc<MockLessonApi>) -> ProductionBookingEnvironment {
        ProductionBookingEnvironment::new(Arc::new(test_clock()), api, Duration::from_millis(250))
    }

    fn loaded_state(env: &ProductionBookingEnvironment, lessons: Vec<Lesson>) -> BookingState {
        let mut state = BookingState::default();
        let _ = BookingReducer.reduce(&mut state, BookingAction::CatalogLoaded { lessons }, env);
        state
    }

    #[test]
    fn add_to_cart_decrements_capacity() {
        let env = env_with(MockLessonApi::shared());
        let mut state = loaded_state(&env, vec![lesson("a", 5)]);

        let effects = BookingReducer.reduce(
            &mut state,
            BookingAction::AddToCart {
                lesson_id: LessonId::from("a"),
            },
            &env,
        );

        assert!(effects.is_empty());
        assert_eq!(state.catalog.get(&LessonId::from("a")).unwrap().spaces, 4);
        assert_eq!(state.cart.quantity_of(&LessonId::from("a")), 1);
    }

    #[test]
    fn add_to_cart_at_zero_is_rejected() {
        let env = env_with(MockLessonApi::shared());
        let mut state = loaded_state(&env, vec![lesson("a", 1)]);
        let id = LessonId::from("a");

        let _ = BookingReducer.reduce(
            &mut state,
            BookingAction::AddToCart {
                lesson_id: id.clone(),
            },
            &env,
        );
        let _ = BookingReducer.reduce(
            &mut state,
            BookingAction::AddToCart {
                lesson_id: id.clone(),
            },
            &env,
        );

        assert_eq!(state.catalog.get(&id).unwrap().spaces, 0);
        assert_eq!(state.cart.quantity_of(&id), 1);
        assert_eq!(
            state.notice,
            Some(Notice::SoldOut {
                lesson_id: id.clone()
            })
        );
    }

    #[test]
    fn remove_restores_the_whole_quantity() {
        let env = env_with(MockLessonApi::shared());
        let mut state = loaded_state(&env, vec![lesson("a", 5)]);
        let id = LessonId::from("a");

        for _ in 0..3 {
            let _ = BookingReducer.reduce(
                &mut state,
                BookingAction::AddToCart {
                    lesson_id: id.clone(),
                },
                &env,
            );
        }
        let _ = BookingReducer.reduce(
            &mut state,
            BookingAction::RemoveFromCart {
                lesson_id: id.clone(),
            },
            &env,
        );

        assert_eq!(state.catalog.get(&id).unwrap().spaces, 5);
        assert!(state.cart.is_empty());
    }

    #[test]
    fn empty_query_clears_without_scheduling() {
        let env = env_with(MockLessonApi::shared());
        let mut state = loaded_state(&env, vec![lesson("a", 5)]);

        let _ = BookingReducer.reduce(
            &mut state,
            BookingAction::QueryChanged {
                query: "math".to_string(),
            },
            &env,
        );
        let effects = BookingReducer.reduce(
            &mut state,
            BookingAction::QueryChanged {
                query: "   ".to_string(),
            },
            &env,
        );

        assert!(effects.is_empty());
        assert!(!state.search.is_active());
    }

    #[test]
    fn keystroke_arms_the_debounce_timer() {
        let env = env_with(MockLessonApi::shared());
        let mut state = loaded_state(&env, vec![lesson("a", 5)]);

        let effects = BookingReducer.reduce(
            &mut state,
            BookingAction::QueryChanged {
                query: " math ".to_string(),
            },
            &env,
        );

        assert_eq!(state.search.query(), "math");
        assert!(matches!(
            effects.as_slice(),
            [Effect::Delay { duration, action }]
                if *duration == Duration::from_millis(250)
                    && matches!(**action, BookingAction::SearchDue { .. })
        ));
    }

    #[test]
    fn stale_search_due_is_discarded() {
        let env = env_with(MockLessonApi::shared());
        let mut state = loaded_state(&env, vec![lesson("a", 5)]);

        let _ = BookingReducer.reduce(
            &mut state,
            BookingAction::QueryChanged {
                query: "ma".to_string(),
            },
            &env,
        );
        let _ = BookingReducer.reduce(
            &mut state,
            BookingAction::QueryChanged {
                query: "math".to_string(),
            },
            &env,
        );

        // Timer from the first keystroke fires with seq 1, which is stale.
        let effects = BookingReducer.reduce(&mut state, BookingAction::SearchDue { seq: 1 }, &env);
        assert!(effects.is_empty());
    }

    #[test]
    fn stale_search_response_is_discarded() {
        let env = env_with(MockLessonApi::shared());
        let mut state = loaded_state(&env, vec![lesson("a", 5)]);

        let _ = BookingReducer.reduce(
            &mut state,
            BookingAction::QueryChanged {
                query: "ma".to_string(),
            },
            &env,
        );
        let _ = BookingReducer.reduce(
            &mut state,
            BookingAction::QueryChanged {
                query: "math".to_string(),
            },
            &env,
        );

        let _ = BookingReducer.reduce(
            &mut state,
            BookingAction::SearchSucceeded {
                seq: 1,
                lessons: vec![lesson("stale", 1)],
            },
            &env,
        );
        assert!(!state.search.is_active());

        let _ = BookingReducer.reduce(
            &mut state,
            BookingAction::SearchSucceeded {
                seq: 2,
                lessons: vec![lesson("a", 5)],
            },
            &env,
        );
        assert_eq!(state.search.active_ids(), Some(&[LessonId::from("a")][..]));
    }

    #[test]
    fn search_failure_falls_back_to_the_catalog() {
        let env = env_with(MockLessonApi::shared());
        let mut state = loaded_state(&env, vec![lesson("a", 5)]);

        let _ = BookingReducer.reduce(
            &mut state,
            BookingAction::QueryChanged {
                query: "math".to_string(),
            },
            &env,
        );
        let _ = BookingReducer.reduce(
            &mut state,
            BookingAction::SearchFailed {
                seq: 1,
                error: "boom".to_string(),
            },
            &env,
        );

        assert!(!state.search.is_active());
        assert_eq!(state.visible_lessons().len(), 1);
    }

    #[test]
    fn submit_with_empty_cart_is_ignored() {
        let env = env_with(MockLessonApi::shared());
        let mut state = loaded_state(&env, vec![lesson("a", 5)]);
        let customer = Customer::new("Ada", "0123456789").unwrap();

        let effects =
            BookingReducer.reduce(&mut state, BookingAction::SubmitOrder { customer }, &env);

        assert!(effects.is_empty());
        assert_eq!(state.submission, SubmissionStatus::Idle);
    }

    #[test]
    fn order_create_failure_preserves_the_cart() {
        let env = env_with(MockLessonApi::shared());
        let mut state = loaded_state(&env, vec![lesson("a", 5)]);
        let id = LessonId::from("a");

        let _ = BookingReducer.reduce(
            &mut state,
            BookingAction::AddToCart {
                lesson_id: id.clone(),
            },
            &env,
        );
        let customer = Customer::new("Ada", "0123456789").unwrap();
        let _ = BookingReducer.reduce(&mut state, BookingAction::SubmitOrder { customer }, &env);
        let effects = BookingReducer.reduce(
            &mut state,
            BookingAction::OrderCreateFailed {
                error: "unexpected status 500".to_string(),
            },
            &env,
        );

        assert!(effects.is_empty());
        assert_eq!(state.cart.quantity_of(&id), 1);
        assert!(matches!(state.submission, SubmissionStatus::Failed { .. }));
        assert!(matches!(state.notice, Some(Notice::OrderError { .. })));
    }

    #[test]
    fn settled_sync_clears_cart_and_refetches() {
        let env = env_with(MockLessonApi::shared());
        let mut state = loaded_state(&env, vec![lesson("a", 5)]);

        let _ = BookingReducer.reduce(
            &mut state,
            BookingAction::AddToCart {
                lesson_id: LessonId::from("a"),
            },
            &env,
        );
        let customer = Customer::new("Ada", "0123456789").unwrap();
        let _ = BookingReducer.reduce(&mut state, BookingAction::SubmitOrder { customer }, &env);

        let effects = BookingReducer.reduce(
            &mut state,
            BookingAction::CapacitySyncSettled {
                order_id: "o-1".to_string(),
                failures: vec![],
            },
            &env,
        );

        assert!(state.cart.is_empty());
        assert_eq!(
            state.submission,
            SubmissionStatus::Succeeded {
                order_id: "o-1".to_string()
            }
        );
        assert!(matches!(effects.as_slice(), [Effect::Future(_)]));
    }

    #[test]
    fn partial_sync_failure_still_clears_the_cart() {
        let env = env_with(MockLessonApi::shared());
        let mut state = loaded_state(&env, vec![lesson("a", 5), lesson("b", 3)]);

        for id in ["a", "b"] {
            let _ = BookingReducer.reduce(
                &mut state,
                BookingAction::AddToCart {
                    lesson_id: LessonId::from(id),
                },
                &env,
            );
        }
        let customer = Customer::new("Ada", "0123456789").unwrap();
        let _ = BookingReducer.reduce(&mut state, BookingAction::SubmitOrder { customer }, &env);

        let effects = BookingReducer.reduce(
            &mut state,
            BookingAction::CapacitySyncSettled {
                order_id: "o-2".to_string(),
                failures: vec![(LessonId::from("b"), "unexpected status 500".to_string())],
            },
            &env,
        );

        // The order exists server-side, so the cart is spent even though a
        // capacity update failed.
        assert!(state.cart.is_empty());
        assert!(matches!(state.submission, SubmissionStatus::Failed { .. }));
        assert!(matches!(state.notice, Some(Notice::OrderError { .. })));
        assert!(matches!(effects.as_slice(), [Effect::Future(_)]));
    }

    #[tokio::test]
    async fn order_created_fans_out_capacity_updates() {
        let api = MockLessonApi::shared();
        api.set_lessons(vec![lesson("a", 5), lesson("b", 3)]);
        let env = env_with(api.clone());
        let mut state = loaded_state(&env, vec![lesson("a", 5), lesson("b", 3)]);

        for id in ["a", "b"] {
            let _ = BookingReducer.reduce(
                &mut state,
                BookingAction::AddToCart {
                    lesson_id: LessonId::from(id),
                },
                &env,
            );
        }
        let customer = Customer::new("Ada", "0123456789").unwrap();
        let _ = BookingReducer.reduce(&mut state, BookingAction::SubmitOrder { customer }, &env);

        let mut effects = BookingReducer.reduce(
            &mut state,
            BookingAction::OrderCreated {
                order_id: "o-3".to_string(),
            },
            &env,
        );
        let Some(Effect::Future(fut)) = effects.pop() else {
            panic!("expected a fan-out future");
        };
        let settled = fut.await;

        assert_eq!(
            settled,
            Some(BookingAction::CapacitySyncSettled {
                order_id: "o-3".to_string(),
                failures: vec![],
            })
        );
        let mut pushed = api.recorded_updates();
        pushed.sort();
        assert_eq!(
            pushed,
            vec![(LessonId::from("a"), 4), (LessonId::from("b"), 2)]
        );
    }
}
