//! End-to-end cart behavior through the store runtime.

#![allow(clippy::unwrap_used)]

use booking_engine::mocks::MockLessonApi;
use booking_engine::{
    BookingAction, BookingReducer, BookingState, Lesson, LessonId, Notice,
    ProductionBookingEnvironment,
};
use booking_runtime::Store;
use booking_testing::mocks::test_clock;
use std::sync::Arc;
use std::time::Duration;

type BookingStore = Store<
    BookingState,
    BookingAction,
    ProductionBookingEnvironment,
    BookingReducer,
>;

fn lesson(id: &str, subject: &str, spaces: u32) -> Lesson {
    Lesson {
        id: LessonId::from(id),
        subject: subject.to_string(),
        location: "London".to_string(),
        price: 100.0,
        spaces,
        description: String::new(),
        image: None,
    }
}

async fn store_with(api: Arc<MockLessonApi>) -> BookingStore {
    let env = ProductionBookingEnvironment::new(
        Arc::new(test_clock()),
        api,
        Duration::from_millis(10),
    );
    let store = Store::new(BookingState::default(), BookingReducer, env);
    let mut handle = store.send(BookingAction::LoadCatalog).await;
    handle
        .wait_with_timeout(Duration::from_secs(5))
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn add_then_remove_restores_capacity() {
    let api = MockLessonApi::shared();
    api.set_lessons(vec![lesson("a", "Math", 5)]);
    let store = store_with(api).await;
    let id = LessonId::from("a");

    for _ in 0..3 {
        let _ = store
            .send(BookingAction::AddToCart {
                lesson_id: id.clone(),
            })
            .await;
    }
    let (spaces, quantity) = store
        .state(|s| {
            (
                s.catalog.get(&id).unwrap().spaces,
                s.cart.quantity_of(&id),
            )
        })
        .await;
    assert_eq!(spaces, 2);
    assert_eq!(quantity, 3);

    let _ = store
        .send(BookingAction::RemoveFromCart {
            lesson_id: id.clone(),
        })
        .await;
    let (spaces, empty) = store
        .state(|s| (s.catalog.get(&id).unwrap().spaces, s.cart.is_empty()))
        .await;
    assert_eq!(spaces, 5);
    assert!(empty);
}

#[tokio::test]
async fn capacity_is_guarded_at_zero() {
    let api = MockLessonApi::shared();
    api.set_lessons(vec![lesson("a", "Math", 2)]);
    let store = store_with(api).await;
    let id = LessonId::from("a");

    for _ in 0..4 {
        let _ = store
            .send(BookingAction::AddToCart {
                lesson_id: id.clone(),
            })
            .await;
    }

    let (spaces, quantity, notice) = store
        .state(|s| {
            (
                s.catalog.get(&id).unwrap().spaces,
                s.cart.quantity_of(&id),
                s.notice.clone(),
            )
        })
        .await;
    assert_eq!(spaces, 0);
    assert_eq!(quantity, 2);
    assert_eq!(
        notice,
        Some(Notice::SoldOut {
            lesson_id: id.clone()
        })
    );

    // The notice can be dismissed without touching the cart
    let _ = store.send(BookingAction::DismissNotice).await;
    let (notice, quantity) = store
        .state(|s| (s.notice.clone(), s.cart.quantity_of(&id)))
        .await;
    assert_eq!(notice, None);
    assert_eq!(quantity, 2);
}

#[tokio::test]
async fn both_views_show_the_same_capacity() {
    let api = MockLessonApi::shared();
    api.set_lessons(vec![lesson("a", "Math", 5), lesson("b", "Music", 3)]);
    let store = store_with(api.clone()).await;
    let id = LessonId::from("a");

    // Activate the search projection over the same lesson
    let mut handle = store
        .send(BookingAction::QueryChanged {
            query: "math".to_string(),
        })
        .await;
    handle
        .wait_with_timeout(Duration::from_secs(5))
        .await
        .unwrap();

    let _ = store
        .send(BookingAction::AddToCart {
            lesson_id: id.clone(),
        })
        .await;

    // The search view and the underlying catalog record agree because they
    // resolve the same id through the same map.
    let (search_view_spaces, catalog_spaces) = store
        .state(|s| {
            let visible = s.visible_lessons();
            (
                visible.iter().find(|l| l.id == id).map(|l| l.spaces),
                s.catalog.get(&id).map(|l| l.spaces),
            )
        })
        .await;
    assert_eq!(search_view_spaces, Some(4));
    assert_eq!(catalog_spaces, Some(4));
}
