//! Booking Engine Demo
//!
//! Drives the engine against a live lesson backend:
//! - Catalog load
//! - Debounced search
//! - Cart add/remove with optimistic capacity
//! - Order submission with the capacity fan-out
//!
//! # Usage
//!
//! ```bash
//! # Point at the backend (defaults to http://localhost:3000)
//! export BOOKING_API_BASE_URL=http://localhost:3000
//!
//! cargo run --bin demo
//! ```

use booking_engine::{
    BookingAction, BookingReducer, BookingState, Customer, EngineConfig, HttpLessonApi,
    ProductionBookingEnvironment,
};
use booking_core::environment::SystemClock;
use booking_runtime::Store;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,booking_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("\n============================================");
    println!("   Lesson Booking Engine - Live Demo");
    println!("============================================\n");

    let config = EngineConfig::from_env();
    println!("⚙️  Backend: {}", config.api_base_url);

    let api = HttpLessonApi::shared(&config)?;
    let env = ProductionBookingEnvironment::new(Arc::new(SystemClock), api, config.debounce());
    let store = Store::new(BookingState::default(), BookingReducer, env);

    // Step 1: load the catalog
    println!("\n1️⃣  Loading catalog...");
    let mut handle = store.send(BookingAction::LoadCatalog).await;
    handle.wait_with_timeout(SETTLE_TIMEOUT).await?;

    let lessons = store
        .state(|s| {
            s.visible_lessons()
                .iter()
                .map(|l| (l.id.clone(), l.subject.clone(), l.spaces))
                .collect::<Vec<_>>()
        })
        .await;
    println!("✓ {} lessons available", lessons.len());
    for (id, subject, spaces) in &lessons {
        println!("   {id}: {subject} ({spaces} spaces)");
    }

    let Some((first_id, first_subject, _)) = lessons.first().cloned() else {
        println!("\nBackend returned no lessons, nothing to book.");
        return Ok(());
    };

    // Step 2: debounced search for the first lesson's subject
    println!("\n2️⃣  Searching for \"{first_subject}\"...");
    let mut handle = store
        .send(BookingAction::QueryChanged {
            query: first_subject.clone(),
        })
        .await;
    handle.wait_with_timeout(SETTLE_TIMEOUT).await?;
    let matches = store.state(|s| s.visible_lessons().len()).await;
    println!("✓ {matches} matching lessons");

    // Step 3: add the first lesson to the cart twice
    println!("\n3️⃣  Adding {first_id} to the cart twice...");
    for _ in 0..2 {
        let _ = store
            .send(BookingAction::AddToCart {
                lesson_id: first_id.clone(),
            })
            .await;
    }
    let (quantity, remaining) = store
        .state(|s| {
            (
                s.cart.quantity_of(&first_id),
                s.catalog.get(&first_id).map(|l| l.spaces),
            )
        })
        .await;
    println!("✓ cart holds {quantity}, {remaining:?} spaces left locally");

    // Step 4: submit the order
    println!("\n4️⃣  Submitting order...");
    let customer = Customer::new("Ada Lovelace", "0123456789")?;
    let mut handle = store.send(BookingAction::SubmitOrder { customer }).await;
    handle.wait_with_timeout(SETTLE_TIMEOUT).await?;

    let (submission, notice) = store.state(|s| (s.submission.clone(), s.notice.clone())).await;
    println!("✓ submission: {submission:?}");
    if let Some(notice) = notice {
        println!("   {notice}");
    }

    Ok(())
}
