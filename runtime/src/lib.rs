//! # Booking Runtime
//!
//! The `Store` runtime for the lesson booking engine.
//!
//! A [`Store`] owns a feature's state behind an async `RwLock`, runs the
//! reducer synchronously under the write lock, and executes the returned
//! effects in spawned tasks. Actions produced by effects are fed back through
//! the reducer, forming the `action → reducer → effects → action` loop.
//!
//! The engine itself has no internal parallelism: state mutation only ever
//! happens inside `send()`, serialized by the write lock. The only
//! concurrency is among in-flight effects (network calls), which is exactly
//! the hazard surface the reducers are written to tolerate.
//!
//! ## Example
//!
//! ```ignore
//! let store = Store::new(BookingState::default(), BookingReducer, env);
//!
//! let mut handle = store.send(BookingAction::LoadCatalog).await;
//! handle.wait_with_timeout(Duration::from_secs(5)).await?;
//!
//! let count = store.state(|s| s.catalog.len()).await;
//! ```

use booking_core::{effect::Effect, reducer::Reducer};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};

/// Errors that can occur while interacting with a [`Store`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Timeout expired while waiting for effects to settle.
    #[error("timed out waiting for effects to settle")]
    Timeout,
}

/// Handle for awaiting the effects of a single `send`.
///
/// The handle tracks the whole cascade: effects spawned by the initial
/// action, plus any effects spawned by feedback actions those effects
/// produce. `wait` returns once the cascade has fully settled.
#[derive(Clone)]
pub struct EffectHandle {
    pending: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let pending = Arc::new(AtomicUsize::new(0));
        let (notifier, completion) = watch::channel(());

        let handle = Self {
            pending: Arc::clone(&pending),
            completion,
        };
        let tracking = EffectTracking { pending, notifier: Arc::new(notifier) };

        (handle, tracking)
    }

    /// Create a handle that is already settled.
    #[must_use]
    pub fn settled() -> Self {
        let (handle, _tracking) = Self::new();
        handle
    }

    /// Wait until every tracked effect (including cascading feedback
    /// effects) has completed.
    pub async fn wait(&mut self) {
        while self.pending.load(Ordering::SeqCst) > 0 {
            // A closed channel means the tracking side is gone, which only
            // happens once the counter can no longer be incremented.
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for effect settlement with a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires first.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending", &self.pending.load(Ordering::SeqCst))
            .finish()
    }
}

/// Internal tracking state threaded through effect execution.
struct EffectTracking {
    pending: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    fn increment(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

impl Clone for EffectTracking {
    fn clone(&self) -> Self {
        Self {
            pending: Arc::clone(&self.pending),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

/// RAII guard so the counter is decremented even if an effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// The Store - runtime coordinator for a reducer.
///
/// Cloning a `Store` is cheap; clones share state, reducer, and environment.
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: Arc<R>,
    environment: Arc<E>,
    _actions: std::marker::PhantomData<fn(A)>,
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: Arc::clone(&self.reducer),
            environment: Arc::clone(&self.environment),
            _actions: std::marker::PhantomData,
        }
    }
}

impl<S, A, E, R> Store<S, A, E, R>
where
    S: Send + Sync + 'static,
    A: Send + 'static,
    E: Send + Sync + 'static,
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer: Arc::new(reducer),
            environment: Arc::new(environment),
            _actions: std::marker::PhantomData,
        }
    }

    /// Send an action to the store.
    ///
    /// The reducer runs synchronously under the state write lock; the
    /// returned effects are started before `send` returns, but may complete
    /// later. Use the returned [`EffectHandle`] to await settlement of the
    /// entire effect cascade.
    pub async fn send(&self, action: A) -> EffectHandle {
        let (handle, tracking) = EffectHandle::new();
        self.dispatch(action, &tracking).await;
        handle
    }

    /// Read a projection of the current state.
    pub async fn state<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        let state = self.state.read().await;
        f(&state)
    }

    /// Run the reducer for one action and start its effects under the given
    /// tracking context. Feedback actions reuse the same context so the
    /// original handle observes the whole cascade.
    async fn dispatch(&self, action: A, tracking: &EffectTracking) {
        let effects = {
            let mut state = self.state.write().await;
            self.reducer.reduce(&mut state, action, &self.environment)
        };

        for effect in effects {
            self.spawn_effect(effect, tracking.clone());
        }
    }

    fn spawn_effect(&self, effect: Effect<A>, tracking: EffectTracking) {
        tracking.increment();
        let store = self.clone();
        tokio::spawn(async move {
            let guard = DecrementGuard(tracking.clone());
            store.run_effect(effect, &tracking).await;
            drop(guard);
        });
    }

    /// Boxed indirection so `run_effect` can recurse through `Sequential`.
    fn run_boxed<'a>(
        &'a self,
        effect: Effect<A>,
        tracking: &'a EffectTracking,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(self.run_effect(effect, tracking))
    }

    async fn run_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
        match effect {
            Effect::None => {},
            Effect::Parallel(effects) => {
                for effect in effects {
                    self.spawn_effect(effect, tracking.clone());
                }
            },
            Effect::Sequential(effects) => {
                for effect in effects {
                    self.run_boxed(effect, tracking).await;
                }
            },
            Effect::Delay { duration, action } => {
                tokio::time::sleep(duration).await;
                self.dispatch(*action, tracking).await;
            },
            Effect::Future(future) => {
                if let Some(action) = future.await {
                    self.dispatch(action, tracking).await;
                } else {
                    tracing::trace!("effect completed without feedback action");
                }
            },
        }
    }
}
