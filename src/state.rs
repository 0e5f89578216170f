/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - The authorization runtime is an immutable snapshot behind ArcSwap:
 *   requests load it lock-free, reload stores a new one atomically
 * - Clone is cheap (Arc inside)
 */
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::services::factory::AuthzRuntime;

#[derive(Clone, Debug)]
pub struct AppState {
    runtime: Arc<ArcSwap<AuthzRuntime>>,
}

impl AppState {
    pub fn new(runtime: AuthzRuntime) -> Self {
        Self {
            runtime: Arc::new(ArcSwap::from_pointee(runtime)),
        }
    }

    /// Snapshot in effect right now. Holding it keeps it alive across a reload.
    pub fn runtime(&self) -> Arc<AuthzRuntime> {
        self.runtime.load_full()
    }

    pub fn replace(&self, runtime: AuthzRuntime) {
        self.runtime.store(Arc::new(runtime));
    }
}
