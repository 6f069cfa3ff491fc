//! Explainer Handle - Startup-loaded, atomically replaceable engine
//!
//! Readers clone the current `Arc` and release the lock before doing any
//! work; `replace` publishes a fully built engine in one swap.

use std::sync::Arc;

use parking_lot::RwLock;

use super::engine::SampleExplainer;

pub struct ExplainerHandle {
    current: RwLock<Arc<SampleExplainer>>,
}

impl ExplainerHandle {
    pub fn new(explainer: SampleExplainer) -> Self {
        Self {
            current: RwLock::new(Arc::new(explainer)),
        }
    }

    /// Snapshot of the engine in service right now
    pub fn current(&self) -> Arc<SampleExplainer> {
        Arc::clone(&self.current.read())
    }

    /// Swap in a new engine; in-flight requests finish on the old one.
    /// Returns the replaced engine.
    pub fn replace(&self, explainer: SampleExplainer) -> Arc<SampleExplainer> {
        let next = Arc::new(explainer);
        let previous = std::mem::replace(&mut *self.current.write(), next);
        log::info!("Explainer replaced ({} rows now served)", self.current().row_count());
        previous
    }
}
