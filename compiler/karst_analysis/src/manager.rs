//! Pass-result cache shared with the surrounding pass scheduler.
//!
//! Analysis passes hand their results to an [`AnalysisManager`] under a
//! fixed per-pass identifier; the scheduler owns the manager and decides
//! when cached results are invalidated (this crate never does). The
//! manager is an explicit context object passed by reference — there is
//! no process-wide global.

use std::any::Any;

use rustc_hash::FxHashMap;

/// A pass with cacheable output.
///
/// Implemented by unit marker types; `ID` keys the result in the manager
/// and `Output` fixes the stored type, so `get`/`put` are fully typed at
/// the call site.
pub trait Pass {
    /// Unique, stable identifier of the pass.
    const ID: &'static str;
    /// Result type the pass stores.
    type Output: 'static;
}

/// Typed store of pass results, keyed by pass identifier.
#[derive(Default)]
pub struct AnalysisManager {
    results: FxHashMap<&'static str, Box<dyn Any>>,
}

impl AnalysisManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `output` as the result of pass `P`, replacing any previous
    /// result of the same pass.
    pub fn put_pass_result<P: Pass>(&mut self, output: P::Output) {
        self.results.insert(P::ID, Box::new(output));
    }

    /// The cached result of pass `P`, if it has run.
    pub fn get_pass_result<P: Pass>(&self) -> Option<&P::Output> {
        self.results.get(P::ID).and_then(|result| result.downcast_ref())
    }
}
