use crate::error::EngineResult;
use crate::models::{RecommendInputs, RequestContext};

#[cfg(test)]
use mockall::automock;

/// Candidate data loader abstraction
///
/// The engine never performs I/O itself; the host backs this trait with its
/// real data store (or a fixture in tests) and the orchestrator awaits the
/// single `load_inputs` call. Loader errors propagate to the caller
/// unchanged — the engine adds no retry or fallback.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    /// Load the anchor, candidate pool, and transition log for one request
    async fn load_inputs(&self, ctx: &RequestContext) -> EngineResult<RecommendInputs>;
}
