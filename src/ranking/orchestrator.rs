use std::time::Instant;

use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::RankConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{RankedItem, RequestContext};
use crate::random::RandomSource;
use crate::source::ContentSource;

/// Per-phase wall-clock timings for one recommendation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseTimings {
    pub input_load_ms: u64,
    pub score_ms: u64,
    pub total_ms: u64,
}

/// Input sizes observed for one recommendation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputSizes {
    pub pool_size: usize,
    pub transitions_size: usize,
}

/// Ranked batch plus timing and size diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankOutcome {
    pub items: Vec<RankedItem>,
    pub timings: PhaseTimings,
    pub sizes: InputSizes,
}

/// Load inputs through the given source, then run the synchronous scoring
/// pipeline over them, timing the two phases separately.
///
/// The single `load_inputs` await is the only suspension point. Loader and
/// scorer errors propagate unchanged; retry and fallback policy belong to
/// the caller.
pub async fn recommend_with_source(
    config: &RankConfig,
    source: &dyn ContentSource,
    ctx: &RequestContext,
    clock: &dyn Clock,
    rng: &mut dyn RandomSource,
) -> EngineResult<RankOutcome> {
    let request_id = Uuid::new_v4();
    let span = tracing::debug_span!(
        "related_recommend",
        request_id = %request_id,
        anchor_id = ctx.anchor_id,
    );

    async move {
        let started = Instant::now();
        let inputs = source.load_inputs(ctx).await?;
        let input_load_ms = started.elapsed().as_millis() as u64;

        if inputs.anchor.id != ctx.anchor_id {
            return Err(EngineError::InvalidInput(format!(
                "loader returned anchor {} for requested anchor {}",
                inputs.anchor.id, ctx.anchor_id
            )));
        }

        let scoring_started = Instant::now();
        let items = super::recommend(
            config,
            &inputs.anchor,
            &inputs.pool,
            &inputs.transitions,
            clock,
            rng,
        )?;
        let score_ms = scoring_started.elapsed().as_millis() as u64;
        let total_ms = started.elapsed().as_millis() as u64;

        tracing::debug!(
            input_load_ms,
            score_ms,
            total_ms,
            pool_size = inputs.pool.len(),
            transitions_size = inputs.transitions.len(),
            items = items.len(),
            "Related ranking complete"
        );

        Ok(RankOutcome {
            items,
            timings: PhaseTimings {
                input_load_ms,
                score_ms,
                total_ms,
            },
            sizes: InputSizes {
                pool_size: inputs.pool.len(),
                transitions_size: inputs.transitions.len(),
            },
        })
    }
    .instrument(span)
    .await
}
