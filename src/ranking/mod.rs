pub(crate) mod allocator;
pub(crate) mod buckets;
pub(crate) mod cold_start;
pub(crate) mod decay;
pub mod orchestrator;
pub(crate) mod scorer;

use crate::clock::Clock;
use crate::config::RankConfig;
use crate::error::EngineResult;
use crate::models::{ContentItem, RankedItem, TransitionRecord};
use crate::random::RandomSource;
use crate::ranking::scorer::ScoredRow;

/// Produce a ranked batch of items related to the anchor
///
/// The full synchronous pipeline: bucket the pool by signal, score and rank,
/// resolve the cold-start strategy, then allocate batch slots. Pure given
/// the injected clock and random source; performs no I/O.
pub fn recommend(
    config: &RankConfig,
    anchor: &ContentItem,
    pool: &[ContentItem],
    transitions: &[TransitionRecord],
    clock: &dyn Clock,
    rng: &mut dyn RandomSource,
) -> EngineResult<Vec<RankedItem>> {
    config.validate()?;
    let now = clock.now();

    let buckets = buckets::bucket_candidates(anchor, pool, transitions, config, now);
    let decision = cold_start::resolve(&buckets, config);

    tracing::debug!(
        anchor_id = anchor.id,
        pool_size = pool.len(),
        lineage = buckets.lineage.len(),
        same_creator = buckets.same_creator.len(),
        same_server_method = buckets.same_server_method.len(),
        fallback = buckets.fallback.len(),
        click = buckets.click_candidate_count(),
        confidence = decision.confidence,
        strategy = decision.strategy.as_str(),
        "Candidates bucketed"
    );

    let rows = scorer::score_candidates(&buckets, config);
    let ranking = scorer::enforce_lineage_floor(rows, config.lineage_min_slots);
    let batch = allocator::allocate(&ranking, &buckets.fallback, decision.strategy, config, rng);

    Ok(batch.into_iter().map(finalize).collect())
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn finalize(row: ScoredRow) -> RankedItem {
    RankedItem {
        id: row.id,
        score: round_to(row.score, 2),
        reasons: row.reasons,
        click_score: round_to(row.click_score.unwrap_or(0.0), 4),
        click_share: round_to(row.click_share.unwrap_or(0.0), 4),
    }
}
