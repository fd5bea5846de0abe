use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::config::RankConfig;
use crate::models::ContentItem;
use crate::ranking::decay;

/// Recency window for the fallback bucket, in days
const FALLBACK_WINDOW_DAYS: f64 = 7.0;

/// A click-transition candidate paired with its decayed count
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClickCandidate {
    pub to_id: i64,
    pub effective: f64,
}

/// Candidate ids partitioned by signal
///
/// Buckets hold ids in first-encountered pool order; no sorting happens at
/// this stage. Every bucket except `click` is truncated to
/// `candidate_cap_per_signal`.
#[derive(Debug, Default)]
pub(crate) struct SignalBuckets {
    pub lineage: Vec<i64>,
    pub same_creator: Vec<i64>,
    pub same_server_method: Vec<i64>,
    pub fallback: Vec<i64>,
    pub click: Vec<ClickCandidate>,
}

impl SignalBuckets {
    /// Distinct click-transition targets, for cold-start confidence
    pub fn click_candidate_count(&self) -> usize {
        self.click
            .iter()
            .map(|c| c.to_id)
            .collect::<HashSet<i64>>()
            .len()
    }
}

/// Partition the candidate pool into signal buckets (lineage, same-creator,
/// same-method, recency fallback) and resolve click-transition candidates
/// from the transition log.
pub(crate) fn bucket_candidates(
    anchor: &ContentItem,
    pool: &[ContentItem],
    transitions: &[crate::models::TransitionRecord],
    config: &RankConfig,
    now: DateTime<Utc>,
) -> SignalBuckets {
    let cap = config.candidate_cap_per_signal;
    let mut buckets = SignalBuckets::default();

    // Eligible pool: no anchor, no explicitly-unpublished items, first
    // occurrence wins on duplicate ids.
    let mut eligible: Vec<&ContentItem> = Vec::with_capacity(pool.len());
    let mut by_id: HashMap<i64, &ContentItem> = HashMap::with_capacity(pool.len());
    for item in pool {
        if item.id == anchor.id || !item.is_published() {
            continue;
        }
        if by_id.contains_key(&item.id) {
            continue;
        }
        by_id.insert(item.id, item);
        eligible.push(item);
    }

    for item in &eligible {
        if buckets.lineage.len() < cap && is_lineage(anchor, item) {
            buckets.lineage.push(item.id);
        }
        if buckets.same_creator.len() < cap && item.user_id == anchor.user_id {
            buckets.same_creator.push(item.id);
        }
        if buckets.same_server_method.len() < cap && is_same_server_method(anchor, item) {
            buckets.same_server_method.push(item.id);
        }
        if buckets.fallback.len() < cap && within_fallback_window(anchor, item) {
            buckets.fallback.push(item.id);
        }
    }

    // No recent neighbors at all: fall back to the entire eligible pool.
    if buckets.fallback.is_empty() {
        buckets.fallback = eligible.iter().take(cap).map(|item| item.id).collect();
    }

    // Click transitions are capped at load, before decay; zero-effective
    // records are then dropped from the bucket entirely.
    buckets.click = transitions
        .iter()
        .filter(|t| t.from_id == anchor.id && by_id.contains_key(&t.to_id))
        .take(config.transition_cap_per_from)
        .map(|t| ClickCandidate {
            to_id: t.to_id,
            effective: decay::effective_count(t.count, t.last_updated, now, config),
        })
        .filter(|c| c.effective > 0.0)
        .collect();

    buckets
}

fn is_lineage(anchor: &ContentItem, item: &ContentItem) -> bool {
    if anchor.family_id.is_some() && anchor.family_id == item.family_id {
        return true;
    }
    item.meta.mutate_of_id == Some(anchor.id) || anchor.meta.mutate_of_id == Some(item.id)
}

fn is_same_server_method(anchor: &ContentItem, item: &ContentItem) -> bool {
    anchor.meta.server_id.is_some()
        && anchor.meta.server_id == item.meta.server_id
        && anchor.meta.method.is_some()
        && anchor.meta.method == item.meta.method
}

fn within_fallback_window(anchor: &ContentItem, item: &ContentItem) -> bool {
    let seconds = (item.created_at - anchor.created_at).num_milliseconds() as f64 / 1000.0;
    (seconds / 86_400.0).abs() <= FALLBACK_WINDOW_DAYS
}
