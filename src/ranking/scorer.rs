use std::collections::{HashMap, HashSet};

use crate::config::RankConfig;
use crate::models::Reason;
use crate::ranking::buckets::SignalBuckets;

/// Score accumulator for one unique candidate id
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoredRow {
    pub id: i64,
    pub score: f64,
    pub reasons: Vec<Reason>,
    /// Decayed click count summed over this candidate's transitions
    pub click_effective: Option<f64>,
    /// Normalized click evidence: effective count over the bucket maximum
    pub click_score: Option<f64>,
    /// This candidate's share of all observed next-clicks
    pub click_share: Option<f64>,
}

impl ScoredRow {
    fn new(id: i64) -> Self {
        Self {
            id,
            score: 0.0,
            reasons: Vec::new(),
            click_effective: None,
            click_score: None,
            click_share: None,
        }
    }

    pub fn has_reason(&self, reason: Reason) -> bool {
        self.reasons.contains(&reason)
    }

    pub fn tag(&mut self, reason: Reason) {
        if !self.reasons.contains(&reason) {
            self.reasons.push(reason);
        }
    }
}

/// Sort rows descending by score, NaN-safe, stable on ties
pub(crate) fn sort_by_score(rows: &mut [ScoredRow]) {
    rows.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Merge bucket membership and click evidence into one weighted score per
/// candidate, recording which signals contributed.
pub(crate) fn score_candidates(buckets: &SignalBuckets, config: &RankConfig) -> Vec<ScoredRow> {
    let mut rows: Vec<ScoredRow> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    let bump = |rows: &mut Vec<ScoredRow>,
                index: &mut HashMap<i64, usize>,
                id: i64,
                weight: f64,
                reason: Reason| {
        let at = *index.entry(id).or_insert_with(|| {
            rows.push(ScoredRow::new(id));
            rows.len() - 1
        });
        rows[at].score += weight;
        rows[at].tag(reason);
    };

    for &id in &buckets.lineage {
        bump(&mut rows, &mut index, id, config.lineage_weight, Reason::Lineage);
    }
    for &id in &buckets.same_creator {
        bump(
            &mut rows,
            &mut index,
            id,
            config.same_creator_weight,
            Reason::SameCreator,
        );
    }
    for &id in &buckets.same_server_method {
        bump(
            &mut rows,
            &mut index,
            id,
            config.same_server_method_weight,
            Reason::SameServerMethod,
        );
    }
    // The recency fallback is a weak prior, not a real signal: 10% weight.
    for &id in &buckets.fallback {
        bump(
            &mut rows,
            &mut index,
            id,
            config.fallback_weight * 0.1,
            Reason::Fallback,
        );
    }

    // Click transitions: sum effective counts per target, then normalize by
    // the bucket maximum so one runaway historical count cannot dominate.
    let mut click_order: Vec<i64> = Vec::new();
    let mut click_sums: HashMap<i64, f64> = HashMap::new();
    for candidate in &buckets.click {
        if !click_sums.contains_key(&candidate.to_id) {
            click_order.push(candidate.to_id);
        }
        *click_sums.entry(candidate.to_id).or_insert(0.0) += candidate.effective;
    }

    // Walk targets in insertion order; summing a HashMap directly would let
    // its randomized iteration order perturb the float totals between runs.
    let click_max = click_order
        .iter()
        .map(|id| click_sums[id])
        .fold(0.0_f64, f64::max);
    if click_max > 0.0 {
        let total: f64 = click_order.iter().map(|id| click_sums[id]).sum();
        for id in click_order {
            let effective = click_sums[&id];
            let normalized = effective / click_max;
            bump(
                &mut rows,
                &mut index,
                id,
                config.click_next_weight * normalized,
                Reason::ClickNext,
            );
            let at = index[&id];
            rows[at].click_effective = Some(effective);
            rows[at].click_score = Some(normalized);
            rows[at].click_share = Some(effective / total);
        }
    }

    sort_by_score(&mut rows);
    rows
}

/// Enforce minimum lineage representation in the top of the ranking
///
/// If fewer than `min_slots` of the top `min_slots` rows carry the lineage
/// signal, lineage rows from further down are promoted (in their existing
/// relative order), displacing the lowest-scoring non-lineage rows out of
/// that window. The affected partitions are re-sorted by score and the
/// result deduplicated by id.
pub(crate) fn enforce_lineage_floor(rows: Vec<ScoredRow>, min_slots: usize) -> Vec<ScoredRow> {
    let window = min_slots.min(rows.len());
    if window == 0 {
        return rows;
    }

    let in_window = rows[..window]
        .iter()
        .filter(|r| r.has_reason(Reason::Lineage))
        .count();
    if in_window >= min_slots {
        return rows;
    }

    let needed = min_slots - in_window;
    let promoted: Vec<usize> = (window..rows.len())
        .filter(|&i| rows[i].has_reason(Reason::Lineage))
        .take(needed)
        .collect();
    if promoted.is_empty() {
        return rows;
    }

    let displaced: Vec<usize> = (0..window)
        .rev()
        .filter(|&i| !rows[i].has_reason(Reason::Lineage))
        .take(promoted.len())
        .collect();

    let promoted_set: HashSet<usize> = promoted.iter().copied().collect();
    let displaced_set: HashSet<usize> = displaced.iter().copied().collect();

    let mut top: Vec<ScoredRow> = (0..window)
        .filter(|i| !displaced_set.contains(i))
        .chain(promoted.iter().copied())
        .map(|i| rows[i].clone())
        .collect();
    sort_by_score(&mut top);

    let mut rest: Vec<ScoredRow> = displaced
        .iter()
        .copied()
        .chain((window..rows.len()).filter(|i| !promoted_set.contains(i)))
        .map(|i| rows[i].clone())
        .collect();
    sort_by_score(&mut rest);

    let mut seen: HashSet<i64> = HashSet::new();
    top.into_iter()
        .chain(rest)
        .filter(|row| seen.insert(row.id))
        .collect()
}
