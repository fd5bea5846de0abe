use std::collections::{HashMap, HashSet};

use crate::config::RankConfig;
use crate::models::Reason;
use crate::random::{shuffle, RandomSource};
use crate::ranking::cold_start::Strategy;
use crate::ranking::scorer::{sort_by_score, ScoredRow};

/// Reason tier for the hard-preference comparator: click evidence outranks
/// lineage, lineage outranks the flat signals, exploration sinks below all
/// of them. A row sorts at the best tier any of its reasons maps to.
fn reason_tier(row: &ScoredRow) -> u8 {
    if row.has_reason(Reason::ClickNext) {
        0
    } else if row.has_reason(Reason::Lineage) {
        1
    } else if row.has_reason(Reason::SameCreator)
        || row.has_reason(Reason::SameServerMethod)
        || row.has_reason(Reason::Fallback)
    {
        2
    } else if row.has_reason(Reason::ExploreRandom) {
        3
    } else {
        4
    }
}

fn final_sort(rows: &mut [ScoredRow], hard_preference: bool) {
    if hard_preference {
        rows.sort_by(|a, b| {
            reason_tier(a)
                .cmp(&reason_tier(b))
                .then_with(|| {
                    b.click_effective
                        .unwrap_or(0.0)
                        .partial_cmp(&a.click_effective.unwrap_or(0.0))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| {
                    b.score
                        .partial_cmp(&a.score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        });
    } else {
        sort_by_score(rows);
    }
}

/// Assemble the final fixed-size batch from the ranking
///
/// The guess path reserves click slots, tops up lineage representation,
/// fills by score, and blends in randomized exploration slots. The explore
/// path overrides all of that with a guess/explore/fill split. Either way
/// the batch is deduplicated by id, re-sorted by the final comparator, and
/// truncated to `batch_size`.
pub(crate) fn allocate(
    ranking: &[ScoredRow],
    fallback_ids: &[i64],
    strategy: Strategy,
    config: &RankConfig,
    rng: &mut dyn RandomSource,
) -> Vec<ScoredRow> {
    let batch = config.batch_size;
    let by_id: HashMap<i64, &ScoredRow> = ranking.iter().map(|row| (row.id, row)).collect();

    let mut picked: Vec<ScoredRow> = Vec::with_capacity(batch);
    let mut used: HashSet<i64> = HashSet::new();

    match strategy {
        Strategy::Explore => {
            // Keep a handful of best guesses verbatim, then hand the batch
            // over to exploration.
            for row in ranking.iter().take(config.cold_explore_min_guess_slots.min(batch)) {
                if used.insert(row.id) {
                    picked.push(row.clone());
                }
            }

            let explore_quota = (batch as f64 * config.cold_explore_fraction).floor() as usize;
            let explore_take = explore_quota.min(batch - picked.len());
            let mut pool: Vec<i64> = fallback_ids
                .iter()
                .filter(|id| !used.contains(*id))
                .copied()
                .collect();
            shuffle(&mut pool, rng);
            for id in pool.into_iter().take(explore_take) {
                if let Some(row) = by_id.get(&id) {
                    if used.insert(id) {
                        let mut row = (*row).clone();
                        row.tag(Reason::ExploreRandom);
                        picked.push(row);
                    }
                }
            }

            for row in ranking {
                if picked.len() >= batch {
                    break;
                }
                if used.insert(row.id) {
                    picked.push(row.clone());
                }
            }
        }
        Strategy::Guess => {
            let random_slots = config.random_slots_per_batch.min(batch);
            let deterministic = batch - random_slots;

            // 1. Click-transition reservation, strongest evidence first.
            let mut click_ranked: Vec<&ScoredRow> = ranking
                .iter()
                .filter(|row| row.has_reason(Reason::ClickNext))
                .collect();
            click_ranked.sort_by(|a, b| {
                b.click_effective
                    .unwrap_or(0.0)
                    .partial_cmp(&a.click_effective.unwrap_or(0.0))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| {
                        b.score
                            .partial_cmp(&a.score)
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
            });
            let click_quota = if config.hard_preference {
                deterministic
            } else {
                (deterministic as f64 * config.click_next_priority_fraction).floor() as usize
            };
            for row in click_ranked.into_iter().take(click_quota) {
                if used.insert(row.id) {
                    picked.push(row.clone());
                }
            }

            // 2. Lineage top-up, then plain score order.
            let lineage_target = deterministic.min(config.lineage_min_slots);
            let mut lineage_count = picked
                .iter()
                .filter(|row| row.has_reason(Reason::Lineage))
                .count();
            for row in ranking {
                if picked.len() >= deterministic || lineage_count >= lineage_target {
                    break;
                }
                if row.has_reason(Reason::Lineage) && used.insert(row.id) {
                    picked.push(row.clone());
                    lineage_count += 1;
                }
            }
            for row in ranking {
                if picked.len() >= deterministic {
                    break;
                }
                if used.insert(row.id) {
                    picked.push(row.clone());
                }
            }

            // 3. Randomized exploration slots from the fallback bucket, any
            // shortfall topped up from the remaining ranking.
            let mut pool: Vec<i64> = fallback_ids
                .iter()
                .filter(|id| !used.contains(*id))
                .copied()
                .collect();
            shuffle(&mut pool, rng);
            for id in pool.into_iter().take(random_slots) {
                if let Some(row) = by_id.get(&id) {
                    if used.insert(id) {
                        let mut row = (*row).clone();
                        row.tag(Reason::ExploreRandom);
                        picked.push(row);
                    }
                }
            }
            for row in ranking {
                if picked.len() >= batch {
                    break;
                }
                if used.insert(row.id) {
                    let mut row = row.clone();
                    row.tag(Reason::ExploreRandom);
                    picked.push(row);
                }
            }
        }
    }

    final_sort(&mut picked, config.hard_preference);
    picked.truncate(batch);
    picked
}
