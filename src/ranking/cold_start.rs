use crate::config::{ColdMode, RankConfig};
use crate::ranking::buckets::SignalBuckets;

/// Resolved ranking strategy for one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// Trust the merged ranking
    Guess,
    /// Prioritize randomized unseen items
    Explore,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Guess => "guess",
            Strategy::Explore => "explore",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ColdStartDecision {
    pub strategy: Strategy,
    pub confidence: f64,
}

/// Signal-evidence confidence in [0, 1]
///
/// Weighted sum of saturating ratios: click evidence saturates at 3
/// candidates and carries half the confidence; lineage saturates at 3;
/// creator and server/method each saturate at 5.
pub(crate) fn confidence(buckets: &SignalBuckets) -> f64 {
    let saturating = |count: usize, at: f64| (count as f64 / at).min(1.0);

    saturating(buckets.click_candidate_count(), 3.0) * 0.5
        + saturating(buckets.lineage.len(), 3.0) * 0.2
        + saturating(buckets.same_creator.len(), 5.0) * 0.15
        + saturating(buckets.same_server_method.len(), 5.0) * 0.15
}

/// Choose between guessing and exploring for this call
pub(crate) fn resolve(buckets: &SignalBuckets, config: &RankConfig) -> ColdStartDecision {
    let confidence = confidence(buckets);
    let strategy = match config.cold_mode {
        ColdMode::Guess => Strategy::Guess,
        ColdMode::Explore => Strategy::Explore,
        ColdMode::Auto => {
            if confidence >= config.cold_confidence_threshold {
                Strategy::Guess
            } else {
                Strategy::Explore
            }
        }
    };
    ColdStartDecision {
        strategy,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::buckets::ClickCandidate;

    fn buckets_with(click: usize, lineage: usize, creator: usize, server: usize) -> SignalBuckets {
        let mut buckets = SignalBuckets::default();
        buckets.click = (0..click)
            .map(|i| ClickCandidate {
                to_id: 100 + i as i64,
                effective: 1.0,
            })
            .collect();
        buckets.lineage = (0..lineage).map(|i| 200 + i as i64).collect();
        buckets.same_creator = (0..creator).map(|i| 300 + i as i64).collect();
        buckets.same_server_method = (0..server).map(|i| 400 + i as i64).collect();
        buckets
    }

    #[test]
    fn test_confidence_empty_is_zero() {
        assert_eq!(confidence(&SignalBuckets::default()), 0.0);
    }

    #[test]
    fn test_confidence_saturates_at_one() {
        let buckets = buckets_with(10, 10, 10, 10);
        assert!((confidence(&buckets) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_partial_ratios() {
        // 1/3 click, 1/3 lineage, 1/5 creator, 0 server.
        let buckets = buckets_with(1, 1, 1, 0);
        let expected = 0.5 / 3.0 + 0.2 / 3.0 + 0.15 / 5.0;
        assert!((confidence(&buckets) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_forced_modes_ignore_confidence() {
        let rich = buckets_with(10, 10, 10, 10);
        let config = RankConfig {
            cold_mode: ColdMode::Explore,
            ..RankConfig::default()
        };
        assert_eq!(resolve(&rich, &config).strategy, Strategy::Explore);

        let empty = SignalBuckets::default();
        let config = RankConfig {
            cold_mode: ColdMode::Guess,
            ..RankConfig::default()
        };
        assert_eq!(resolve(&empty, &config).strategy, Strategy::Guess);
    }

    #[test]
    fn test_auto_threshold_is_inclusive() {
        let buckets = buckets_with(3, 0, 0, 0); // confidence = 0.5
        let config = RankConfig {
            cold_mode: ColdMode::Auto,
            cold_confidence_threshold: 0.5,
            ..RankConfig::default()
        };
        assert_eq!(resolve(&buckets, &config).strategy, Strategy::Guess);

        let config = RankConfig {
            cold_confidence_threshold: 0.51,
            ..config
        };
        assert_eq!(resolve(&buckets, &config).strategy, Strategy::Explore);
    }
}
