use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

/// Cold-start strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColdMode {
    /// Always trust the merged ranking
    Guess,
    /// Always prioritize randomized unseen items
    Explore,
    /// Choose by confidence against `cold_confidence_threshold`
    Auto,
}

/// Ranking configuration, merged over documented defaults
///
/// Supplied fresh per call and never mutated by the engine. Every field can
/// be overridden from the environment via `RELATED_*` variables
/// (e.g. `RELATED_BATCH_SIZE=24`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RankConfig {
    /// Weight for derivation relationships (shared family, parent/child)
    #[serde(default = "default_lineage_weight")]
    pub lineage_weight: f64,

    /// Weight for candidates by the anchor's creator
    #[serde(default = "default_same_creator_weight")]
    pub same_creator_weight: f64,

    /// Weight for candidates sharing the anchor's server and method
    #[serde(default = "default_same_server_method_weight")]
    pub same_server_method_weight: f64,

    /// Weight ceiling for click-transition evidence; per-candidate scores
    /// are normalized against the strongest observed transition
    #[serde(default = "default_click_next_weight")]
    pub click_next_weight: f64,

    /// Weight for the recency fallback bucket; contributes 10% of this value
    #[serde(default = "default_fallback_weight")]
    pub fallback_weight: f64,

    /// Per-bucket candidate cap, applied by truncation
    #[serde(default = "default_candidate_cap_per_signal")]
    pub candidate_cap_per_signal: usize,

    /// Cap on transitions considered from a single anchor
    #[serde(default = "default_transition_cap_per_from")]
    pub transition_cap_per_from: usize,

    /// Exponential half-life for transition counts, in days; `<= 0` disables decay
    #[serde(default = "default_decay_half_life_days")]
    pub decay_half_life_days: f64,

    /// Hard recency window for transitions, in days; only active when the
    /// half-life is not a positive number
    #[serde(default = "default_window_days")]
    pub window_days: f64,

    /// Size of the returned batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Randomized exploration slots blended into each batch
    #[serde(default = "default_random_slots_per_batch")]
    pub random_slots_per_batch: usize,

    /// Minimum lineage representation in the batch, when enough lineage
    /// candidates exist
    #[serde(default = "default_lineage_min_slots")]
    pub lineage_min_slots: usize,

    /// When set, click-transition candidates outrank all other signals
    /// regardless of numeric score
    #[serde(default = "default_hard_preference")]
    pub hard_preference: bool,

    /// Fraction of deterministic slots reserved for click candidates when
    /// `hard_preference` is off
    #[serde(default = "default_click_next_priority_fraction")]
    pub click_next_priority_fraction: f64,

    #[serde(default = "default_cold_mode")]
    pub cold_mode: ColdMode,

    /// Confidence below which `ColdMode::Auto` switches to exploration
    #[serde(default = "default_cold_confidence_threshold")]
    pub cold_confidence_threshold: f64,

    /// Fraction of the batch handed to exploration in cold-start explore mode
    #[serde(default = "default_cold_explore_fraction")]
    pub cold_explore_fraction: f64,

    /// Top-ranked rows kept verbatim in cold-start explore mode
    #[serde(default = "default_cold_explore_min_guess_slots")]
    pub cold_explore_min_guess_slots: usize,
}

fn default_lineage_weight() -> f64 {
    4.0
}

fn default_same_creator_weight() -> f64 {
    2.0
}

fn default_same_server_method_weight() -> f64 {
    1.5
}

fn default_click_next_weight() -> f64 {
    6.0
}

fn default_fallback_weight() -> f64 {
    1.0
}

fn default_candidate_cap_per_signal() -> usize {
    200
}

fn default_transition_cap_per_from() -> usize {
    50
}

fn default_decay_half_life_days() -> f64 {
    14.0
}

fn default_window_days() -> f64 {
    0.0
}

fn default_batch_size() -> usize {
    12
}

fn default_random_slots_per_batch() -> usize {
    2
}

fn default_lineage_min_slots() -> usize {
    2
}

fn default_hard_preference() -> bool {
    true
}

fn default_click_next_priority_fraction() -> f64 {
    0.5
}

fn default_cold_mode() -> ColdMode {
    ColdMode::Auto
}

fn default_cold_confidence_threshold() -> f64 {
    0.35
}

fn default_cold_explore_fraction() -> f64 {
    0.5
}

fn default_cold_explore_min_guess_slots() -> usize {
    2
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            lineage_weight: default_lineage_weight(),
            same_creator_weight: default_same_creator_weight(),
            same_server_method_weight: default_same_server_method_weight(),
            click_next_weight: default_click_next_weight(),
            fallback_weight: default_fallback_weight(),
            candidate_cap_per_signal: default_candidate_cap_per_signal(),
            transition_cap_per_from: default_transition_cap_per_from(),
            decay_half_life_days: default_decay_half_life_days(),
            window_days: default_window_days(),
            batch_size: default_batch_size(),
            random_slots_per_batch: default_random_slots_per_batch(),
            lineage_min_slots: default_lineage_min_slots(),
            hard_preference: default_hard_preference(),
            click_next_priority_fraction: default_click_next_priority_fraction(),
            cold_mode: default_cold_mode(),
            cold_confidence_threshold: default_cold_confidence_threshold(),
            cold_explore_fraction: default_cold_explore_fraction(),
            cold_explore_min_guess_slots: default_cold_explore_min_guess_slots(),
        }
    }
}

impl RankConfig {
    /// Load configuration from `RELATED_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed("RELATED_")
            .from_env::<RankConfig>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Validate once at entry, before any scoring work
    pub fn validate(&self) -> EngineResult<()> {
        if self.batch_size == 0 {
            return Err(EngineError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.candidate_cap_per_signal == 0 || self.transition_cap_per_from == 0 {
            return Err(EngineError::InvalidConfig(
                "candidate caps must be at least 1".to_string(),
            ));
        }

        let weights = [
            ("lineage_weight", self.lineage_weight),
            ("same_creator_weight", self.same_creator_weight),
            ("same_server_method_weight", self.same_server_method_weight),
            ("click_next_weight", self.click_next_weight),
            ("fallback_weight", self.fallback_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }

        let fractions = [
            (
                "click_next_priority_fraction",
                self.click_next_priority_fraction,
            ),
            ("cold_confidence_threshold", self.cold_confidence_threshold),
            ("cold_explore_fraction", self.cold_explore_fraction),
        ];
        for (name, value) in fractions {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(EngineError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}
