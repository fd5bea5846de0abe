//! Related-content ranking engine
//!
//! Given a seed item, a candidate pool, and a log of observed view
//! transitions, produces a ranked batch of recommended items. Independent
//! weak signals (lineage, authorship, generation method, learned click
//! transitions, recency fallback) are blended into one ordered list, with
//! minimum lineage representation, randomized exploration slots, and a
//! cold-start mode that favors exploration when evidence is sparse.
//!
//! The engine performs no I/O: candidates and transitions come either as
//! plain slices ([`recommend`]) or through a [`ContentSource`] loader
//! awaited by the async wrapper ([`recommend_with_source`]). Time and
//! randomness are injected ([`Clock`], [`RandomSource`]) so any served
//! batch can be replayed exactly.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod random;
pub mod ranking;
pub mod source;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ColdMode, RankConfig};
pub use error::{EngineError, EngineResult};
pub use models::{
    ContentItem, ItemMeta, RankedItem, Reason, RecommendInputs, RequestContext, TransitionRecord,
};
pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use ranking::orchestrator::{recommend_with_source, InputSizes, PhaseTimings, RankOutcome};
pub use ranking::recommend;
pub use source::ContentSource;
