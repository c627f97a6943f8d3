//! Neighborhood desirability scoring and the cached metrics lookup behind it.

pub mod cache;
mod score;
mod source;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache, DEFAULT_TTL_SECS};
pub use score::{
    compute_neighborhood_score, score_with_weights, NeighborhoodMetrics, NeighborhoodScore,
    NeighborhoodWeights, ScoreBreakdown, NEIGHBORHOOD_WEIGHTS,
};
pub use source::{
    CachedNeighborhoodSource, NeighborhoodSource, NeighborhoodSourceError,
    StaticNeighborhoodSource,
};
