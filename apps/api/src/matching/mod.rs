// Filter Engine and Recommendation Scorer.
// Pure functions over the shared catalog; no I/O and no session access here.

pub mod filters;
pub mod recommend;
