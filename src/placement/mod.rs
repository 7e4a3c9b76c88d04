mod candidates;
mod engine;
mod result;

pub use candidates::{Candidate, CandidateRank, candidates_for};
pub use engine::{PlacementEngine, Route};
pub use result::{LayoutEntry, LayoutResult, Outcome, RouteChoice, SuppressReason};
