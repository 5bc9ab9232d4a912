//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in an DB-friendly way, e.g.:
//!
//! - IDs and datetimes are serialised in MongoDB's own format.

pub mod candidate;
pub use candidate::{Candidate, CandidateCore, NewCandidate};

pub mod vote;
pub use vote::{NewVote, Vote};
