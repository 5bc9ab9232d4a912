//! API-friendly types, for talking to the kiosk front end and the admin console.

pub mod auth;

pub mod candidate;
pub use candidate::{CandidateDesc, CandidateSpec, FALLBACK_IMAGE};

pub mod id;
pub use id::ApiId;

pub mod results;
pub use results::{ElectionDump, ElectionResults, TallyEntry};

pub mod vote;
pub use vote::VoteDesc;
