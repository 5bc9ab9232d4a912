//! Persistence of candidates and votes.
//!
//! Everything above this module talks to an [`ElectionStore`], never to
//! MongoDB directly, so the kiosk can be driven against an in-memory store
//! in tests.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{
    db::{Candidate, NewCandidate, Vote},
    mongodb::Id,
};

mod mongo;
pub use mongo::MongoStore;

#[cfg(test)]
mod memory;
#[cfg(test)]
pub use memory::MemoryStore;

/// Shared handle on the store, as kept in managed state.
pub type Store = Arc<dyn ElectionStore>;

/// The candidate and vote datastore.
///
/// Every call may fail with a transport or store error; callers decide
/// whether that is fatal to the view or recoverable.
#[rocket::async_trait]
pub trait ElectionStore: Send + Sync {
    /// All candidates, ordered by name.
    async fn list_candidates(&self) -> Result<Vec<Candidate>>;

    /// Insert a candidate, returning its new ID. Fails with 400 if the
    /// ballot number is already taken.
    async fn create_candidate(&self, candidate: NewCandidate) -> Result<Id>;

    /// Delete a candidate. Its votes are left in place.
    async fn delete_candidate(&self, id: Id) -> Result<()>;

    /// All votes, oldest first.
    async fn list_votes(&self) -> Result<Vec<Vote>>;

    /// Record one vote for the given ballot number, stamped with the
    /// current time.
    async fn create_vote(&self, code: &str) -> Result<()>;

    /// Delete every vote unconditionally, returning how many were removed.
    async fn delete_all_votes(&self) -> Result<u64>;
}
