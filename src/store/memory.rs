use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use chrono::Utc;
use rocket::http::Status;

use crate::error::{Error, Result};
use crate::model::{
    db::{Candidate, NewCandidate, Vote},
    mongodb::Id,
};

use super::ElectionStore;

/// In-memory [`ElectionStore`] with switchable failures, for driving the
/// kiosk without a database.
#[derive(Default)]
pub struct MemoryStore {
    candidates: Mutex<Vec<Candidate>>,
    votes: Mutex<Vec<Vote>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    vote_calls: AtomicUsize,
}

impl MemoryStore {
    /// A store pre-populated with the given candidates.
    pub fn with_candidates(candidates: impl IntoIterator<Item = NewCandidate>) -> Self {
        let store = Self::default();
        store
            .candidates
            .lock()
            .unwrap()
            .extend(candidates.into_iter().map(Candidate::with_fresh_id));
        store
    }

    /// Make every subsequent read fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// How many times `create_vote` was called, including failed calls.
    pub fn vote_calls(&self) -> usize {
        self.vote_calls.load(Ordering::SeqCst)
    }

    /// Codes of all recorded votes, oldest first.
    pub fn voted_codes(&self) -> Vec<String> {
        self.votes
            .lock()
            .unwrap()
            .iter()
            .map(|v| v.code.clone())
            .collect()
    }

    fn check(&self, flag: &AtomicBool) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(Error::Status(
                Status::ServiceUnavailable,
                "Store unreachable".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[rocket::async_trait]
impl ElectionStore for MemoryStore {
    async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        self.check(&self.fail_reads)?;
        let mut candidates = self.candidates.lock().unwrap().clone();
        candidates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(candidates)
    }

    async fn create_candidate(&self, candidate: NewCandidate) -> Result<Id> {
        self.check(&self.fail_writes)?;
        let mut candidates = self.candidates.lock().unwrap();
        if candidates.iter().any(|c| c.code == candidate.code) {
            return Err(Error::Status(
                Status::BadRequest,
                format!("Ballot number {} is already in use", candidate.code),
            ));
        }
        let candidate = Candidate::with_fresh_id(candidate);
        let id = candidate.id;
        candidates.push(candidate);
        Ok(id)
    }

    async fn delete_candidate(&self, id: Id) -> Result<()> {
        self.check(&self.fail_writes)?;
        let mut candidates = self.candidates.lock().unwrap();
        let before = candidates.len();
        candidates.retain(|c| c.id != id);
        if candidates.len() == before {
            Err(Error::not_found(format!("Candidate {id}")))
        } else {
            Ok(())
        }
    }

    async fn list_votes(&self) -> Result<Vec<Vote>> {
        self.check(&self.fail_reads)?;
        Ok(self.votes.lock().unwrap().clone())
    }

    async fn create_vote(&self, code: &str) -> Result<()> {
        self.vote_calls.fetch_add(1, Ordering::SeqCst);
        self.check(&self.fail_writes)?;
        self.votes.lock().unwrap().push(Vote {
            id: Id::new(),
            code: code.to_string(),
            cast_at: Utc::now(),
        });
        Ok(())
    }

    async fn delete_all_votes(&self) -> Result<u64> {
        self.check(&self.fail_writes)?;
        let mut votes = self.votes.lock().unwrap();
        let removed = votes.len() as u64;
        votes.clear();
        Ok(removed)
    }
}
