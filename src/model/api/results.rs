use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::api::{CandidateDesc, VoteDesc};

/// Everything needed to audit an election: every candidate and every vote.
/// This is what `GET /admin/dump` returns, and what the audit tool reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionDump {
    pub candidates: Vec<CandidateDesc>,
    pub votes: Vec<VoteDesc>,
}

impl ElectionDump {
    /// Tally the dump.
    pub fn results(&self) -> ElectionResults {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for vote in &self.votes {
            *counts.entry(vote.code.as_str()).or_default() += 1;
        }

        let mut tally: Vec<TallyEntry> = self
            .candidates
            .iter()
            .map(|candidate| TallyEntry {
                code: candidate.code.clone(),
                name: candidate.name.clone(),
                votes: counts.get(candidate.code.as_str()).copied().unwrap_or(0),
            })
            .collect();
        tally.sort_by(|a, b| b.votes.cmp(&a.votes).then_with(|| a.code.cmp(&b.code)));

        let orphaned_votes = self
            .votes
            .iter()
            .filter(|vote| !self.candidates.iter().any(|c| c.code == vote.code))
            .count() as u64;

        ElectionResults {
            total_votes: self.votes.len() as u64,
            active_candidates: self.candidates.len() as u64,
            orphaned_votes,
            tally,
        }
    }
}

/// Partial or final results of the election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionResults {
    pub total_votes: u64,
    pub active_candidates: u64,
    /// Votes whose candidate has since been deleted.
    pub orphaned_votes: u64,
    /// One entry per candidate, most votes first.
    pub tally: Vec<TallyEntry>,
}

/// Vote count for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyEntry {
    pub code: String,
    pub name: String,
    pub votes: u64,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::model::{
        db::{Candidate, NewCandidate},
        mongodb::Id,
    };

    use super::*;

    fn vote(code: &str) -> VoteDesc {
        VoteDesc {
            id: Id::new().into(),
            code: code.to_string(),
            cast_at: Utc::now(),
        }
    }

    fn dump(votes: &[&str]) -> ElectionDump {
        ElectionDump {
            candidates: [
                NewCandidate::example1(),
                NewCandidate::example2(),
                NewCandidate::example3(),
            ]
            .into_iter()
            .map(|c| Candidate::with_fresh_id(c).into())
            .collect(),
            votes: votes.iter().map(|code| vote(code)).collect(),
        }
    }

    #[test]
    fn tally_is_ordered_by_votes_then_code() {
        let results = dump(&["17", "42", "17", "42", "01", "17"]).results();
        let order: Vec<_> = results
            .tally
            .iter()
            .map(|t| (t.code.as_str(), t.votes))
            .collect();
        assert_eq!(order, vec![("17", 3), ("42", 2), ("01", 1)]);
        assert_eq!(results.total_votes, 6);
        assert_eq!(results.active_candidates, 3);
        assert_eq!(results.orphaned_votes, 0);
    }

    #[test]
    fn candidates_without_votes_are_listed() {
        let results = dump(&[]).results();
        assert_eq!(results.tally.len(), 3);
        assert!(results.tally.iter().all(|t| t.votes == 0));
        let codes: Vec<_> = results.tally.iter().map(|t| t.code.as_str()).collect();
        assert_eq!(codes, vec!["01", "17", "42"]);
    }

    #[test]
    fn votes_for_deleted_candidates_are_orphaned() {
        let results = dump(&["01", "99", "99", "05"]).results();
        assert_eq!(results.total_votes, 4);
        assert_eq!(results.orphaned_votes, 3);
        let counted: u64 = results.tally.iter().map(|t| t.votes).sum();
        assert_eq!(counted + results.orphaned_votes, results.total_votes);
    }
}
