use chrono::{DateTime, Utc};
use log::warn;

use crate::model::db::Candidate;

use super::{
    ballot::{BallotNumber, Digit},
    deadline::DeadlineGate,
    resolver::{resolve, Resolution},
    screen::{Screen, ScreenStatus},
    tone::Tone,
};

/// The candidate list as last loaded. Always replaced wholesale.
#[derive(Debug, Clone)]
enum Candidates {
    Loaded(Vec<Candidate>),
    Unavailable(String),
}

/// Outcome of pressing confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Input is locked or voting is closed; nothing happened.
    Ignored,
    /// The number matches no candidate. Nothing changed.
    Rejected,
    /// The booth is now locked and this vote must be submitted.
    Accepted(Submission),
}

/// A vote handed to the submission pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Distinguishes this submission from any earlier one, so a late
    /// completion cannot unlock the wrong ballot.
    pub attempt: u64,
    pub code: String,
}

/// How a submission finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Recorded,
    Failed(String),
}

/// State of the single voting booth: the ballot in progress, the input lock,
/// the deadline gate and the cached candidate list.
///
/// Every method takes effect immediately; the async parts (store calls,
/// timers) live in [`super::Kiosk`].
#[derive(Debug, Clone)]
pub struct Booth {
    number: BallotNumber,
    locked: bool,
    attempt: u64,
    gate: DeadlineGate,
    candidates: Candidates,
    notification: Option<String>,
}

impl Booth {
    pub fn new(deadline: DateTime<Utc>) -> Self {
        Self {
            number: BallotNumber::default(),
            locked: false,
            attempt: 0,
            gate: DeadlineGate::new(deadline),
            candidates: Candidates::Unavailable("Candidate list not loaded yet".to_string()),
            notification: None,
        }
    }

    pub fn number(&self) -> &BallotNumber {
        &self.number
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_closed(&self) -> bool {
        self.gate.is_closed()
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.gate.deadline()
    }

    /// Check the deadline. Returns true if this call closed voting, in which
    /// case any unconfirmed number has been wiped.
    pub fn observe_deadline(&mut self, now: DateTime<Utc>) -> bool {
        let closed_now = self.gate.observe(now);
        if closed_now && !self.locked {
            self.number.clear();
        }
        closed_now
    }

    /// Type a digit. Returns the tone to play if the digit was taken.
    pub fn append_digit(&mut self, digit: Digit, now: DateTime<Utc>) -> Option<Tone> {
        if !self.accepts_input(now) || self.candidate_list().is_none() {
            return None;
        }
        if !self.number.push(digit) {
            return None;
        }
        self.notification = None;
        Some(Tone::Key)
    }

    /// Wipe the number typed so far.
    pub fn correct(&mut self, now: DateTime<Utc>) -> Option<Tone> {
        if !self.accepts_input(now) {
            return None;
        }
        self.number.clear();
        self.notification = None;
        Some(Tone::Key)
    }

    /// Try to cast the number typed so far. On success the booth is locked
    /// before this returns.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> Confirmation {
        if !self.accepts_input(now) {
            return Confirmation::Ignored;
        }
        let code = match self.candidate_list() {
            None => return Confirmation::Ignored,
            Some(candidates) => match resolve(self.number.as_str(), candidates) {
                Resolution::Matched(candidate) => candidate.code.clone(),
                Resolution::Pending | Resolution::Invalid => return Confirmation::Rejected,
            },
        };
        self.locked = true;
        self.attempt += 1;
        self.notification = None;
        Confirmation::Accepted(Submission {
            attempt: self.attempt,
            code,
        })
    }

    /// Unlock after a submission finishes. A recorded vote clears the number
    /// for the next voter; a failed one keeps it so the voter can retry.
    ///
    /// Returns false, changing nothing, if `attempt` is not the submission
    /// currently holding the lock.
    pub fn release(&mut self, attempt: u64, settlement: Settlement) -> bool {
        if !self.locked || attempt != self.attempt {
            warn!(
                "Ignoring stale settlement of attempt {attempt} (current {}, locked {})",
                self.attempt, self.locked
            );
            return false;
        }
        self.locked = false;
        match settlement {
            Settlement::Recorded => self.number.clear(),
            Settlement::Failed(msg) => {
                self.notification = Some(msg);
                if self.gate.is_closed() {
                    self.number.clear();
                }
            }
        }
        true
    }

    /// Replace the cached candidate list.
    pub fn set_candidates(&mut self, candidates: Vec<Candidate>) {
        self.candidates = Candidates::Loaded(candidates);
    }

    /// Record that the candidate list could not be loaded.
    pub fn set_unavailable(&mut self, reason: String) {
        self.candidates = Candidates::Unavailable(reason);
    }

    /// Render the current state.
    pub fn screen(&self) -> Screen {
        let mut screen = Screen {
            status: ScreenStatus::Pending,
            number: self.number.clone(),
            candidate: None,
            notification: self.notification.clone(),
            error: None,
            deadline: self.gate.deadline(),
        };
        if self.locked {
            screen.status = ScreenStatus::Voted;
        } else if self.gate.is_closed() {
            screen.status = ScreenStatus::Closed;
        } else {
            match &self.candidates {
                Candidates::Unavailable(reason) => {
                    screen.status = ScreenStatus::Unavailable;
                    screen.error = Some(reason.clone());
                }
                Candidates::Loaded(candidates) => {
                    match resolve(self.number.as_str(), candidates) {
                        Resolution::Pending => screen.status = ScreenStatus::Pending,
                        Resolution::Invalid => screen.status = ScreenStatus::Invalid,
                        Resolution::Matched(candidate) => {
                            screen.status = ScreenStatus::Matched;
                            screen.candidate = Some(candidate.clone().into());
                        }
                    }
                }
            }
        }
        screen
    }

    /// Input guard shared by every key: the lock and the deadline. The
    /// deadline is checked here as well as by the poller.
    fn accepts_input(&mut self, now: DateTime<Utc>) -> bool {
        self.observe_deadline(now);
        !self.locked && !self.gate.is_closed()
    }

    fn candidate_list(&self) -> Option<&[Candidate]> {
        match &self.candidates {
            Candidates::Loaded(candidates) => Some(candidates),
            Candidates::Unavailable(_) => None,
        }
    }
}
