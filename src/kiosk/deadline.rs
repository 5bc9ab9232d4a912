use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source of the current time. Injected so the deadline can be tested
/// without waiting for it.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Whether the election is still accepting votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    Open,
    Closed,
}

/// One-way gate that closes at the election deadline.
#[derive(Debug, Clone)]
pub struct DeadlineGate {
    deadline: DateTime<Utc>,
    state: GateState,
}

impl DeadlineGate {
    pub fn new(deadline: DateTime<Utc>) -> Self {
        Self {
            deadline,
            state: GateState::Open,
        }
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == GateState::Closed
    }

    /// Compare `now` against the deadline. Returns true only on the call that
    /// closes the gate; once closed it never reopens, even if the clock goes
    /// backwards.
    pub fn observe(&mut self, now: DateTime<Utc>) -> bool {
        if self.state == GateState::Open && now >= self.deadline {
            self.state = GateState::Closed;
            true
        } else {
            false
        }
    }
}
