use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::api::CandidateDesc;

use super::{ballot::BallotNumber, tone::ToneDesc};

/// What the voting screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenStatus {
    /// Typing; not enough digits yet.
    Pending,
    /// The number belongs to a candidate, shown alongside.
    Matched,
    /// A full number that belongs to nobody.
    Invalid,
    /// A vote was just cast; input is locked.
    Voted,
    /// The election deadline has passed.
    Closed,
    /// The candidate list could not be loaded.
    Unavailable,
}

/// A snapshot of the booth as the voter sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub status: ScreenStatus,
    pub number: BallotNumber,
    pub candidate: Option<CandidateDesc>,
    /// Failure of the last vote submission, until the next keypress.
    pub notification: Option<String>,
    /// Why the candidate list is unavailable.
    pub error: Option<String>,
    pub deadline: DateTime<Utc>,
}

/// Reply to a keypad action: the new screen, and the tone to play, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KioskResponse {
    pub screen: Screen,
    pub tone: Option<ToneDesc>,
}
