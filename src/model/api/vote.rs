use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{api::ApiId, db::Vote};

/// API-friendly description of a vote, for the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteDesc {
    pub id: ApiId,
    pub code: String,
    pub cast_at: DateTime<Utc>,
}

impl From<Vote> for VoteDesc {
    fn from(vote: Vote) -> Self {
        Self {
            id: vote.id.into(),
            code: vote.code,
            cast_at: vote.cast_at,
        }
    }
}
