use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// A vote about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVote {
    /// Ballot number of the chosen candidate at cast time.
    pub code: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub cast_at: DateTime<Utc>,
}

impl NewVote {
    /// A vote for the given code, cast now.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            cast_at: Utc::now(),
        }
    }
}

/// A vote from the database.
///
/// Votes are never updated. Nothing ties `code` to a live candidate, so
/// deleting a candidate leaves its votes behind as orphans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: Id,
    pub code: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub cast_at: DateTime<Utc>,
}
