use log::debug;
use mongodb::{bson::doc, options::FindOptions, Database};
use rocket::{futures::TryStreamExt, http::Status};

use crate::error::{Error, Result};
use crate::model::{
    db::{Candidate, NewCandidate, NewVote, Vote},
    mongodb::{is_duplicate_key_error, Coll, Id},
};

use super::ElectionStore;

/// [`ElectionStore`] backed by the `candidates` and `votes` collections.
pub struct MongoStore {
    candidates: Coll<Candidate>,
    new_candidates: Coll<NewCandidate>,
    votes: Coll<Vote>,
    new_votes: Coll<NewVote>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            candidates: Coll::from_db(db),
            new_candidates: Coll::from_db(db),
            votes: Coll::from_db(db),
            new_votes: Coll::from_db(db),
        }
    }
}

#[rocket::async_trait]
impl ElectionStore for MongoStore {
    async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        let by_name = FindOptions::builder().sort(doc! {"name": 1}).build();
        let candidates = self
            .candidates
            .find(None, by_name)
            .await?
            .try_collect()
            .await?;
        Ok(candidates)
    }

    async fn create_candidate(&self, candidate: NewCandidate) -> Result<Id> {
        let code = candidate.code.clone();
        let result = match self.new_candidates.insert_one(&candidate, None).await {
            Ok(result) => result,
            Err(e) if is_duplicate_key_error(&e) => {
                return Err(Error::Status(
                    Status::BadRequest,
                    format!("Ballot number {code} is already in use"),
                ));
            }
            Err(e) => return Err(e.into()),
        };
        let id: Id = result
            .inserted_id
            .as_object_id()
            .unwrap() // Valid because the ID comes directly from the DB
            .into();
        debug!("Created candidate {id} with ballot number {code}");
        Ok(id)
    }

    async fn delete_candidate(&self, id: Id) -> Result<()> {
        let result = self.candidates.delete_one(id.as_doc(), None).await?;
        if result.deleted_count == 0 {
            Err(Error::not_found(format!("Candidate {id}")))
        } else {
            Ok(())
        }
    }

    async fn list_votes(&self) -> Result<Vec<Vote>> {
        let oldest_first = FindOptions::builder()
            .sort(doc! {"cast_at": 1, "_id": 1})
            .build();
        let votes = self
            .votes
            .find(None, oldest_first)
            .await?
            .try_collect()
            .await?;
        Ok(votes)
    }

    async fn create_vote(&self, code: &str) -> Result<()> {
        self.new_votes.insert_one(NewVote::new(code), None).await?;
        Ok(())
    }

    async fn delete_all_votes(&self) -> Result<u64> {
        let result = self.votes.delete_many(doc! {}, None).await?;
        Ok(result.deleted_count)
    }
}
