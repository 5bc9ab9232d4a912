use log::{error, info, warn};
use rocket::{futures::future::try_join, http::Status, serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    kiosk::Kiosk,
    model::{
        api::{
            auth::AuthToken, CandidateDesc, CandidateSpec, ElectionDump, ElectionResults,
            VoteDesc,
        },
        db::Candidate,
        mongodb::Id,
    },
    store::Store,
};

pub fn routes() -> Vec<Route> {
    routes![
        results,
        votes,
        dump,
        candidates,
        create_candidate,
        delete_candidate,
        delete_votes,
    ]
}

#[get("/admin/results")]
async fn results(_token: AuthToken, store: &State<Store>) -> Result<Json<ElectionResults>> {
    Ok(Json(load_dump(store).await?.results()))
}

#[get("/admin/votes")]
async fn votes(_token: AuthToken, store: &State<Store>) -> Result<Json<Vec<VoteDesc>>> {
    let votes = store.list_votes().await?;
    Ok(Json(votes.into_iter().map(Into::into).collect()))
}

#[get("/admin/dump")]
async fn dump(_token: AuthToken, store: &State<Store>) -> Result<Json<ElectionDump>> {
    Ok(Json(load_dump(store).await?))
}

#[get("/admin/candidates")]
async fn candidates(_token: AuthToken, store: &State<Store>) -> Result<Json<Vec<CandidateDesc>>> {
    let candidates = store.list_candidates().await?;
    Ok(Json(candidates.into_iter().map(Into::into).collect()))
}

#[post("/admin/candidates", data = "<spec>", format = "json")]
async fn create_candidate(
    _token: AuthToken,
    spec: Json<CandidateSpec>,
    store: &State<Store>,
    kiosk: &State<Kiosk>,
) -> Result<Json<CandidateDesc>> {
    let candidate = spec.0.validate()?;
    let id = store.create_candidate(candidate.clone()).await?;
    info!("Registered candidate {} as {}", candidate.code, candidate.name);
    refresh(kiosk).await;

    Ok(Json(
        Candidate {
            id,
            candidate,
        }
        .into(),
    ))
}

#[delete("/admin/candidates/<candidate_id>")]
async fn delete_candidate(
    _token: AuthToken,
    candidate_id: Id,
    store: &State<Store>,
    kiosk: &State<Kiosk>,
) -> Result<()> {
    store.delete_candidate(candidate_id).await?;
    info!("Deleted candidate {candidate_id}");
    refresh(kiosk).await;
    Ok(())
}

/// Zero the urn. Destructive, so the caller must pass `confirm=true`.
#[delete("/admin/votes?<confirm>")]
async fn delete_votes(
    _token: AuthToken,
    confirm: Option<bool>,
    store: &State<Store>,
    kiosk: &State<Kiosk>,
) -> Result<Json<u64>> {
    if confirm != Some(true) {
        return Err(Error::Status(
            Status::BadRequest,
            "Deleting every vote requires `confirm=true`".to_string(),
        ));
    }
    let deleted = store.delete_all_votes().await?;
    warn!("Urn zeroed: deleted {deleted} votes");
    refresh(kiosk).await;
    Ok(Json(deleted))
}

/// Fetch candidates and votes together.
async fn load_dump(store: &Store) -> Result<ElectionDump> {
    let (candidates, votes) = try_join(store.list_candidates(), store.list_votes()).await?;
    Ok(ElectionDump {
        candidates: candidates.into_iter().map(Into::into).collect(),
        votes: votes.into_iter().map(Into::into).collect(),
    })
}

/// Reload the booth's candidate list after a change. The change itself has
/// already succeeded, so a failed reload only affects the booth.
async fn refresh(kiosk: &Kiosk) {
    if let Err(e) = kiosk.reload().await {
        error!("Booth reload after admin change failed: {e}");
    }
}
