use rocket::{http::Status, serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    kiosk::{Digit, Key, Kiosk, KioskResponse, Screen},
};

pub fn routes() -> Vec<Route> {
    routes![screen, digit, key, correct, confirm, reload]
}

#[get("/kiosk")]
async fn screen(kiosk: &State<Kiosk>) -> Json<Screen> {
    Json(kiosk.screen().await)
}

#[post("/kiosk/digit/<value>")]
async fn digit(
    value: std::result::Result<Digit, &str>,
    kiosk: &State<Kiosk>,
) -> Result<Json<KioskResponse>> {
    let digit = value.map_err(|bad| {
        Error::Status(Status::BadRequest, format!("Not a keypad digit: {bad:?}"))
    })?;
    Ok(Json(kiosk.append_digit(digit).await))
}

/// Physical keyboard input. Keys with no kiosk meaning are accepted and
/// ignored, so the front end can forward every keypress blindly.
#[post("/kiosk/key/<name>")]
async fn key(name: Option<Key>, kiosk: &State<Kiosk>) -> Json<KioskResponse> {
    let response = match name {
        Some(key) => kiosk.press(key).await,
        None => KioskResponse {
            screen: kiosk.screen().await,
            tone: None,
        },
    };
    Json(response)
}

#[post("/kiosk/correct")]
async fn correct(kiosk: &State<Kiosk>) -> Json<KioskResponse> {
    Json(kiosk.correct().await)
}

#[post("/kiosk/confirm")]
async fn confirm(kiosk: &State<Kiosk>) -> Json<KioskResponse> {
    Json(kiosk.confirm().await)
}

/// Retry loading the candidate list after a failure.
#[post("/kiosk/reload")]
async fn reload(kiosk: &State<Kiosk>) -> Result<Json<Screen>> {
    kiosk.reload().await?;
    Ok(Json(kiosk.screen().await))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use rocket::{
        http::Status,
        local::asynchronous::{Client, LocalResponse},
        serde::json::serde_json,
    };

    use crate::kiosk::{ManualClock, ScreenStatus, SystemClock, Tone};
    use crate::model::db::NewCandidate;
    use crate::store::MemoryStore;

    use super::*;

    async fn client_with(store: Arc<MemoryStore>) -> Client {
        Client::tracked(crate::rocket_for_store(store, Arc::new(SystemClock)))
            .await
            .unwrap()
    }

    async fn client() -> (Client, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_candidates([
            NewCandidate::example1(),
            NewCandidate::example2(),
        ]));
        (client_with(store.clone()).await, store)
    }

    async fn parse(response: LocalResponse<'_>) -> KioskResponse {
        assert_eq!(Status::Ok, response.status());
        let raw = response.into_string().await.unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    fn kiosk(client: &Client) -> &Kiosk {
        client.rocket().state::<Kiosk>().unwrap()
    }

    #[rocket::async_test]
    async fn keypad_votes_for_candidate() {
        let (client, store) = client().await;

        client.post("/kiosk/digit/1").dispatch().await;
        let response = parse(client.post("/kiosk/digit/7").dispatch().await).await;
        assert_eq!(response.screen.status, ScreenStatus::Matched);
        assert_eq!(response.screen.candidate.unwrap().name, "Bruno Lima");

        let response = parse(client.post(uri!(confirm)).dispatch().await).await;
        assert_eq!(response.screen.status, ScreenStatus::Voted);
        assert_eq!(response.tone.unwrap().tone, Tone::Confirm);

        kiosk(&client).settle().await;
        assert_eq!(store.voted_codes(), vec!["17"]);

        let response = client.get(uri!(screen)).dispatch().await;
        let screen: Screen = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(screen.status, ScreenStatus::Pending);
        assert!(screen.number.is_empty());
    }

    #[rocket::async_test]
    async fn keyboard_goes_through_same_guards() {
        let (client, store) = client().await;

        for _ in 0..3 {
            client.post("/kiosk/key/9").dispatch().await;
        }
        let response = parse(client.post("/kiosk/key/Enter").dispatch().await).await;
        assert_eq!(response.screen.number.as_str(), "99");
        assert_eq!(response.screen.status, ScreenStatus::Invalid);
        assert_eq!(response.tone.unwrap().tone, Tone::Reject);

        let response = parse(client.post("/kiosk/key/Backspace").dispatch().await).await;
        assert!(response.screen.number.is_empty());

        let response = parse(client.post("/kiosk/key/Tab").dispatch().await).await;
        assert_eq!(response.tone, None);

        kiosk(&client).settle().await;
        assert_eq!(store.vote_calls(), 0);
    }

    #[rocket::async_test]
    async fn bad_digit_is_rejected() {
        let (client, _) = client().await;
        let response = client.post("/kiosk/digit/x").dispatch().await;
        assert_eq!(Status::BadRequest, response.status());
        let response = client.post("/kiosk/digit/12").dispatch().await;
        assert_eq!(Status::BadRequest, response.status());
    }

    #[rocket::async_test]
    async fn correct_clears_number() {
        let (client, _) = client().await;
        client.post("/kiosk/digit/4").dispatch().await;
        let response = parse(client.post(uri!(correct)).dispatch().await).await;
        assert!(response.screen.number.is_empty());
        assert_eq!(response.tone.unwrap().tone, Tone::Key);
    }

    #[rocket::async_test]
    async fn failed_write_is_reported_to_voter() {
        let (client, store) = client().await;
        store.fail_writes(true);

        client.post("/kiosk/digit/0").dispatch().await;
        client.post("/kiosk/digit/1").dispatch().await;
        client.post(uri!(confirm)).dispatch().await;
        kiosk(&client).settle().await;

        let response = client.get(uri!(screen)).dispatch().await;
        let screen: Screen = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(screen.status, ScreenStatus::Matched);
        assert!(screen.notification.is_some());
    }

    #[rocket::async_test]
    async fn unavailable_until_reload_succeeds() {
        let store = Arc::new(MemoryStore::with_candidates([NewCandidate::example1()]));
        store.fail_reads(true);
        let client = client_with(store.clone()).await;

        let response = client.get(uri!(screen)).dispatch().await;
        let screen: Screen = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(screen.status, ScreenStatus::Unavailable);

        let response = client.post(uri!(reload)).dispatch().await;
        assert_eq!(Status::ServiceUnavailable, response.status());

        store.fail_reads(false);
        let response = client.post(uri!(reload)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let screen: Screen = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(screen.status, ScreenStatus::Pending);
    }

    #[rocket::async_test]
    async fn closed_kiosk_refuses_votes() {
        let store = Arc::new(MemoryStore::with_candidates([NewCandidate::example1()]));
        let clock = Arc::new(ManualClock::at(Utc::now() + Duration::days(2)));
        let client = Client::tracked(crate::rocket_for_store(store.clone(), clock))
            .await
            .unwrap();

        client.post("/kiosk/digit/0").dispatch().await;
        client.post("/kiosk/digit/1").dispatch().await;
        let response = parse(client.post(uri!(confirm)).dispatch().await).await;
        assert_eq!(response.screen.status, ScreenStatus::Closed);
        assert!(response.screen.number.is_empty());
        assert_eq!(response.tone, None);

        kiosk(&client).settle().await;
        assert_eq!(store.vote_calls(), 0);
    }
}
