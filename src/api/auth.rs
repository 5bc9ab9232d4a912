use log::{info, warn};
use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    error::{Error, Result},
    model::api::auth::{AdminLogin, AuthToken, AUTH_TOKEN_COOKIE},
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![login, logout]
}

#[post("/admin/login", data = "<credentials>", format = "json")]
pub async fn login(
    credentials: Json<AdminLogin>,
    cookies: &CookieJar<'_>,
    config: &State<Config>,
) -> Result<()> {
    if !config.verify_admin_password(&credentials.password)? {
        warn!("Rejected admin login with incorrect password");
        return Err(Error::Status(
            Status::Unauthorized,
            "Incorrect admin password".to_string(),
        ));
    }

    cookies.add(AuthToken::admin().into_cookie(config));
    info!("Admin logged in");
    Ok(())
}

#[post("/admin/logout")]
pub async fn logout(_token: AuthToken, cookies: &CookieJar<'_>) {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    info!("Admin logged out");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json,
    };

    use crate::kiosk::SystemClock;
    use crate::store::MemoryStore;

    use super::*;

    async fn client() -> Client {
        let store = Arc::new(MemoryStore::default());
        Client::tracked(crate::rocket_for_store(store, Arc::new(SystemClock)))
            .await
            .unwrap()
    }

    async fn try_login(client: &Client, credentials: &AdminLogin) -> Status {
        client
            .post(uri!(login))
            .header(ContentType::JSON)
            .body(serde_json::to_string(credentials).unwrap())
            .dispatch()
            .await
            .status()
    }

    #[rocket::async_test]
    async fn login_sets_cookie() {
        let client = client().await;
        assert_eq!(Status::Ok, try_login(&client, &AdminLogin::example()).await);
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[rocket::async_test]
    async fn wrong_password_is_refused() {
        let client = client().await;
        assert_eq!(
            Status::Unauthorized,
            try_login(&client, &AdminLogin::wrong()).await
        );
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_none());
    }

    #[rocket::async_test]
    async fn logout_requires_and_removes_token() {
        let client = client().await;
        let response = client.post(uri!(logout)).dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());

        try_login(&client, &AdminLogin::example()).await;
        let response = client.post(uri!(logout)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_none());
    }
}
