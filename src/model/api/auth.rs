use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use log::warn;
use rocket::{
    http::{Cookie, SameSite, Status},
    request::{FromRequest, Outcome},
    time::Duration,
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// The only principal there is: the election officer running the console.
const ADMIN_SUBJECT: &str = "admin";

/// Login form for the admin console.
#[derive(Clone, Deserialize, Serialize)]
pub struct AdminLogin {
    pub password: String,
}

/// An authentication token proving the bearer logged in as admin.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(rename = "sub")]
    subject: String,
}

impl AuthToken {
    /// Create a new admin token.
    pub fn admin() -> Self {
        Self {
            subject: ADMIN_SUBJECT.to_string(),
        }
    }

    /// Is this an admin token?
    pub fn is_admin(&self) -> bool {
        self.subject == ADMIN_SUBJECT
    }

    #[allow(clippy::missing_panics_doc)]
    /// Serialize this token into a cookie.
    pub fn into_cookie(self, config: &Config) -> Cookie<'static> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
        .expect("JWT encoding is infallible with default settings");

        Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(Duration::seconds(config.auth_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish()
    }

    /// Deserialize a token from a cookie.
    pub fn from_cookie(cookie: &Cookie<'_>, config: &Config) -> Result<Self, Error> {
        let token = jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims>| claims.claims.token)?;
        Ok(token)
    }
}

/// Cookie claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    token: AuthToken,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthToken {
    type Error = Error;

    /// Get an [`AuthToken`] from the cookie, rejecting the request if it is
    /// missing, forged, expired, or not an admin token.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        // Unwrap is safe as `Config` is always managed.
        let config = req.guard::<&State<Config>>().await.unwrap();

        let unauthorized = |msg: &str| {
            Outcome::Failure((
                Status::Unauthorized,
                Error::Status(Status::Unauthorized, msg.to_string()),
            ))
        };

        let cookie = match req.cookies().get(AUTH_TOKEN_COOKIE) {
            Some(cookie) => cookie,
            None => return unauthorized("Admin login required"),
        };
        match Self::from_cookie(cookie, config) {
            Ok(token) if token.is_admin() => Outcome::Success(token),
            Ok(_) => unauthorized("Token does not grant admin access"),
            Err(e) => {
                warn!("Rejected admin token: {e}");
                unauthorized("Invalid or expired admin token")
            }
        }
    }
}


#[cfg(test)]
pub use examples::EXAMPLE_PASSWORD;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_survives_cookie_round_trip() {
        let config = Config::example();
        let cookie = AuthToken::admin().into_cookie(&config);
        assert_eq!(cookie.name(), AUTH_TOKEN_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));

        let token = AuthToken::from_cookie(&cookie, &config).unwrap();
        assert!(token.is_admin());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let config = Config::example();
        let cookie = AuthToken::admin().into_cookie(&config);

        let other = Config::example_with_secret("some-other-secret");
        assert!(matches!(
            AuthToken::from_cookie(&cookie, &other),
            Err(Error::Jwt(_))
        ));
    }
}
