use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use log::{error, info};
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::error::Result;
use crate::model::mongodb::ensure_indexes_exist;
use crate::store::{MongoStore, Store};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    election_deadline: DateTime<Utc>,
    #[serde(default = "default_confirm_hold_ms")]
    confirm_hold_ms: u64,
    #[serde(default = "default_deadline_poll_ms")]
    deadline_poll_ms: u64,
    auth_ttl: u32,
    // secrets
    admin_password_hash: String,
    jwt_secret: String,
}

fn default_confirm_hold_ms() -> u64 {
    4000
}

fn default_deadline_poll_ms() -> u64 {
    1000
}

impl Config {
    /// The instant voting closes. Fixed for the lifetime of the process.
    pub fn election_deadline(&self) -> DateTime<Utc> {
        self.election_deadline
    }

    /// How long the "vote recorded" screen stays up after a successful
    /// confirmation before the booth accepts the next voter.
    pub fn confirm_hold(&self) -> StdDuration {
        StdDuration::from_millis(self.confirm_hold_ms)
    }

    /// Period of the background deadline check.
    pub fn deadline_poll(&self) -> StdDuration {
        StdDuration::from_millis(self.deadline_poll_ms.max(1))
    }

    /// Valid lifetime of admin auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Secret key used to sign JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Check a plaintext admin password against the configured argon2 hash.
    pub fn verify_admin_password(&self, password: &str) -> Result<bool> {
        Ok(argon2::verify_encoded(
            &self.admin_password_hash,
            password.as_bytes(),
        )?)
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        // A malformed hash fails verification with an error rather than `false`.
        if let Err(e) = argon2::verify_encoded(&config.admin_password_hash, b"") {
            error!("`admin_password_hash` is not a valid argon2 hash: {e}");
            return Err(rocket);
        }
        info!("Election closes at {}", config.election_deadline);

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secrets
    db_uri: String,
}

/// A fairing that loads the MongoDB config, connects to the database,
/// performs any setup necessary, and places a `Client`, a `Database` and
/// the MongoDB-backed [`Store`] into managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        // Construct the connection.
        let client = match MongoClient::with_uri_str(config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(&get_database_name());

        // Ensure the required indexes exist.
        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to connect to database: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        // Manage the state.
        let store: Store = Arc::new(MongoStore::new(&db));
        rocket = rocket.manage(client).manage(db).manage(store);
        Ok(rocket)
    }
}

/// Get the name of the database to use (production version).
#[cfg(not(test))]
pub(crate) fn get_database_name() -> String {
    "cipa".to_string()
}

/// Get the name of the database to use (test version).
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
pub(crate) fn get_database_name() -> String {
    let random: u32 = rand::random();
    let db = format!("test{random}");
    info!("Using database {db}");
    db
}


#[cfg(test)]
pub(crate) use examples::example_password_hash;
