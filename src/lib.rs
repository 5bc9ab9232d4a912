#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

#[cfg(test)]
use std::sync::Arc;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, DatabaseFairing};
use crate::kiosk::KioskFairing;
use crate::logging::LoggerFairing;
#[cfg(test)]
use crate::{kiosk::Clock, store::Store};

pub mod api;
pub mod config;
pub mod error;
pub mod kiosk;
pub mod logging;
pub mod model;
pub mod store;

pub use config::Config;

/// Assemble the server. Fairing order matters: the kiosk needs the config
/// and the store in managed state before it can be built.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(KioskFairing::default())
}

/// Configuration for tests: `Rocket.toml` (request limits included) with the
/// election settings replaced.
#[cfg(test)]
fn test_figment() -> rocket::figment::Figment {
    use chrono::{Duration, Utc};

    rocket::Config::figment()
        .merge(("election_deadline", (Utc::now() + Duration::days(1)).to_rfc3339()))
        .merge(("confirm_hold_ms", 50))
        .merge(("deadline_poll_ms", 10))
        .merge(("auth_ttl", 3600))
        .merge(("admin_password_hash", config::example_password_hash()))
        .merge(("jwt_secret", "jwt-test-secret"))
}

/// A server over the given store and clock, without a database.
#[cfg(test)]
pub(crate) fn rocket_for_store(store: Store, clock: Arc<dyn Clock>) -> Rocket<Build> {
    rocket::custom(test_figment())
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .manage(store)
        .attach(KioskFairing::with_clock(clock))
}

/// Connect to the test database server named by `db_uri`.
#[cfg(test)]
pub(crate) async fn db_client() -> mongodb::Client {
    let db_uri: String = rocket::Config::figment()
        .extract_inner("db_uri")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    mongodb::Client::with_uri_str(db_uri).await.unwrap()
}

/// A server over a MongoDB-backed store in the named database.
#[cfg(test)]
pub(crate) async fn rocket_for_db(client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    let db = client.database(db_name);
    model::mongodb::ensure_indexes_exist(&db).await.unwrap();
    let store: Store = Arc::new(store::MongoStore::new(&db));

    rocket::custom(test_figment())
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .manage(client)
        .manage(db)
        .manage(store)
        .attach(KioskFairing::default())
}
