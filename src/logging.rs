use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use log::{debug, error, info, warn};
use rocket::{
    fairing::{Fairing, Info, Kind},
    http::StatusClass,
    request::{FromRequest, Outcome},
    Data, Orbit, Request, Response, Rocket,
};

use crate::config::Config;

/// A unique identifier for a particular request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct RequestId(pub usize);

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RequestId {
    /// Atomically get the next ID, wrapping back to zero on overflow.
    pub fn next() -> RequestId {
        static REQUEST_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);
        RequestId(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for &'r RequestId {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(req.local_cache(RequestId::next))
    }
}

/// When a request arrived, cached per request.
struct Arrival(Instant);

/// Logs every request and response with a request ID and the time taken,
/// and announces where the booth is being served.
#[derive(Debug, Copy, Clone)]
pub struct LoggerFairing;

#[rocket::async_trait]
impl Fairing for LoggerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Logger",
            kind: Kind::Liftoff | Kind::Request | Kind::Response | Kind::Shutdown,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let protocol = if rocket.config().tls_enabled() {
            "https"
        } else {
            "http"
        };
        let ip = &rocket.config().address;
        let port = &rocket.config().port;
        info!("Booth served on {protocol}://{ip}:{port}/kiosk");
        if let Some(config) = rocket.state::<Config>() {
            info!("Accepting votes until {}", config.election_deadline());
        }
    }

    async fn on_request(&self, req: &mut Request<'_>, _data: &mut Data<'_>) {
        let id = req.local_cache(RequestId::next);
        req.local_cache(|| Arrival(Instant::now()));
        let method = req.method();
        let uri = req.uri();
        // Kiosk keypresses are frequent; keep them out of the info log.
        if uri.path().as_str().starts_with("/kiosk") {
            debug!("->req{id} {method} {uri}");
        } else {
            info!("->req{id} {method} {uri}");
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let id = req.local_cache(RequestId::next);
        let elapsed = req.local_cache(|| Arrival(Instant::now())).0.elapsed();
        let code = res.status();
        let route = match req.route() {
            Some(r) => match r.name {
                Some(ref name) => format!("{name} ({})", r.uri),
                None => r.uri.to_string(),
            },
            None => "UNKNOWN ROUTE".to_string(),
        };
        let log_msg = format!("<-rsp{id} {code} {route} in {}ms", elapsed.as_millis());
        match code.class() {
            StatusClass::ServerError => error!("{log_msg}"),
            StatusClass::ClientError => warn!("{log_msg}"),
            _ if req.uri().path().as_str().starts_with("/kiosk") => debug!("{log_msg}"),
            _ => info!("{log_msg}"),
        }
    }

    async fn on_shutdown(&self, _rocket: &Rocket<Orbit>) {
        warn!("Shutdown requested, closing the booth...");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use log4rs_test_utils::test_logging::init_logging_once_for;
    use rocket::{http::Status, local::asynchronous::Client};

    use crate::kiosk::SystemClock;
    use crate::store::MemoryStore;

    use super::*;

    #[get("/request-id")]
    fn request_id(id: &RequestId) -> String {
        id.to_string()
    }

    #[test]
    fn request_ids_increase() {
        let first = RequestId::next();
        let second = RequestId::next();
        assert!(second > first);
    }

    #[rocket::async_test]
    async fn requests_are_logged_and_keep_one_id() {
        init_logging_once_for(["cipa_kiosk"], None, None);

        let rocket = crate::rocket_for_store(Arc::new(MemoryStore::default()), Arc::new(SystemClock))
            .mount("/", routes![request_id])
            .attach(LoggerFairing);
        let client = Client::tracked(rocket).await.unwrap();

        let response = client.get("/request-id").dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let first: usize = response.into_string().await.unwrap().parse().unwrap();
        let response = client.get("/request-id").dispatch().await;
        let second: usize = response.into_string().await.unwrap().parse().unwrap();
        assert!(second > first);

        let response = client.get("/kiosk").dispatch().await;
        assert_eq!(Status::Ok, response.status());
    }
}
