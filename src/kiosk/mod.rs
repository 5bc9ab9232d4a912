//! The voting booth: keypad input, ballot resolution, the election deadline
//! and vote submission.
//!
//! [`Booth`] holds the state and applies every keypress synchronously.
//! [`Kiosk`] wraps it in an async mutex and runs the parts that wait: store
//! calls, the post-vote hold and the deadline poller.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use rocket::{
    fairing::{Fairing, Info, Kind},
    tokio::{
        self,
        sync::Mutex,
        task::JoinHandle,
        time::{self, Instant},
    },
    Build, Orbit, Rocket,
};

use crate::config::Config;
use crate::error::Result;
use crate::store::Store;

mod ballot;
pub use ballot::{BallotNumber, Digit, CODE_LENGTH};

mod booth;
pub use booth::{Booth, Confirmation, Settlement, Submission};

mod deadline;
pub use deadline::{Clock, DeadlineGate, GateState, SystemClock};
#[cfg(test)]
pub use deadline::testing::ManualClock;

mod keys;
pub use keys::Key;

mod resolver;
pub use resolver::{resolve, Resolution};

mod screen;
pub use screen::{KioskResponse, Screen, ScreenStatus};

mod tone;
pub use tone::{Note, Tone, ToneDesc, Waveform};

/// Timing of the booth.
#[derive(Debug, Clone, Copy)]
pub struct KioskSettings {
    pub deadline: DateTime<Utc>,
    /// Minimum time the "voted" screen stays up after a confirmation.
    pub confirm_hold: Duration,
    pub deadline_poll: Duration,
}

impl From<&Config> for KioskSettings {
    fn from(config: &Config) -> Self {
        Self {
            deadline: config.election_deadline(),
            confirm_hold: config.confirm_hold(),
            deadline_poll: config.deadline_poll(),
        }
    }
}

/// The running booth. Cheap to clone; all clones share one booth.
#[derive(Clone)]
pub struct Kiosk {
    booth: Arc<Mutex<Booth>>,
    store: Store,
    clock: Arc<dyn Clock>,
    settings: KioskSettings,
    submission: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Kiosk {
    /// Create the booth and load the candidate list. A failed load does not
    /// fail construction: the booth starts out unavailable until a reload
    /// succeeds.
    pub async fn new(store: Store, clock: Arc<dyn Clock>, settings: KioskSettings) -> Self {
        let kiosk = Self {
            booth: Arc::new(Mutex::new(Booth::new(settings.deadline))),
            store,
            clock,
            settings,
            submission: Default::default(),
        };
        if let Err(e) = kiosk.reload().await {
            error!("Initial candidate load failed: {e}");
        }
        kiosk.poll_deadline().await;
        kiosk
    }

    /// Reload the candidate list from the store, replacing the cached one.
    /// On failure the booth becomes unavailable.
    pub async fn reload(&self) -> Result<()> {
        let result = self.store.list_candidates().await;
        let mut booth = self.booth.lock().await;
        match result {
            Ok(candidates) => {
                debug!("Loaded {} candidates", candidates.len());
                booth.set_candidates(candidates);
                Ok(())
            }
            Err(e) => {
                booth.set_unavailable(e.to_string());
                Err(e)
            }
        }
    }

    /// The current screen.
    pub async fn screen(&self) -> Screen {
        let mut booth = self.booth.lock().await;
        booth.observe_deadline(self.clock.now());
        booth.screen()
    }

    pub async fn append_digit(&self, digit: Digit) -> KioskResponse {
        let mut booth = self.booth.lock().await;
        let tone = booth.append_digit(digit, self.clock.now());
        respond(&booth, tone)
    }

    pub async fn correct(&self) -> KioskResponse {
        let mut booth = self.booth.lock().await;
        let tone = booth.correct(self.clock.now());
        respond(&booth, tone)
    }

    /// Press confirm. A matched number locks the booth and starts the
    /// submission task before this returns.
    pub async fn confirm(&self) -> KioskResponse {
        let mut booth = self.booth.lock().await;
        match booth.confirm(self.clock.now()) {
            Confirmation::Accepted(submission) => {
                info!("Ballot confirmed, submitting attempt {}", submission.attempt);
                let task = tokio::spawn(self.clone().submit(submission, Instant::now()));
                *self.submission.lock().await = Some(task);
                respond(&booth, Some(Tone::Confirm))
            }
            Confirmation::Rejected => {
                debug!("Rejected confirmation of {:?}", booth.number().as_str());
                respond(&booth, Some(Tone::Reject))
            }
            Confirmation::Ignored => respond(&booth, None),
        }
    }

    /// Press a keyboard key; same guards as the keypad.
    pub async fn press(&self, key: Key) -> KioskResponse {
        match key {
            Key::Digit(digit) => self.append_digit(digit).await,
            Key::Confirm => self.confirm().await,
            Key::Correct => self.correct().await,
        }
    }

    /// Check the deadline now.
    pub async fn poll_deadline(&self) -> GateState {
        let mut booth = self.booth.lock().await;
        if booth.observe_deadline(self.clock.now()) {
            warn!("Election deadline {} reached, voting closed", booth.deadline());
        }
        if booth.is_closed() {
            GateState::Closed
        } else {
            GateState::Open
        }
    }

    /// Wait for the latest submission, if any, to settle.
    pub async fn settle(&self) {
        let task = self.submission.lock().await.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!("Vote submission task failed: {e}");
            }
        }
    }

    /// Poll the deadline on a fixed period until voting closes.
    pub fn spawn_deadline_poller(&self) -> JoinHandle<()> {
        let kiosk = self.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval(kiosk.settings.deadline_poll);
            loop {
                ticker.tick().await;
                if kiosk.poll_deadline().await == GateState::Closed {
                    break;
                }
            }
            debug!("Deadline poller stopped");
        })
    }

    /// Write the vote and unlock the booth once the write settles. Success
    /// holds the "voted" screen until `confirm_hold` has passed since
    /// `confirmed_at`; failure unlocks at once so the voter can retry.
    async fn submit(self, submission: Submission, confirmed_at: Instant) {
        let Submission { attempt, code } = submission;
        let settlement = match self.store.create_vote(&code).await {
            Ok(()) => {
                info!("Vote recorded (attempt {attempt})");
                if let Err(e) = self.reload().await {
                    error!("Reload after vote failed: {e}");
                }
                time::sleep_until(confirmed_at + self.settings.confirm_hold).await;
                Settlement::Recorded
            }
            Err(e) => {
                error!("Failed to record vote (attempt {attempt}): {e}");
                Settlement::Failed(format!("Failed to record vote: {e}"))
            }
        };
        self.booth.lock().await.release(attempt, settlement);
    }
}

fn respond(booth: &Booth, tone: Option<Tone>) -> KioskResponse {
    KioskResponse {
        screen: booth.screen(),
        tone: tone.map(Into::into),
    }
}

/// A fairing that builds the [`Kiosk`] during ignition, placing it into
/// managed state, and starts the deadline poller at liftoff.
/// Requires [`Config`] and [`Store`] to be managed already, so it must be
/// attached after the fairings responsible for them.
pub struct KioskFairing {
    clock: Arc<dyn Clock>,
}

impl KioskFairing {
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for KioskFairing {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

#[rocket::async_trait]
impl Fairing for KioskFairing {
    fn info(&self) -> Info {
        Info {
            name: "Kiosk",
            kind: Kind::Ignite | Kind::Liftoff,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let settings = match rocket.state::<Config>() {
            Some(config) => KioskSettings::from(config),
            None => {
                error!("Config was not available when building the kiosk");
                return Err(rocket);
            }
        };
        let store = match rocket.state::<Store>() {
            Some(store) => store.clone(),
            None => {
                error!("Store was not available when building the kiosk");
                return Err(rocket);
            }
        };

        info!("Setting up voting booth...");
        let kiosk = Kiosk::new(store, self.clock.clone(), settings).await;
        info!("...voting booth ready!");
        Ok(rocket.manage(kiosk))
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        if let Some(kiosk) = rocket.state::<Kiosk>() {
            kiosk.spawn_deadline_poller();
            debug!("Deadline poller started");
        }
    }
}
