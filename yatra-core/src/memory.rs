//! In-memory adapters for every port. They back the test suites and a
//! database-free local run; each store guards its state with one lock so the
//! atomicity guarantees match the Postgres adapters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;
use yatra_shared::models::RideStatusChangedEvent;

use crate::booking::{Booking, RideScope, RideView};
use crate::driver::{DriverCredentials, DriverProfile, DriverSession};
use crate::events::RideEventPublisher;
use crate::mailer::{Mailer, OtpMessage};
use crate::otp::OtpRecord;
use crate::repository::{
    BookingRepository, BoxError, CommitOutcome, DriverRepository, OtpRepository,
    PasswordVerifier, RateLimiter, SessionStore, TransitionCommit,
};
use crate::vehicle::Vehicle;

#[derive(Default)]
struct RideState {
    bookings: HashMap<Uuid, Booking>,
    vehicles: HashMap<Uuid, Vehicle>,
    otps: Vec<OtpRecord>,
    drivers: HashMap<Uuid, DriverProfile>,
    password_hashes: HashMap<Uuid, String>,
    agencies: HashMap<Uuid, String>,
}

/// Bookings, vehicles, drivers and OTP codes behind a single lock.
#[derive(Default)]
pub struct InMemoryRideStore {
    state: Mutex<RideState>,
}

impl InMemoryRideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_booking(&self, booking: Booking) {
        self.state.lock().await.bookings.insert(booking.id, booking);
    }

    pub async fn insert_vehicle(&self, vehicle: Vehicle) {
        self.state.lock().await.vehicles.insert(vehicle.id, vehicle);
    }

    pub async fn insert_otp(&self, record: OtpRecord) {
        self.state.lock().await.otps.push(record);
    }

    pub async fn insert_agency(&self, id: Uuid, name: &str) {
        self.state.lock().await.agencies.insert(id, name.to_string());
    }

    pub async fn insert_driver(&self, driver: DriverProfile) {
        self.state.lock().await.drivers.insert(driver.id, driver);
    }

    /// Stores the hash login checks against; the driver must be inserted too.
    pub async fn insert_password_hash(&self, driver_id: Uuid, password_hash: &str) {
        self.state
            .lock()
            .await
            .password_hashes
            .insert(driver_id, password_hash.to_string());
    }

    pub async fn booking(&self, id: Uuid) -> Option<Booking> {
        self.state.lock().await.bookings.get(&id).cloned()
    }

    pub async fn vehicle(&self, id: Uuid) -> Option<Vehicle> {
        self.state.lock().await.vehicles.get(&id).cloned()
    }

    pub async fn otps_for(&self, email: &str) -> Vec<OtpRecord> {
        self.state
            .lock()
            .await
            .otps
            .iter()
            .filter(|r| r.email == email)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BookingRepository for InMemoryRideStore {
    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, BoxError> {
        Ok(self.booking(id).await)
    }

    async fn list_driver_rides(
        &self,
        driver_id: Uuid,
        scope: RideScope,
    ) -> Result<Vec<RideView>, BoxError> {
        let state = self.state.lock().await;
        let mut rides: Vec<RideView> = state
            .bookings
            .values()
            .filter(|b| b.driver_id == Some(driver_id) && scope.includes(b.status))
            .map(|b| RideView {
                booking: b.clone(),
                agency_name: b.agency_id.and_then(|id| state.agencies.get(&id).cloned()),
                vehicle_name: b
                    .vehicle_id
                    .and_then(|id| state.vehicles.get(&id))
                    .and_then(|v| v.vehicle_name.clone()),
            })
            .collect();
        rides.sort_by(|a, b| b.booking.created_at.cmp(&a.booking.created_at));
        Ok(rides)
    }

    async fn commit_transition(&self, commit: &TransitionCommit) -> Result<CommitOutcome, BoxError> {
        let mut state = self.state.lock().await;

        let status_matches = state
            .bookings
            .get(&commit.booking_id)
            .is_some_and(|b| b.status == commit.expected);
        if !status_matches {
            return Ok(CommitOutcome::StatusChanged);
        }

        let Some(otp_index) = state.otps.iter().position(|r| r.id == commit.otp_id) else {
            return Ok(CommitOutcome::OtpSpent);
        };

        if let Some(booking) = state.bookings.get_mut(&commit.booking_id) {
            booking.update_status(commit.next);
        }

        let vehicle_released = match commit.release_vehicle {
            Some(vehicle_id) => match state.vehicles.get_mut(&vehicle_id) {
                Some(vehicle) => {
                    vehicle.capacity += 1;
                    true
                }
                None => false,
            },
            None => false,
        };

        state.otps.remove(otp_index);

        Ok(CommitOutcome::Applied { vehicle_released })
    }
}

#[async_trait]
impl OtpRepository for InMemoryRideStore {
    async fn replace_for_email(&self, record: &OtpRecord) -> Result<(), BoxError> {
        let mut state = self.state.lock().await;
        state.otps.retain(|r| r.email != record.email);
        state.otps.push(record.clone());
        Ok(())
    }

    async fn find_valid(
        &self,
        email: &str,
        code: &str,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<OtpRecord>, BoxError> {
        Ok(self
            .state
            .lock()
            .await
            .otps
            .iter()
            .find(|r| r.email == email && r.otp == code && r.issued_after(issued_after))
            .cloned())
    }

    async fn purge_issued_before(&self, cutoff: DateTime<Utc>) -> Result<u64, BoxError> {
        let mut state = self.state.lock().await;
        let before = state.otps.len();
        state.otps.retain(|r| r.issued_after(cutoff));
        Ok((before - state.otps.len()) as u64)
    }
}

#[async_trait]
impl DriverRepository for InMemoryRideStore {
    async fn get_driver_profile(&self, id: Uuid) -> Result<Option<DriverProfile>, BoxError> {
        let state = self.state.lock().await;
        Ok(state.drivers.get(&id).cloned().map(|mut profile| {
            profile.agency_name = profile
                .agency_id
                .and_then(|agency_id| state.agencies.get(&agency_id).cloned());
            profile
        }))
    }

    async fn find_driver_credentials(&self, email: &str) -> Result<Option<DriverCredentials>, BoxError> {
        let state = self.state.lock().await;
        Ok(state
            .drivers
            .values()
            .find(|d| d.email == email)
            .and_then(|d| {
                state.password_hashes.get(&d.id).map(|hash| DriverCredentials {
                    id: d.id,
                    full_name: d.full_name.clone(),
                    email: d.email.clone(),
                    password_hash: hash.clone(),
                })
            }))
    }
}

/// Treats the stored hash as the password itself. Tests only.
#[derive(Default)]
pub struct PlaintextPasswordVerifier;

#[async_trait]
impl PasswordVerifier for PlaintextPasswordVerifier {
    async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, BoxError> {
        Ok(password == password_hash)
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, (DriverSession, Instant)>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self, session: &DriverSession, ttl_seconds: u64) -> Result<String, BoxError> {
        let token = Uuid::new_v4().simple().to_string();
        let expires = Instant::now() + Duration::from_secs(ttl_seconds);
        self.sessions
            .lock()
            .await
            .insert(token.clone(), (session.clone(), expires));
        Ok(token)
    }

    async fn resolve_session(&self, token: &str) -> Result<Option<DriverSession>, BoxError> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(token) {
            Some((session, expires)) if *expires > Instant::now() => Ok(Some(session.clone())),
            Some(_) => {
                sessions.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn revoke_session(&self, token: &str) -> Result<(), BoxError> {
        self.sessions.lock().await.remove(token);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRateLimiter {
    windows: Mutex<HashMap<String, (i64, Instant)>>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> Result<bool, BoxError> {
        let window = Duration::from_secs(window_seconds.max(0) as u64);
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let entry = windows.entry(key.to_string()).or_insert((0, now));
        if now.duration_since(entry.1) >= window {
            *entry = (0, now);
        }
        entry.0 += 1;
        Ok(entry.0 <= limit)
    }
}

/// Captures outgoing OTP mail so tests can read the code back.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OtpMessage>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub async fn sent(&self) -> Vec<OtpMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|m| m.to == email)
            .map(|m| m.code.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_otp(&self, message: &OtpMessage) -> Result<(), BoxError> {
        if self.fail {
            return Err("smtp relay unavailable".into());
        }
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<RideStatusChangedEvent>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<RideStatusChangedEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl RideEventPublisher for RecordingEventPublisher {
    async fn publish_status_changed(&self, event: &RideStatusChangedEvent) -> Result<(), BoxError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}
