use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use yatra_shared::models::RideStatusChangedEvent;

use crate::booking::BookingStatus;
use crate::driver::DriverSession;
use crate::events::RideEventPublisher;
use crate::issuer::OtpIssuer;
use crate::repository::{BookingRepository, CommitOutcome, TransitionCommit};
use crate::{RideError, RideResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub booking_id: Uuid,
    pub new_status: BookingStatus,
    pub message: &'static str,
}

/// Drives bookings through approved → ongoing → completed on a valid customer OTP.
pub struct RideLifecycle {
    bookings: Arc<dyn BookingRepository>,
    issuer: Arc<OtpIssuer>,
    events: Arc<dyn RideEventPublisher>,
}

impl RideLifecycle {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        issuer: Arc<OtpIssuer>,
        events: Arc<dyn RideEventPublisher>,
    ) -> Self {
        Self { bookings, issuer, events }
    }

    pub async fn verify_and_advance(
        &self,
        driver: &DriverSession,
        booking_id: &str,
        code: &str,
    ) -> RideResult<TransitionResult> {
        // 1. Booking lookup; a malformed id cannot match anything
        let booking_id = Uuid::parse_str(booking_id.trim()).map_err(|_| RideError::NotFound("Booking"))?;
        let booking = self
            .bookings
            .get_booking(booking_id)
            .await
            .map_err(RideError::transport)?
            .ok_or(RideError::NotFound("Booking"))?;

        // 2. The OTP is bound to the customer's email
        let email = booking.contact_email().ok_or_else(|| {
            RideError::Validation("Customer email not found for this booking.".to_string())
        })?;

        // 3. Code must be live and belong to that email
        let otp = self
            .issuer
            .consume(email, code)
            .await?
            .ok_or(RideError::InvalidCredential)?;

        // 4. Decide on the status read above
        let current = booking.status;
        let transition = current
            .next_transition()
            .ok_or(RideError::InvalidState(current))?;

        let release_vehicle = if transition.releases_vehicle() {
            booking.vehicle_id
        } else {
            None
        };

        // 5-6. Status, capacity and OTP deletion commit together
        let commit = TransitionCommit {
            booking_id,
            expected: current,
            next: transition.to_status(),
            release_vehicle,
            otp_id: otp.id,
        };

        match self.bookings.commit_transition(&commit).await.map_err(RideError::transport)? {
            CommitOutcome::Applied { vehicle_released } => {
                if let Some(vehicle_id) = release_vehicle {
                    if vehicle_released {
                        info!("Vehicle {} capacity restored", vehicle_id);
                    } else {
                        warn!("Vehicle {} referenced by booking {} not found, capacity unchanged", vehicle_id, booking_id);
                    }
                }
            }
            CommitOutcome::StatusChanged => {
                let status = self
                    .bookings
                    .get_booking(booking_id)
                    .await
                    .map_err(RideError::transport)?
                    .map(|b| b.status)
                    .ok_or(RideError::NotFound("Booking"))?;
                info!("Booking {} moved to {} concurrently, rejecting", booking_id, status);
                return Err(RideError::InvalidState(status));
            }
            CommitOutcome::OtpSpent => return Err(RideError::InvalidCredential),
        }

        info!(
            "Driver {} moved booking {} from {} to {}",
            driver.driver_id,
            booking_id,
            current,
            transition.to_status()
        );

        let event = RideStatusChangedEvent {
            booking_id,
            driver_id: driver.driver_id,
            from_status: current.to_string(),
            to_status: transition.to_status().to_string(),
            vehicle_id: booking.vehicle_id,
            occurred_at: Utc::now(),
        };
        if let Err(e) = self.events.publish_status_changed(&event).await {
            warn!("Failed to publish status change for booking {}: {}", booking_id, e);
        }

        Ok(TransitionResult {
            booking_id,
            new_status: transition.to_status(),
            message: transition.message(),
        })
    }
}
