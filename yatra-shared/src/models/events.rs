use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Topic the lifecycle controller publishes transitions to.
pub const RIDE_STATUS_TOPIC: &str = "ride.status_changed";

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct RideStatusChangedEvent {
    pub booking_id: Uuid,
    pub driver_id: Uuid,
    pub from_status: String,
    pub to_status: String,
    pub vehicle_id: Option<Uuid>,
    pub occurred_at: DateTime<Utc>,
}

impl RideStatusChangedEvent {
    pub fn key(&self) -> String {
        self.booking_id.to_string()
    }
}
