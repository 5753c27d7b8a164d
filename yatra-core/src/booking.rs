use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Booking status in the ride lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Ongoing,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Ongoing => "ongoing",
            BookingStatus::Completed => "completed",
        }
    }

    /// The OTP-gated transition available from this status, if any.
    pub fn next_transition(self) -> Option<RideTransition> {
        match self {
            BookingStatus::Approved => Some(RideTransition::Start),
            BookingStatus::Ongoing => Some(RideTransition::Complete),
            BookingStatus::Pending | BookingStatus::Rejected | BookingStatus::Completed => None,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown booking status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "approved" => Ok(BookingStatus::Approved),
            "rejected" => Ok(BookingStatus::Rejected),
            "ongoing" => Ok(BookingStatus::Ongoing),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// The two edges a driver can drive with a customer OTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideTransition {
    /// approved → ongoing
    Start,
    /// ongoing → completed, releases one seat on the vehicle
    Complete,
}

impl RideTransition {
    pub fn from_status(self) -> BookingStatus {
        match self {
            RideTransition::Start => BookingStatus::Approved,
            RideTransition::Complete => BookingStatus::Ongoing,
        }
    }

    pub fn to_status(self) -> BookingStatus {
        match self {
            RideTransition::Start => BookingStatus::Ongoing,
            RideTransition::Complete => BookingStatus::Completed,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RideTransition::Start => "Ride Started Successfully!",
            RideTransition::Complete => "Ride Completed Successfully!",
        }
    }

    pub fn releases_vehicle(self) -> bool {
        matches!(self, RideTransition::Complete)
    }
}

/// A customer's ride request and its assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub mobile: Option<String>,
    pub from: Option<String>,
    pub pickup_address: Option<String>,
    pub to: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub time: Option<String>,
    pub request_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub agency_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub driver_name: Option<String>,
    pub fare: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(customer_name: Option<String>, customer_email: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_name,
            customer_email,
            mobile: None,
            from: None,
            pickup_address: None,
            to: None,
            date: None,
            time: None,
            request_date: now,
            status: BookingStatus::Pending,
            agency_id: None,
            vehicle_id: None,
            driver_id: None,
            driver_name: None,
            fare: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Customer email, ignoring blank values left by the booking form.
    pub fn contact_email(&self) -> Option<&str> {
        self.customer_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }

    pub fn update_status(&mut self, new_status: BookingStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }
}

/// A booking as listed on the driver's ride pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideView {
    #[serde(flatten)]
    pub booking: Booking,
    pub agency_name: Option<String>,
    pub vehicle_name: Option<String>,
}

/// Which of a driver's rides to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideScope {
    /// Everything not yet completed
    Active,
    /// Completed rides only
    History,
}

impl RideScope {
    pub fn includes(self, status: BookingStatus) -> bool {
        match self {
            RideScope::Active => status != BookingStatus::Completed,
            RideScope::History => status == BookingStatus::Completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_approved_and_ongoing_advance() {
        assert_eq!(BookingStatus::Approved.next_transition(), Some(RideTransition::Start));
        assert_eq!(BookingStatus::Ongoing.next_transition(), Some(RideTransition::Complete));
        assert_eq!(BookingStatus::Pending.next_transition(), None);
        assert_eq!(BookingStatus::Rejected.next_transition(), None);
        assert_eq!(BookingStatus::Completed.next_transition(), None);
    }

    #[test]
    fn test_transition_edges() {
        let start = RideTransition::Start;
        assert_eq!(start.from_status(), BookingStatus::Approved);
        assert_eq!(start.to_status(), BookingStatus::Ongoing);
        assert!(!start.releases_vehicle());

        let complete = RideTransition::Complete;
        assert_eq!(complete.from_status(), BookingStatus::Ongoing);
        assert_eq!(complete.to_status(), BookingStatus::Completed);
        assert_eq!(complete.message(), "Ride Completed Successfully!");
        assert!(complete.releases_vehicle());
    }

    #[test]
    fn test_status_text_round_trip() {
        assert_eq!("ongoing".parse::<BookingStatus>().unwrap(), BookingStatus::Ongoing);
        assert_eq!(BookingStatus::Rejected.to_string(), "rejected");
        // The stray capitalised variant is not part of the vocabulary
        assert!("Confirmed".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_blank_email_is_missing() {
        let booking = Booking::new(Some("Asha".to_string()), Some("   ".to_string()));
        assert_eq!(booking.contact_email(), None);

        let booking = Booking::new(None, Some(" a@x.com ".to_string()));
        assert_eq!(booking.contact_email(), Some("a@x.com"));
    }

    #[test]
    fn test_ride_scope() {
        assert!(RideScope::Active.includes(BookingStatus::Ongoing));
        assert!(!RideScope::Active.includes(BookingStatus::Completed));
        assert!(RideScope::History.includes(BookingStatus::Completed));
    }
}
