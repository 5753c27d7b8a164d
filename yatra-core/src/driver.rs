use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the driver behind an authenticated session.
///
/// Created by the login surface and resolved from the session store on every
/// driver request; the lifecycle controller receives it explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriverSession {
    pub driver_id: Uuid,
    pub driver_name: String,
    pub driver_email: String,
}

/// Driver record as shown on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverProfile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: String,
    pub agency_id: Option<Uuid>,
    pub agency_name: Option<String>,
}

/// What login needs to check a driver's password and open a session.
#[derive(Debug, Clone)]
pub struct DriverCredentials {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: String,
    pub password_hash: String,
}

impl DriverCredentials {
    pub fn session(&self) -> DriverSession {
        DriverSession {
            driver_id: self.id,
            driver_name: self.full_name.clone().unwrap_or_else(|| "NA".to_string()),
            driver_email: self.email.clone(),
        }
    }
}
