use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A vehicle with a shared seat counter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vehicle {
    pub id: Uuid,
    pub vehicle_name: Option<String>,
    pub capacity: i32,
}

impl Vehicle {
    pub fn new(vehicle_name: &str, capacity: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            vehicle_name: Some(vehicle_name.to_string()),
            capacity,
        }
    }
}
