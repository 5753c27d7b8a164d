use async_trait::async_trait;
use yatra_shared::models::RideStatusChangedEvent;

use crate::repository::BoxError;

#[async_trait]
pub trait RideEventPublisher: Send + Sync {
    async fn publish_status_changed(&self, event: &RideStatusChangedEvent) -> Result<(), BoxError>;
}

/// Used when no broker is configured.
#[derive(Debug, Clone, Default)]
pub struct LogEventPublisher;

#[async_trait]
impl RideEventPublisher for LogEventPublisher {
    async fn publish_status_changed(&self, event: &RideStatusChangedEvent) -> Result<(), BoxError> {
        tracing::info!(
            "Ride {} moved {} -> {}",
            event.booking_id,
            event.from_status,
            event.to_status
        );
        Ok(())
    }
}
