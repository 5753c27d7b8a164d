use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::{debug, error};
use yatra_core::events::RideEventPublisher;
use yatra_core::repository::BoxError;
use yatra_shared::models::events::{RideStatusChangedEvent, RIDE_STATUS_TOPIC};

/// Kafka publisher for ride status changes, keyed by booking id so every
/// change of one booking lands on the same partition.
#[derive(Clone)]
pub struct EventProducer {
    producer: FutureProducer,
}

impl EventProducer {
    pub fn new(brokers: &str) -> Result<Self, rdkafka::error::KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self { producer })
    }
}

#[async_trait]
impl RideEventPublisher for EventProducer {
    async fn publish_status_changed(&self, event: &RideStatusChangedEvent) -> Result<(), BoxError> {
        let key = event.key();
        let payload = serde_json::to_string(event)?;
        let record = FutureRecord::to(RIDE_STATUS_TOPIC).key(&key).payload(&payload);

        match self.producer.send(record, Timeout::After(Duration::from_secs(0))).await {
            Ok(delivery) => {
                debug!(
                    "Ride {} status event at partition {} offset {}",
                    key, delivery.partition, delivery.offset
                );
                Ok(())
            }
            Err((e, _msg)) => {
                error!("Failed to send ride status event for {}: {}", key, e);
                Err(e.into())
            }
        }
    }
}
