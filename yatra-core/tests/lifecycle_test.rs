use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;
use yatra_core::memory::{InMemoryRideStore, RecordingEventPublisher, RecordingMailer};
use yatra_core::otp::DEFAULT_OTP_TTL_SECONDS;
use yatra_core::{
    Booking, BookingStatus, DriverSession, OtpIssuer, OtpRecord, RideError, RideLifecycle,
    Vehicle,
};

struct Harness {
    store: Arc<InMemoryRideStore>,
    mailer: Arc<RecordingMailer>,
    events: Arc<RecordingEventPublisher>,
    issuer: Arc<OtpIssuer>,
    lifecycle: RideLifecycle,
    driver: DriverSession,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryRideStore::new());
    let mailer = Arc::new(RecordingMailer::new());
    let events = Arc::new(RecordingEventPublisher::new());
    let issuer = Arc::new(OtpIssuer::new(
        store.clone(),
        mailer.clone(),
        Duration::seconds(DEFAULT_OTP_TTL_SECONDS),
    ));
    let lifecycle = RideLifecycle::new(store.clone(), issuer.clone(), events.clone());
    let driver = DriverSession {
        driver_id: Uuid::new_v4(),
        driver_name: "Ravi".to_string(),
        driver_email: "ravi@cabs.in".to_string(),
    };

    Harness { store, mailer, events, issuer, lifecycle, driver }
}

async fn seed_booking(h: &Harness, status: BookingStatus, vehicle: Option<&Vehicle>) -> Booking {
    let mut booking = Booking::new(Some("Asha".to_string()), Some("a@x.com".to_string()));
    booking.status = status;
    booking.driver_id = Some(h.driver.driver_id);
    if let Some(vehicle) = vehicle {
        h.store.insert_vehicle(vehicle.clone()).await;
        booking.vehicle_id = Some(vehicle.id);
    }
    h.store.insert_booking(booking.clone()).await;
    booking
}

#[tokio::test]
async fn test_approved_ride_starts_and_code_is_single_use() {
    let h = harness();
    let booking = seed_booking(&h, BookingStatus::Approved, None).await;

    let record = h.issuer.issue("a@x.com", "Asha").await.unwrap();
    let result = h
        .lifecycle
        .verify_and_advance(&h.driver, &booking.id.to_string(), &record.otp)
        .await
        .unwrap();

    assert_eq!(result.new_status, BookingStatus::Ongoing);
    assert_eq!(result.message, "Ride Started Successfully!");
    assert_eq!(h.store.booking(booking.id).await.unwrap().status, BookingStatus::Ongoing);
    assert!(h.store.otps_for("a@x.com").await.is_empty());

    let err = h
        .lifecycle
        .verify_and_advance(&h.driver, &booking.id.to_string(), &record.otp)
        .await
        .unwrap_err();
    assert!(matches!(err, RideError::InvalidCredential));
    assert_eq!(h.store.booking(booking.id).await.unwrap().status, BookingStatus::Ongoing);
}

#[tokio::test]
async fn test_ongoing_ride_completes_and_releases_seat() {
    let h = harness();
    let vehicle = Vehicle::new("V1", 2);
    let booking = seed_booking(&h, BookingStatus::Ongoing, Some(&vehicle)).await;

    h.issuer.issue("a@x.com", "Asha").await.unwrap();
    let code = h.mailer.last_code_for("a@x.com").await.unwrap();

    let result = h
        .lifecycle
        .verify_and_advance(&h.driver, &booking.id.to_string(), &code)
        .await
        .unwrap();

    assert_eq!(result.new_status, BookingStatus::Completed);
    assert_eq!(result.message, "Ride Completed Successfully!");
    assert_eq!(h.store.booking(booking.id).await.unwrap().status, BookingStatus::Completed);
    assert_eq!(h.store.vehicle(vehicle.id).await.unwrap().capacity, 3);

    let events = h.events.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].from_status, "ongoing");
    assert_eq!(events[0].to_status, "completed");
    assert_eq!(events[0].driver_id, h.driver.driver_id);
    assert_eq!(events[0].vehicle_id, Some(vehicle.id));
}

#[tokio::test]
async fn test_non_advanceable_states_are_untouched() {
    for status in [BookingStatus::Pending, BookingStatus::Rejected, BookingStatus::Completed] {
        let h = harness();
        let vehicle = Vehicle::new("V1", 2);
        let booking = seed_booking(&h, status, Some(&vehicle)).await;
        let record = h.issuer.issue("a@x.com", "Asha").await.unwrap();

        let err = h
            .lifecycle
            .verify_and_advance(&h.driver, &booking.id.to_string(), &record.otp)
            .await
            .unwrap_err();

        match err {
            RideError::InvalidState(reported) => assert_eq!(reported, status),
            other => panic!("expected InvalidState, got {:?}", other),
        }
        assert_eq!(h.store.booking(booking.id).await.unwrap().status, status);
        assert_eq!(h.store.vehicle(vehicle.id).await.unwrap().capacity, 2);
        // A failed transition leaves the code usable
        assert_eq!(h.store.otps_for("a@x.com").await, vec![record]);
        assert!(h.events.events().await.is_empty());
    }
}

#[tokio::test]
async fn test_reissued_code_replaces_old_one() {
    let h = harness();
    let booking = seed_booking(&h, BookingStatus::Approved, None).await;

    h.store
        .insert_otp(OtpRecord::new("a@x.com", "111111".to_string()))
        .await;
    let fresh = h.issuer.issue("a@x.com", "Asha").await.unwrap();

    if fresh.otp != "111111" {
        let err = h
            .lifecycle
            .verify_and_advance(&h.driver, &booking.id.to_string(), "111111")
            .await
            .unwrap_err();
        assert!(matches!(err, RideError::InvalidCredential));
    }

    let result = h
        .lifecycle
        .verify_and_advance(&h.driver, &booking.id.to_string(), &fresh.otp)
        .await
        .unwrap();
    assert_eq!(result.new_status, BookingStatus::Ongoing);
}

#[tokio::test]
async fn test_unissued_code_rejected() {
    let h = harness();
    let booking = seed_booking(&h, BookingStatus::Approved, None).await;
    h.store
        .insert_otp(OtpRecord::new("a@x.com", "654321".to_string()))
        .await;

    let err = h
        .lifecycle
        .verify_and_advance(&h.driver, &booking.id.to_string(), "123456")
        .await
        .unwrap_err();

    assert!(matches!(err, RideError::InvalidCredential));
    assert_eq!(h.store.booking(booking.id).await.unwrap().status, BookingStatus::Approved);
}

#[tokio::test]
async fn test_expired_code_rejected() {
    let h = harness();
    let booking = seed_booking(&h, BookingStatus::Approved, None).await;
    let mut stale = OtpRecord::new("a@x.com", "123456".to_string());
    stale.created_at = Utc::now() - Duration::seconds(DEFAULT_OTP_TTL_SECONDS + 1);
    h.store.insert_otp(stale).await;

    let err = h
        .lifecycle
        .verify_and_advance(&h.driver, &booking.id.to_string(), "123456")
        .await
        .unwrap_err();

    assert!(matches!(err, RideError::InvalidCredential));
}

#[tokio::test]
async fn test_unknown_or_malformed_booking_not_found() {
    let h = harness();

    let err = h
        .lifecycle
        .verify_and_advance(&h.driver, &Uuid::new_v4().to_string(), "123456")
        .await
        .unwrap_err();
    assert!(matches!(err, RideError::NotFound("Booking")));

    let err = h
        .lifecycle
        .verify_and_advance(&h.driver, "not-a-booking", "123456")
        .await
        .unwrap_err();
    assert!(matches!(err, RideError::NotFound("Booking")));
}

#[tokio::test]
async fn test_booking_without_email_rejected() {
    let h = harness();
    let mut booking = Booking::new(Some("Asha".to_string()), None);
    booking.status = BookingStatus::Approved;
    h.store.insert_booking(booking.clone()).await;

    let err = h
        .lifecycle
        .verify_and_advance(&h.driver, &booking.id.to_string(), "123456")
        .await
        .unwrap_err();

    match err {
        RideError::Validation(message) => {
            assert_eq!(message, "Customer email not found for this booking.")
        }
        other => panic!("expected Validation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_vehicle_does_not_block_completion() {
    let h = harness();
    let mut booking = Booking::new(None, Some("a@x.com".to_string()));
    booking.status = BookingStatus::Ongoing;
    booking.vehicle_id = Some(Uuid::new_v4());
    h.store.insert_booking(booking.clone()).await;
    let record = h.issuer.issue("a@x.com", "Asha").await.unwrap();

    let result = h
        .lifecycle
        .verify_and_advance(&h.driver, &booking.id.to_string(), &record.otp)
        .await
        .unwrap();

    assert_eq!(result.new_status, BookingStatus::Completed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_completion_releases_one_seat() {
    let h = Arc::new(harness());
    let vehicle = Vehicle::new("V1", 2);
    let booking = seed_booking(&h, BookingStatus::Ongoing, Some(&vehicle)).await;
    let record = h.issuer.issue("a@x.com", "Asha").await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let h = h.clone();
        let booking_id = booking.id.to_string();
        let code = record.otp.clone();
        handles.push(tokio::spawn(async move {
            h.lifecycle
                .verify_and_advance(&h.driver, &booking_id, &code)
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(RideError::InvalidCredential) | Err(RideError::InvalidState(_)) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(h.store.vehicle(vehicle.id).await.unwrap().capacity, 3);
    assert_eq!(h.store.booking(booking.id).await.unwrap().status, BookingStatus::Completed);
}
