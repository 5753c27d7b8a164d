use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use yatra_core::repository::{BookingRepository, BoxError, CommitOutcome, TransitionCommit};
use yatra_core::{Booking, RideScope, RideView};

const BOOKING_COLUMNS: &str = r#"
    b.id, b.customer_name, b.customer_email, b.mobile, b.from_location, b.pickup_address,
    b.to_location, b.ride_date, b.ride_time, b.request_date, b.status, b.agency_id,
    b.vehicle_id, b.driver_id, b.driver_name, b.fare, b.created_at, b.updated_at
"#;

pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    customer_name: Option<String>,
    customer_email: Option<String>,
    mobile: Option<String>,
    from_location: Option<String>,
    pickup_address: Option<String>,
    to_location: Option<String>,
    ride_date: Option<DateTime<Utc>>,
    ride_time: Option<String>,
    request_date: DateTime<Utc>,
    status: String,
    agency_id: Option<Uuid>,
    vehicle_id: Option<Uuid>,
    driver_id: Option<Uuid>,
    driver_name: Option<String>,
    fare: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = BoxError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            mobile: row.mobile,
            from: row.from_location,
            pickup_address: row.pickup_address,
            to: row.to_location,
            date: row.ride_date,
            time: row.ride_time,
            request_date: row.request_date,
            status: row.status.parse()?,
            agency_id: row.agency_id,
            vehicle_id: row.vehicle_id,
            driver_id: row.driver_id,
            driver_name: row.driver_name,
            fare: row.fare,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RideRow {
    #[sqlx(flatten)]
    booking: BookingRow,
    agency_name: Option<String>,
    vehicle_name: Option<String>,
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, BoxError> {
        let sql = format!("SELECT {} FROM bookings b WHERE b.id = $1", BOOKING_COLUMNS);
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_driver_rides(
        &self,
        driver_id: Uuid,
        scope: RideScope,
    ) -> Result<Vec<RideView>, BoxError> {
        let sql = format!(
            r#"
            SELECT {}, a.agency_name, v.vehicle_name
            FROM bookings b
            LEFT JOIN agencies a ON a.id = b.agency_id
            LEFT JOIN vehicles v ON v.id = b.vehicle_id
            WHERE b.driver_id = $1 AND (b.status = 'completed') = $2
            ORDER BY b.created_at DESC
            "#,
            BOOKING_COLUMNS
        );

        let rows = sqlx::query_as::<_, RideRow>(&sql)
            .bind(driver_id)
            .bind(scope == RideScope::History)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| -> Result<RideView, BoxError> {
                Ok(RideView {
                    booking: Booking::try_from(row.booking)?,
                    agency_name: row.agency_name,
                    vehicle_name: row.vehicle_name,
                })
            })
            .collect()
    }

    async fn commit_transition(&self, commit: &TransitionCommit) -> Result<CommitOutcome, BoxError> {
        let mut tx = self.pool.begin().await?;

        // Guarded on the status the caller read; a concurrent writer leaves 0 rows
        let updated = sqlx::query(
            r#"
            UPDATE bookings SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = $3
            "#,
        )
        .bind(commit.next.as_str())
        .bind(commit.booking_id)
        .bind(commit.expected.as_str())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(CommitOutcome::StatusChanged);
        }

        let vehicle_released = match commit.release_vehicle {
            Some(vehicle_id) => {
                sqlx::query("UPDATE vehicles SET capacity = capacity + 1 WHERE id = $1")
                    .bind(vehicle_id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected()
                    > 0
            }
            None => false,
        };

        let deleted = sqlx::query("DELETE FROM ride_otps WHERE id = $1")
            .bind(commit.otp_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(CommitOutcome::OtpSpent);
        }

        tx.commit().await?;
        Ok(CommitOutcome::Applied { vehicle_released })
    }
}
