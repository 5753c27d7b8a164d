use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use yatra_core::repository::{BoxError, OtpRepository};
use yatra_core::OtpRecord;

pub struct PostgresOtpRepository {
    pool: PgPool,
}

impl PostgresOtpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OtpRow {
    id: Uuid,
    email: String,
    otp: String,
    created_at: DateTime<Utc>,
}

impl From<OtpRow> for OtpRecord {
    fn from(row: OtpRow) -> Self {
        OtpRecord {
            id: row.id,
            email: row.email,
            otp: row.otp,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl OtpRepository for PostgresOtpRepository {
    async fn replace_for_email(&self, record: &OtpRecord) -> Result<(), BoxError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM ride_otps WHERE email = $1")
            .bind(&record.email)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO ride_otps (id, email, otp, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id)
        .bind(&record.email)
        .bind(&record.otp)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_valid(
        &self,
        email: &str,
        code: &str,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<OtpRecord>, BoxError> {
        let row = sqlx::query_as::<_, OtpRow>(
            r#"
            SELECT id, email, otp, created_at
            FROM ride_otps
            WHERE email = $1 AND otp = $2 AND created_at > $3
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(code)
        .bind(issued_after)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(OtpRecord::from))
    }

    async fn purge_issued_before(&self, cutoff: DateTime<Utc>) -> Result<u64, BoxError> {
        let result = sqlx::query("DELETE FROM ride_otps WHERE created_at <= $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
