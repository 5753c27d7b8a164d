use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use yatra_core::repository::{BoxError, DriverRepository};
use yatra_core::{DriverCredentials, DriverProfile};

pub struct PostgresDriverRepository {
    pool: PgPool,
}

impl PostgresDriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DriverRow {
    id: Uuid,
    full_name: Option<String>,
    email: String,
    agency_id: Option<Uuid>,
    agency_name: Option<String>,
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    id: Uuid,
    full_name: Option<String>,
    email: String,
    password_hash: String,
}

#[async_trait]
impl DriverRepository for PostgresDriverRepository {
    async fn get_driver_profile(&self, id: Uuid) -> Result<Option<DriverProfile>, BoxError> {
        let row = sqlx::query_as::<_, DriverRow>(
            r#"
            SELECT d.id, d.full_name, d.email, d.agency_id, a.agency_name
            FROM drivers d
            LEFT JOIN agencies a ON a.id = d.agency_id
            WHERE d.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| DriverProfile {
            id: r.id,
            full_name: r.full_name,
            email: r.email,
            agency_id: r.agency_id,
            agency_name: r.agency_name,
        }))
    }

    async fn find_driver_credentials(&self, email: &str) -> Result<Option<DriverCredentials>, BoxError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            "SELECT id, full_name, email, password_hash FROM drivers WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| DriverCredentials {
            id: r.id,
            full_name: r.full_name,
            email: r.email,
            password_hash: r.password_hash,
        }))
    }
}
