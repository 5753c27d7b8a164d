use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::info;
use uuid::Uuid;
use yatra_core::repository::{BoxError, RateLimiter, SessionStore};
use yatra_core::DriverSession;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

/// INCR and the window's TTL in one MULTI. `EXPIRE .. NX` only sets a TTL on a
/// key that has none, so the window stays fixed and a key can never be left
/// counting without one.
fn rate_limit_pipeline(key: &str, window_seconds: i64) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .incr(key, 1)
        .cmd("EXPIRE")
        .arg(key)
        .arg(window_seconds)
        .arg("NX")
        .ignore();
    pipe
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RateLimiter for RedisClient {
    async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> Result<bool, BoxError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = rate_limit_pipeline(key, window_seconds)
            .query_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }
}

#[async_trait]
impl SessionStore for RedisClient {
    async fn create_session(&self, session: &DriverSession, ttl_seconds: u64) -> Result<String, BoxError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let token = Uuid::new_v4().simple().to_string();
        let payload = serde_json::to_string(session)?;
        conn.set_ex::<_, _, ()>(session_key(&token), payload, ttl_seconds).await?;
        info!("Session created for driver {}", session.driver_id);
        Ok(token)
    }

    async fn resolve_session(&self, token: &str) -> Result<Option<DriverSession>, BoxError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(session_key(token)).await?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn revoke_session(&self, token: &str) -> Result<(), BoxError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(session_key(token)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_expiry_is_in_the_transaction() {
        let packed = rate_limit_pipeline("ratelimit:start-ride:10.0.0.7", 3600).get_packed_pipeline();
        let packed = String::from_utf8(packed).unwrap();

        let multi = packed.find("MULTI").unwrap();
        let incr = packed.find("INCR").unwrap();
        let expire = packed.find("EXPIRE").unwrap();
        let exec = packed.find("EXEC").unwrap();
        assert!(multi < incr && incr < expire && expire < exec);
        assert!(packed.contains("NX"));
        assert!(packed.contains("3600"));
    }

    #[test]
    fn test_session_key() {
        assert_eq!(session_key("9f2c"), "session:9f2c");
    }
}
