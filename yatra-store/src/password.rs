use async_trait::async_trait;
use yatra_core::repository::{BoxError, PasswordVerifier};

/// Verifies driver passwords stored as bcrypt hashes (`$2a$`/`$2b$`).
#[derive(Clone, Default)]
pub struct BcryptPasswordVerifier;

#[async_trait]
impl PasswordVerifier for BcryptPasswordVerifier {
    async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, BoxError> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();

        // A bcrypt check takes tens of milliseconds of CPU
        let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
            .await??;

        Ok(matched)
    }
}
