pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod driver_repo;
pub mod events;
pub mod mailer;
pub mod otp_repo;
pub mod password;
pub mod redis_repo;

pub use booking_repo::PostgresBookingRepository;
pub use database::DbClient;
pub use driver_repo::PostgresDriverRepository;
pub use events::EventProducer;
pub use mailer::SmtpMailer;
pub use otp_repo::PostgresOtpRepository;
pub use password::BcryptPasswordVerifier;
pub use redis_repo::RedisClient;
