pub mod auth;
pub mod rate_limit;

pub use auth::{driver_auth_middleware, SessionToken};
pub use rate_limit::otp_rate_limit_middleware;
