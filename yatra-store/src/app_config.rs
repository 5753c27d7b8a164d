use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub kafka: Option<KafkaConfig>,
    pub smtp: Option<SmtpConfig>,
    #[serde(default)]
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BusinessRules {
    #[serde(default = "default_otp_ttl")]
    pub otp_ttl_seconds: i64,
    #[serde(default = "default_otp_requests_per_hour")]
    pub otp_requests_per_hour: i64,
    #[serde(default = "default_sweep_interval")]
    pub otp_sweep_interval_seconds: u64,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
}

fn default_otp_ttl() -> i64 { yatra_core::otp::DEFAULT_OTP_TTL_SECONDS }
fn default_otp_requests_per_hour() -> i64 { 5 }
fn default_sweep_interval() -> u64 { 60 }
fn default_session_ttl() -> u64 { 60 * 60 * 24 }

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            otp_ttl_seconds: default_otp_ttl(),
            otp_requests_per_hour: default_otp_requests_per_hour(),
            otp_sweep_interval_seconds: default_sweep_interval(),
            session_ttl_seconds: default_session_ttl(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

fn default_smtp_port() -> u16 { 587 }
fn default_from_name() -> String { "Sharing Yatra".to_string() }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. YATRA_DATABASE__URL=postgres://...
            .add_source(config::Environment::with_prefix("YATRA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
