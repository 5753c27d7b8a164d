use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yatra_api::{app, state::AppState, worker::start_otp_sweeper};
use yatra_core::events::{LogEventPublisher, RideEventPublisher};
use yatra_core::mailer::{LogMailer, Mailer};
use yatra_core::{OtpIssuer, RideLifecycle};
use yatra_store::{
    app_config::Config, BcryptPasswordVerifier, DbClient, EventProducer,
    PostgresBookingRepository, PostgresDriverRepository, PostgresOtpRepository, RedisClient,
    SmtpMailer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yatra_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Yatra API on port {}", config.server.port);

    // Postgres
    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    // Redis backs both sessions and the start-ride limiter
    let redis = Arc::new(
        RedisClient::new(&config.redis.url)
            .await
            .context("Failed to connect to Redis")?,
    );

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp)),
        None => {
            tracing::warn!("No SMTP settings found, OTP codes will only be logged");
            Arc::new(LogMailer)
        }
    };

    let events: Arc<dyn RideEventPublisher> = match &config.kafka {
        Some(kafka) => Arc::new(
            EventProducer::new(&kafka.brokers).context("Failed to create Kafka producer")?,
        ),
        None => {
            tracing::info!("Kafka not configured, ride events go to the log");
            Arc::new(LogEventPublisher)
        }
    };

    let rules = config.business_rules.clone();
    let bookings = Arc::new(PostgresBookingRepository::new(db.pool.clone()));
    let issuer = Arc::new(OtpIssuer::new(
        Arc::new(PostgresOtpRepository::new(db.pool.clone())),
        mailer,
        chrono::Duration::seconds(rules.otp_ttl_seconds),
    ));
    let lifecycle = Arc::new(RideLifecycle::new(bookings.clone(), issuer.clone(), events));

    tokio::spawn(start_otp_sweeper(
        issuer.clone(),
        Duration::from_secs(rules.otp_sweep_interval_seconds.max(1)),
    ));

    let app_state = AppState {
        issuer,
        lifecycle,
        bookings,
        drivers: Arc::new(PostgresDriverRepository::new(db.pool.clone())),
        sessions: redis.clone(),
        passwords: Arc::new(BcryptPasswordVerifier),
        rate_limiter: redis,
        business_rules: rules,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app(app_state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
