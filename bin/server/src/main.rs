mod app;
mod config;
mod db;
mod error;

use amber_relay_ai::HttpPlanBackend;
use amber_relay_engine::{ActionSettings, Orchestrator, StepInterpreter};
use amber_relay_integration::{GoogleSheetsReader, WebhookMailer};
use app::AppState;
use config::ServerConfig;
use db::{AgentRepository, ExecutionRepository};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("failed to run migrations");

    let registry = Arc::new(AgentRepository::new(db_pool.clone()));
    let store = Arc::new(ExecutionRepository::new(db_pool));

    let backend = Arc::new(HttpPlanBackend::new(config.planner.endpoint.clone()));
    let mailer = Arc::new(WebhookMailer::new(config.email.relay_url.clone()));
    let sheets = Arc::new(GoogleSheetsReader::new(config.sheets.api_key.clone()));
    let settings = ActionSettings::new(
        config.sheets.sheet_id.clone(),
        config.email.recipient.clone(),
    )
    .with_sheet_range(config.sheets.range.clone());

    let interpreter = StepInterpreter::new(store.clone(), mailer, sheets, settings);
    let orchestrator = Arc::new(Orchestrator::new(
        registry.clone(),
        store.clone(),
        backend,
        interpreter,
    ));

    let state = Arc::new(AppState {
        registry,
        store,
        orchestrator,
        owner: config.owner_subject.clone().into(),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app::router(state))
        .await
        .expect("server error");
}
