use anyhow::Context;
use axum::Router;
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use tasktrack_rest::{api, app_env, logging, persistence, SharedData};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();

    let env_filter = logging::init_env_filter();
    let otel_exporters = match (
        env::var(app_env::OTEL_SPAN_EXPORT_URL),
        env::var(app_env::OTEL_METRIC_EXPORT_URL),
    ) {
        (Ok(traces_url), Ok(metrics_url)) => {
            Some(logging::init_exporters(&traces_url, &metrics_url))
        }
        _ => None,
    };
    logging::setup_logging_and_tracing(env_filter, otel_exporters);

    let db_url = env::var(app_env::DB_URL).context("DATABASE_URL must be set to start")?;
    let db_pool = PgPoolOptions::new()
        .max_connections(16)
        .connect(&db_url)
        .await
        .context("connecting to PostgreSQL")?;
    sqlx::migrate!()
        .run(&db_pool)
        .await
        .context("running database migrations")?;

    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(db_pool),
    });

    let port: u16 = match env::var(app_env::SERVER_PORT) {
        Ok(raw_port) => raw_port
            .parse()
            .context("SERVER_PORT must be a valid port number")?,
        Err(_) => 8080,
    };

    let router = logging::attach_tracing_http(
        Router::new()
            .merge(api::swagger_main::build_documentation())
            .merge(api::task::task_routes())
            .with_state(shared_data),
    );

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("binding port {port}"))?;
    info!("Starting server on port {port}.");
    axum::serve(listener, router)
        .await
        .context("serving HTTP traffic")?;

    Ok(())
}
