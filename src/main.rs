use actix_web::middleware::{NormalizePath, from_fn};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;

mod api;
mod config;
mod db;
mod docs;
mod error;
mod metrics;
mod model;
mod routes;
mod views;

#[cfg(test)]
mod test_support;

use config::Config;
use db::Database;
use metrics::{Metrics, track_requests};

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

fn init_tracing(config: &Config) -> WorkerGuard {
    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    guard
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env().context("loading configuration")?;
    let _guard = init_tracing(&config);

    info!(version = %config.app_version(), "Server starting...");

    let metrics = if config.metrics_enabled {
        Some(Data::new(
            Metrics::new().context("registering metrics")?,
        ))
    } else {
        None
    };

    let database = Database::new(
        config.db.connection_url()?,
        metrics
            .as_ref()
            .map(|m| m.db_connection_errors_total.clone()),
    );

    // Startup continues without the tables; requests will surface the store error.
    if let Err(e) = database.init_schema().await {
        warn!(error = %e, "Could not initialize database tables");
    }

    let route_table = routes::route_table(config.metrics_enabled);
    routes::validate(&route_table).context("invalid route table")?;

    let server_addr = config.server_addr.clone();
    info!(addr = %server_addr, routes = route_table.len(), "Listening");

    HttpServer::new(move || {
        let app = App::new()
            .app_data(Data::new(database.clone()))
            .app_data(Data::new(config.clone()));
        let app = match &metrics {
            Some(metrics) => app.app_data(metrics.clone()),
            None => app,
        };

        app.wrap(from_fn(track_requests))
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .configure(|cfg| routes::configure(cfg, &route_table))
    })
    .bind(&server_addr)
    .with_context(|| format!("binding {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
