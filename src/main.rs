use std::sync::Arc;
use std::time::Duration;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use chrono::Local;
use dotenvy::dotenv;

mod api;
mod config;
mod docs;
mod engine;
mod error;
mod model;
mod routes;
mod store;

use config::Config;
use engine::processor::ToilService;
use model::holiday::FixedHolidayCalendar;
use store::{LedgerStore, MemoryStore};

use crate::docs::ApiDoc;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HRM TOIL Engine"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("TOIL engine starting...");

    let store: Arc<dyn LedgerStore> = Arc::new(MemoryStore::new());
    let calendar = Arc::new(FixedHolidayCalendar::new(config.holidays.clone()));
    let service = Data::new(ToilService::new(store, calendar, config.policy.clone()));

    // Background expiry sweep, daily by default. The /toil/expire endpoint
    // covers external schedulers; this task keeps a standalone deployment
    // honest on its own.
    let sweep_service = service.clone();
    let sweep_interval = config.sweep_interval_secs;
    actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(Duration::from_secs(sweep_interval));
        loop {
            ticker.tick().await;
            let today = Local::now().date_naive();
            let swept = sweep_service.expire_old_toil(today);
            if swept > 0 {
                info!(swept, "scheduled expiry sweep retired entries");
            }
        }
    });

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(service.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
