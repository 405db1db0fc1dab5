use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod api;
mod auth;
mod config;
mod dashboard;
mod db;
mod docs;
mod model;
mod models;
mod pages;
mod push;
mod routes;
mod scanner;
mod services;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::push::EventHub;
use crate::scanner::Scanner;
use crate::services::scan::ScanProcessor;
use crate::services::students::StudentDirectory;
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[derive(Parser)]
#[command(name = "library-attendance", about = "Barcode attendance desk for the library")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the desk server (default)
    Serve,
    /// Follow a running desk server from the terminal
    Board {
        #[arg(long, default_value = "http://127.0.0.1:5000")]
        url: String,
    },
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    match Cli::parse().command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Board { url } => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
                )
                .init();
            dashboard::board::run_board(&url).await
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "attendance.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    let students = Arc::new(StudentDirectory::load(&config.student_files));
    info!(count = students.len(), "Student directory ready");

    let hub = EventHub::default();
    let processor = ScanProcessor::new(
        pool.clone(),
        students.clone(),
        hub.clone(),
        config.class_label.clone(),
    );
    let scanner = Data::new(Scanner::new(processor.clone(), config.scanner_device.clone()));

    if config.scanner_autostart {
        scanner.start();
    }

    let server_addr = config.server_addr.clone();
    let students = Data::from(students);
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(hub.clone()))
            .app_data(Data::new(processor.clone()))
            .app_data(scanner.clone())
            .app_data(students.clone())
            .configure(|cfg| routes::configure(cfg, &config_data))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
