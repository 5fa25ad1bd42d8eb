mod assets;
mod config;
mod error;
mod link_lifecycle;
mod services;
mod store;

use crate::assets::cloudinary::CloudinaryStore;
use crate::assets::{AssetStore, DisabledAssetStore};
use crate::config::Config;
use crate::link_lifecycle::issuer::issue_link;
use crate::link_lifecycle::{FeedbackState, LifecycleSettings};
use crate::store::sqlite::SqliteStore;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use env_logger::Env;
use log::{info, warn};
use std::io;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Provision a feedback link and exit instead of starting the server.
    #[arg(long, num_args = 2, value_names = ["ID", "CUSTOMER_NAME"])]
    create_link: Option<Vec<String>>,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let _ = dotenvy::dotenv();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env();
    let store = Arc::new(SqliteStore::open(&config.database_path).map_err(io::Error::other)?);

    let assets: Arc<dyn AssetStore> = match config.cloudinary.clone() {
        Some(credentials) => Arc::new(
            CloudinaryStore::new(credentials, config.operation_timeout).map_err(io::Error::other)?,
        ),
        None => {
            warn!("Cloudinary credentials missing, submissions with images will fail");
            Arc::new(DisabledAssetStore)
        }
    };

    if config.retain_links {
        warn!("FEEDBACK_RETAIN_LINKS is set: links stay usable after submission");
    }

    let state = web::Data::new(FeedbackState::new(
        store.clone(),
        store,
        assets,
        LifecycleSettings::from(&config),
    ));
    let reporting_api = config.reporting_api;

    if let Some([link_id, customer_name]) = args.create_link.as_deref() {
        let link = issue_link(&state, link_id, customer_name)
            .await
            .map_err(io::Error::other)?;
        info!("Feedback form available at /feedback/{}", link.id);
        return Ok(());
    }

    info!("Server running at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(|cfg| services::configure(cfg, reporting_api))
    })
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
}
