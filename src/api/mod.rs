use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountService, CatalogService, ContentStore, LogMailer, Mailer, SeaOrmAccountService,
    SeaOrmCatalogService, SmtpMailer,
};

pub mod accounts;
mod error;
pub mod items;
pub mod otp;
mod types;

pub use error::ApiError;
pub use types::*;

pub struct AppState {
    pub config: Config,

    pub accounts: Arc<dyn AccountService>,

    pub catalog: Arc<dyn CatalogService>,

    pub mailer: Arc<dyn Mailer>,

    pub content_store: Arc<ContentStore>,
}

pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let mailer: Arc<dyn Mailer> = if config.mail.enabled {
        Arc::new(SmtpMailer::new(&config.mail)?)
    } else {
        Arc::new(LogMailer)
    };

    create_app_state_with_mailer(config, mailer).await
}

/// State constructor with an injectable mailer, used by tests to
/// substitute a recording fake for the SMTP transport.
pub async fn create_app_state_with_mailer(
    config: Config,
    mailer: Arc<dyn Mailer>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::new(&config.general.database_path).await?;

    let accounts = Arc::new(SeaOrmAccountService::new(
        store.clone(),
        config.security.clone(),
    ));
    let catalog = Arc::new(SeaOrmCatalogService::new(store));
    let content_store = Arc::new(ContentStore::new(&config.general.uploads_path));

    Ok(Arc::new(AppState {
        config,
        accounts,
        catalog,
        mailer,
        content_store,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let uploads_path = state.config.general.uploads_path.clone();
    let cors_origins = state.config.server.cors_allowed_origins.clone();
    let max_upload_bytes = state.config.server.max_upload_bytes;

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/send-otp", post(otp::send_otp))
        .route("/verify-otp", post(otp::verify_otp))
        .route("/Newuser", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/NewItem", post(items::create_item))
        .route("/ItemData/{category}", get(items::query_items))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
        .nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(uploads_path),
        )
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
