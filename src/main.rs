mod config;
mod db;
mod entities;
mod error;
mod lifecycle;
mod models;
mod ranking;
mod routes;
mod store;
mod tmdb;

use std::{sync::Arc, time::Duration};

use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::Config, lifecycle::Watchlist, store::MovieStore, tmdb::TmdbClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,watchlist=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let http = reqwest::Client::builder()
        .user_agent("watchlist/0.1")
        .timeout(Duration::from_secs(config.tmdb_timeout_secs))
        .build()?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    let store = MovieStore::new(db);
    tracing::info!(movies = store.count().await?, "watchlist loaded");

    let tmdb = TmdbClient::new(
        http,
        config.tmdb_access_token.clone(),
        config.tmdb_base_url.clone(),
        config.tmdb_language.clone(),
        config.tmdb_rps,
    );

    let watchlist = Arc::new(Watchlist::new(store, tmdb, config.tmdb_image_base_url.clone()));

    let app = routes::router(watchlist)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
