use std::net::SocketAddr;

use anyhow::{Context, bail};

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub tmdb_access_token: String,
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    pub tmdb_language: String,
    pub tmdb_rps: u32,
    pub tmdb_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = get("PORT").unwrap_or_else(|| "3000".to_string()).parse().context("PORT")?;

        let database_url =
            get("DATABASE_URL").unwrap_or_else(|| "sqlite://watchlist.db?mode=rwc".to_string());

        let tmdb_access_token = get("TMDB_ACCESS_TOKEN").unwrap_or_default();
        if tmdb_access_token.trim().is_empty() {
            bail!("TMDB_ACCESS_TOKEN must be set to a TMDB API read access token");
        }
        // Accept tokens pasted with their scheme prefix; reqwest adds "Bearer" itself.
        let tmdb_access_token = tmdb_access_token
            .trim()
            .strip_prefix("Bearer ")
            .unwrap_or(tmdb_access_token.trim())
            .to_string();

        let tmdb_base_url =
            get("TMDB_BASE_URL").unwrap_or_else(|| "https://api.themoviedb.org/3".to_string());
        let tmdb_image_base_url = get("TMDB_IMAGE_BASE_URL")
            .unwrap_or_else(|| "https://image.tmdb.org/t/p/w500".to_string());
        let tmdb_language = get("TMDB_LANGUAGE").unwrap_or_else(|| "en-US".to_string());

        let tmdb_rps: u32 = get("TMDB_RPS").and_then(|s| s.parse().ok()).unwrap_or(4);
        let tmdb_timeout_secs: u64 =
            get("TMDB_TIMEOUT_SECS").and_then(|s| s.parse().ok()).unwrap_or(30);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            tmdb_access_token,
            tmdb_base_url,
            tmdb_image_base_url,
            tmdb_language,
            tmdb_rps,
            tmdb_timeout_secs,
        })
    }
}
