use std::{num::NonZeroU32, sync::Arc};

use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::header::ACCEPT;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::{CandidateDetail, CandidateSummary},
};

/// External movie catalog used to look up metadata before a movie is stored.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Raw matches for a title, unfiltered. No matches is an empty list, not an error.
    async fn search(&self, title: &str) -> AppResult<Vec<CandidateSummary>>;

    async fn fetch_details(&self, candidate_id: i64) -> AppResult<CandidateDetail>;
}

pub struct TmdbClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
    language: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(
        client: reqwest::Client,
        access_token: String,
        base_url: String,
        language: String,
        rps: u32,
    ) -> Self {
        let rps = NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Self { client, access_token, base_url, language, limiter }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> AppResult<T> {
        self.limiter.until_ready().await;

        let resp = req
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            let snippet: String = body.chars().take(200).collect();
            return Err(AppError::ProviderUnavailable(format!("HTTP {status}: {snippet}")));
        }

        serde_json::from_str(&body).map_err(|e| AppError::ProviderResponseInvalid(e.to_string()))
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn search(&self, title: &str) -> AppResult<Vec<CandidateSummary>> {
        let req = self.client.get(self.url("/search/movie")).query(&[
            ("query", title),
            ("include_adult", "false"),
            ("language", self.language.as_str()),
            ("page", "1"),
        ]);

        let resp: SearchResponse = self.get_json(req).await?;
        debug!(title = %title, results = resp.results.len(), "tmdb search");
        Ok(resp.results)
    }

    async fn fetch_details(&self, candidate_id: i64) -> AppResult<CandidateDetail> {
        let req = self
            .client
            .get(self.url(&format!("/movie/{candidate_id}")))
            .query(&[("language", self.language.as_str())]);

        let detail: CandidateDetail = self.get_json(req).await?;
        debug!(candidate_id, title = %detail.original_title, "tmdb details");
        Ok(detail)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<CandidateSummary>,
}
