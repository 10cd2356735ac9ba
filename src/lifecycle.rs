//! Create (search, then pick), rate, delete and list watchlist entries.

use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    models::{
        CandidateDetail, CandidateSummary, DESCRIPTION_MAX_CHARS, IMG_URL_MAX_CHARS, Movie,
        MoviePatch, NewMovie, REVIEW_MAX_CHARS, RateRequest, TITLE_MAX_CHARS,
    },
    ranking,
    store::MovieStore,
    tmdb::MetadataProvider,
};

pub const MAX_RATING: f64 = 10.0;

pub struct Watchlist<P> {
    store: MovieStore,
    provider: P,
    image_base_url: String,
}

impl<P: MetadataProvider> Watchlist<P> {
    pub fn new(store: MovieStore, provider: P, image_base_url: String) -> Self {
        Self { store, provider, image_base_url }
    }

    /// Every movie with fresh rankings, best first.
    pub async fn list_movies(&self) -> AppResult<Vec<Movie>> {
        let mut movies = ranking::reconcile(&self.store).await?;
        movies.sort_by_key(|m| m.ranking);
        Ok(movies)
    }

    pub async fn get_movie(&self, id: i32) -> AppResult<Movie> {
        self.store.get_by_id(id).await
    }

    /// Deleting an id that is already gone succeeds, so a repeated request is harmless.
    pub async fn delete_movie(&self, id: i32) -> AppResult<()> {
        if self.store.delete(id).await? {
            info!(movie_id = id, "movie deleted");
        } else {
            debug!(movie_id = id, "delete of missing movie ignored");
        }
        Ok(())
    }

    pub async fn search_title(&self, title: &str) -> AppResult<Vec<CandidateSummary>> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("title is required".into()));
        }
        self.provider.search(title).await
    }

    /// Nothing is written unless the provider call and metadata checks succeed.
    pub async fn create_from_candidate(&self, candidate_id: i64) -> AppResult<Movie> {
        let detail = self.provider.fetch_details(candidate_id).await?;
        let new = new_movie_from_detail(detail, &self.image_base_url)?;

        let movie = self.store.insert(new).await?;
        info!(movie_id = movie.id, candidate_id, title = %movie.title, "movie added unrated");
        Ok(movie)
    }

    /// Rankings are not touched here; the next list call recomputes them.
    pub async fn rate_movie(&self, id: i32, req: RateRequest) -> AppResult<Movie> {
        let (rating, review) = validate_rating(req)?;

        let patch = MoviePatch { rating: Some(rating), review: Some(review), ranking: None };
        let movie = self.store.update(id, patch).await?;
        info!(movie_id = id, rating, "movie rated");
        Ok(movie)
    }
}

/// Rating and review must arrive together; the rating is a number out of 10.
pub fn validate_rating(req: RateRequest) -> AppResult<(f64, String)> {
    let rating = req.rating.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let review = req.review.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let (Some(rating), Some(review)) = (rating, review) else {
        return Err(AppError::Validation("rating and review are both required".into()));
    };

    let rating: f64 = rating
        .parse()
        .map_err(|_| AppError::Validation(format!("rating {rating:?} is not a number")))?;
    if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
        return Err(AppError::Validation(format!(
            "rating must be between 0 and {MAX_RATING}, the form asks for a rating out of 10"
        )));
    }
    if review.chars().count() > REVIEW_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "review must be at most {REVIEW_MAX_CHARS} characters"
        )));
    }

    Ok((rating, review.to_string()))
}

/// Leading component of a `YYYY-MM-DD` release date.
pub fn release_year(release_date: Option<&str>) -> AppResult<i32> {
    let raw = release_date.unwrap_or_default();
    raw.split('-')
        .next()
        .map(str::trim)
        .and_then(|y| y.parse().ok())
        .ok_or_else(|| AppError::ProviderResponseInvalid(format!("unusable release date {raw:?}")))
}

pub fn poster_url(image_base_url: &str, poster_path: &str) -> String {
    format!("{}/{}", image_base_url.trim_end_matches('/'), poster_path.trim_start_matches('/'))
}

pub fn new_movie_from_detail(detail: CandidateDetail, image_base_url: &str) -> AppResult<NewMovie> {
    let title = detail.original_title.trim().to_string();
    if title.is_empty() || title.chars().count() > TITLE_MAX_CHARS {
        return Err(AppError::ProviderResponseInvalid(format!(
            "title must be 1 to {TITLE_MAX_CHARS} characters"
        )));
    }

    let year = release_year(detail.release_date.as_deref())?;

    let poster_path = detail
        .poster_path
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::ProviderResponseInvalid(format!("{title:?} has no poster")))?;
    let img_url = poster_url(image_base_url, &poster_path);
    if img_url.chars().count() > IMG_URL_MAX_CHARS {
        return Err(AppError::ProviderResponseInvalid("poster url too long".into()));
    }

    let description =
        detail.overview.unwrap_or_default().chars().take(DESCRIPTION_MAX_CHARS).collect();

    Ok(NewMovie { title, year, description, img_url })
}
