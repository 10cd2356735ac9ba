use serde::{Deserialize, Deserializer, Serialize};

use crate::entities::movie;

pub const TITLE_MAX_CHARS: usize = 250;
pub const DESCRIPTION_MAX_CHARS: usize = 700;
pub const REVIEW_MAX_CHARS: usize = 250;
pub const IMG_URL_MAX_CHARS: usize = 400;

/// A stored watchlist entry. `rating` and `review` stay `None` until the movie is rated;
/// `ranking` is derived by the ranking engine and never set by callers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub year: i32,
    pub description: String,
    pub rating: Option<f64>,
    pub ranking: Option<i32>,
    pub review: Option<String>,
    pub img_url: String,
}

impl From<movie::Model> for Movie {
    fn from(m: movie::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            year: m.year,
            description: m.description,
            rating: m.rating,
            ranking: m.ranking,
            review: m.review,
            img_url: m.img_url,
        }
    }
}

/// Metadata gathered from the provider, ready for first persistence.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub year: i32,
    pub description: String,
    pub img_url: String,
}

/// Mutable fields of a stored movie. `None` leaves the column untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MoviePatch {
    pub rating: Option<f64>,
    pub review: Option<String>,
    pub ranking: Option<i32>,
}

/// One search hit from the metadata provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub id: i64,
    pub original_title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// Full record for a chosen candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateDetail {
    pub original_title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub candidate_id: i64,
}

/// Rate form payload. Both fields arrive as free text and are checked together.
#[derive(Debug, Default, Deserialize)]
pub struct RateRequest {
    #[serde(default, deserialize_with = "text_or_number")]
    pub rating: Option<String>,
    #[serde(default)]
    pub review: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(f64),
}

fn text_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<TextOrNumber>::deserialize(d)?.map(|v| match v {
        TextOrNumber::Text(s) => s,
        TextOrNumber::Number(n) => n.to_string(),
    }))
}
