use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};

use crate::{
    error::AppResult,
    lifecycle::Watchlist,
    models::{CandidateSummary, CreateRequest, Movie, RateRequest, SearchQuery},
    tmdb::MetadataProvider,
};

type Shared<P> = State<Arc<Watchlist<P>>>;

pub fn router<P: MetadataProvider + 'static>(watchlist: Arc<Watchlist<P>>) -> Router {
    Router::new()
        .route("/movies", get(list_movies::<P>).post(create_movie::<P>))
        .route("/movies/{id}", get(get_movie::<P>).delete(delete_movie::<P>))
        .route("/movies/{id}/rating", put(rate_movie::<P>))
        .route("/search", get(search::<P>))
        .with_state(watchlist)
}

pub async fn list_movies<P: MetadataProvider>(
    State(watchlist): Shared<P>,
) -> AppResult<Json<Vec<Movie>>> {
    Ok(Json(watchlist.list_movies().await?))
}

pub async fn get_movie<P: MetadataProvider>(
    State(watchlist): Shared<P>,
    Path(id): Path<i32>,
) -> AppResult<Json<Movie>> {
    Ok(Json(watchlist.get_movie(id).await?))
}

pub async fn delete_movie<P: MetadataProvider>(
    State(watchlist): Shared<P>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    watchlist.delete_movie(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search<P: MetadataProvider>(
    State(watchlist): Shared<P>,
    Query(q): Query<SearchQuery>,
) -> AppResult<Json<Vec<CandidateSummary>>> {
    Ok(Json(watchlist.search_title(&q.title).await?))
}

pub async fn create_movie<P: MetadataProvider>(
    State(watchlist): Shared<P>,
    Json(req): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    let movie = watchlist.create_from_candidate(req.candidate_id).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn rate_movie<P: MetadataProvider>(
    State(watchlist): Shared<P>,
    Path(id): Path<i32>,
    Json(req): Json<RateRequest>,
) -> AppResult<Json<Movie>> {
    Ok(Json(watchlist.rate_movie(id, req).await?))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, header::CONTENT_TYPE},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::lifecycle::tests::{FakeProvider, provider, watchlist};

    async fn app(provider: FakeProvider) -> Router {
        router(Arc::new(watchlist(provider).await))
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                req = req.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            },
            None => Body::empty(),
        };
        let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value =
            if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    #[tokio::test]
    async fn full_flow_over_http() {
        let app = app(provider()).await;

        let (status, hits) = call(&app, Method::GET, "/search?title=Phone%20Booth", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(hits[0]["id"], 1817);

        let (status, created) =
            call(&app, Method::POST, "/movies", Some(json!({ "candidate_id": 1817 }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["year"], 2002);
        assert_eq!(created["rating"], Value::Null);
        let id = created["id"].as_i64().unwrap();

        let (status, _) =
            call(&app, Method::POST, "/movies", Some(json!({ "candidate_id": 19995 }))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, rated) = call(
            &app,
            Method::PUT,
            &format!("/movies/{id}/rating"),
            Some(json!({ "rating": 7.3, "review": "My favourite character was the caller." })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rated["rating"], 7.3);

        let (status, list) = call(&app, Method::GET, "/movies", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list[0]["title"], "Phone Booth");
        assert_eq!(list[0]["ranking"], 1);
        assert_eq!(list[1]["title"], "Avatar");
        assert_eq!(list[1]["ranking"], 2);
    }

    #[tokio::test]
    async fn errors_map_to_status_codes() {
        let app = app(provider()).await;

        let (status, body) =
            call(&app, Method::POST, "/movies", Some(json!({ "candidate_id": 1817 }))).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_i64().unwrap();

        let (status, body) =
            call(&app, Method::POST, "/movies", Some(json!({ "candidate_id": 1817 }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "duplicate_title");

        let (status, body) = call(
            &app,
            Method::PUT,
            &format!("/movies/{id}/rating"),
            Some(json!({ "rating": "8" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation");

        let (status, body) = call(&app, Method::GET, "/movies/404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");

        let (status, body) =
            call(&app, Method::POST, "/movies", Some(json!({ "candidate_id": 1 }))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "provider_unavailable");
    }

    #[tokio::test]
    async fn delete_is_no_content_even_when_missing() {
        let app = app(provider()).await;

        let (_, created) =
            call(&app, Method::POST, "/movies", Some(json!({ "candidate_id": 438631 }))).await;
        let uri = format!("/movies/{}", created["id"]);

        for _ in 0..2 {
            let (status, _) = call(&app, Method::DELETE, &uri, None).await;
            assert_eq!(status, StatusCode::NO_CONTENT);
        }
        let (_, list) = call(&app, Method::GET, "/movies", None).await;
        assert_eq!(list, json!([]));
    }
}
