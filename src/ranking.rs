//! Rankings from ratings: highest rating is 1, lowest or unrated is the movie count.

use std::cmp::Ordering;

use tracing::debug;

use sea_orm::DbErr;

use crate::{
    error::{AppError, AppResult},
    models::Movie,
    store::MovieStore,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RankAssignment {
    pub id: i32,
    pub ranking: i32,
}

fn ascending(a: &Movie, b: &Movie) -> Ordering {
    let by_rating = match (a.rating, b.rating) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.total_cmp(&y),
    };
    by_rating.then(a.id.cmp(&b.id))
}

/// Largest ranking handed out for `len` movies; rankings live in an `i32` column.
pub fn ranking_span(len: usize) -> AppResult<i32> {
    i32::try_from(len).map_err(|_| {
        AppError::Database(DbErr::Custom(format!("{len} movies exceed the ranking column range")))
    })
}

/// Computes the ranking for every movie without touching storage. Position `i` in
/// ascending rating order gets `count - i`.
pub fn rank(movies: &[Movie]) -> AppResult<Vec<RankAssignment>> {
    let count = ranking_span(movies.len())?;

    let mut ordered: Vec<&Movie> = movies.iter().collect();
    ordered.sort_by(|a, b| ascending(a, b));

    Ok(ordered
        .into_iter()
        .zip((1..=count).rev())
        .map(|(movie, ranking)| RankAssignment { id: movie.id, ranking })
        .collect())
}

/// Applies `assignments` to `movies` in place and returns the ones whose ranking changed.
pub fn apply(movies: &mut [Movie], assignments: &[RankAssignment]) -> Vec<RankAssignment> {
    let mut changed = Vec::new();
    for a in assignments {
        let Some(movie) = movies.iter_mut().find(|m| m.id == a.id) else {
            continue;
        };
        if movie.ranking != Some(a.ranking) {
            movie.ranking = Some(a.ranking);
            changed.push(*a);
        }
    }
    changed
}

/// Recomputes rankings for the whole collection and writes back any that moved.
/// Running it twice in a row writes nothing the second time.
pub async fn reconcile(store: &MovieStore) -> AppResult<Vec<Movie>> {
    let mut movies = store.list_all().await?;
    let assignments = rank(&movies)?;
    let changed = apply(&mut movies, &assignments);

    store.write_rankings(&changed).await?;
    debug!(count = movies.len(), changed = changed.len(), "rankings reconciled");

    Ok(movies)
}
