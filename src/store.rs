use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, Set, TransactionTrait, sea_query::Expr,
};

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::{Movie, MoviePatch, NewMovie},
    ranking::RankAssignment,
};

/// Owns the persisted movie collection. Every mutation runs in its own transaction, which
/// rolls back when dropped on an early return.
#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts an unrated movie. Title uniqueness is checked by the database index, so two
    /// racing inserts of one title leave exactly one row.
    pub async fn insert(&self, new: NewMovie) -> AppResult<Movie> {
        let title = new.title.clone();
        let txn = self.db.begin().await?;

        let model = movie::ActiveModel {
            id: NotSet,
            title: Set(new.title),
            year: Set(new.year),
            description: Set(new.description),
            rating: Set(None),
            ranking: Set(None),
            review: Set(None),
            img_url: Set(new.img_url),
        };
        let inserted = model.insert(&txn).await.map_err(|e| AppError::from_insert(e, &title))?;

        txn.commit().await?;
        Ok(inserted.into())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Movie> {
        movie::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Movie::from)
            .ok_or(AppError::NotFound { id })
    }

    /// All stored movies, in no particular order.
    pub async fn list_all(&self) -> AppResult<Vec<Movie>> {
        let rows = movie::Entity::find().all(&self.db).await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(movie::Entity::find().count(&self.db).await?)
    }

    /// The write must come before any read in the transaction; a SQLite read-to-write upgrade
    /// fails with SQLITE_BUSY instead of waiting.
    pub async fn update(&self, id: i32, patch: MoviePatch) -> AppResult<Movie> {
        if patch == MoviePatch::default() {
            return self.get_by_id(id).await;
        }

        let mut query = movie::Entity::update_many().filter(movie::Column::Id.eq(id));
        if let Some(rating) = patch.rating {
            query = query.col_expr(movie::Column::Rating, Expr::value(rating));
        }
        if let Some(review) = patch.review {
            query = query.col_expr(movie::Column::Review, Expr::value(review));
        }
        if let Some(ranking) = patch.ranking {
            query = query.col_expr(movie::Column::Ranking, Expr::value(ranking));
        }

        let txn = self.db.begin().await?;
        if query.exec(&txn).await?.rows_affected == 0 {
            return Err(AppError::NotFound { id });
        }
        let updated = movie::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound { id })?;
        txn.commit().await?;

        Ok(updated.into())
    }

    /// Returns whether a row was removed. A missing id is not an error.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let txn = self.db.begin().await?;
        let res = movie::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(res.rows_affected > 0)
    }

    pub async fn write_rankings(&self, assignments: &[RankAssignment]) -> AppResult<()> {
        if assignments.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await?;
        for a in assignments {
            movie::Entity::update_many()
                .col_expr(movie::Column::Ranking, Expr::value(a.ranking))
                .filter(movie::Column::Id.eq(a.id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;

        Ok(())
    }
}
