use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(pk_auto(Movie::Id))
                    .col(string_len(Movie::Title, 250))
                    .col(integer(Movie::Year))
                    .col(string_len(Movie::Description, 700))
                    .col(double_null(Movie::Rating))
                    .col(integer_null(Movie::Ranking))
                    .col(string_len_null(Movie::Review, 250))
                    .col(string_len(Movie::ImgUrl, 400))
                    .to_owned(),
            )
            .await?;

        // Title uniqueness is enforced here so racing inserts fail atomically.
        manager
            .create_index(
                Index::create()
                    .name("idx_movie_title_unique")
                    .table(Movie::Table)
                    .col(Movie::Title)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_movie_title_unique").table(Movie::Table).to_owned())
            .await?;
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Title,
    Year,
    Description,
    Rating,
    Ranking,
    Review,
    ImgUrl,
}
