use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Movies::Table)
                    .add_column(integer_null(Movies::TmdbId))
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Movies::Table)
                    .add_column(string_null(Movies::PosterPath))
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Movies::Table)
                    .add_column(string_null(Movies::PosterUrl))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_tmdb_id_unique")
                    .table(Movies::Table)
                    .col(Movies::TmdbId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_movies_tmdb_id_unique").table(Movies::Table).to_owned())
            .await?;

        for col in [Movies::PosterUrl, Movies::PosterPath, Movies::TmdbId] {
            manager
                .alter_table(Table::alter().table(Movies::Table).drop_column(col).to_owned())
                .await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    TmdbId,
    PosterPath,
    PosterUrl,
}
