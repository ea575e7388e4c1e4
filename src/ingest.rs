use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::debug;

use crate::{db::now_sec, entities::movie, error::ApiResult, tmdb::MovieDetails};

/// Creates or reuses a local movie for a catalog record.
///
/// Dedup is keyed on the TMDB id. A row with the same name and release year
/// but no TMDB id yet is claimed instead of duplicated, back-filling the id
/// and poster columns. Returns the movie and whether a row was created.
pub async fn import_from_tmdb(
    db: &DatabaseConnection,
    details: &MovieDetails,
    poster_url: Option<String>,
) -> ApiResult<(movie::Model, bool)> {
    if let Some(existing) = movie::Entity::find()
        .filter(movie::Column::TmdbId.eq(details.tmdb_id))
        .one(db)
        .await?
    {
        debug!(tmdb_id = details.tmdb_id, movie_id = existing.id, "movie already imported");
        return Ok((existing, false));
    }

    let release_year = details.release_year();

    let fallback = movie::Entity::find()
        .filter(movie::Column::Name.eq(&details.title))
        .filter(movie::Column::TmdbId.is_null());
    let fallback = match release_year {
        Some(year) => fallback.filter(movie::Column::ReleaseYear.eq(year)),
        None => fallback.filter(movie::Column::ReleaseYear.is_null()),
    };

    if let Some(existing) = fallback.one(db).await? {
        debug!(
            tmdb_id = details.tmdb_id,
            movie_id = existing.id,
            "claiming existing movie by name and year"
        );

        let had_poster_path = existing.poster_path.is_some();
        let had_poster_url = existing.poster_url.is_some();

        let mut active: movie::ActiveModel = existing.into();
        active.tmdb_id = Set(Some(details.tmdb_id));
        if !had_poster_path {
            active.poster_path = Set(details.poster_path.clone());
        }
        if !had_poster_url {
            active.poster_url = Set(poster_url);
        }
        let updated = active.update(db).await?;
        return Ok((updated, false));
    }

    let model = movie::ActiveModel {
        name: Set(details.title.clone()),
        director: Set(details.director()),
        release_year: Set(release_year),
        favorite: Set(false),
        created_at: Set(now_sec()),
        tmdb_id: Set(Some(details.tmdb_id)),
        poster_path: Set(details.poster_path.clone()),
        poster_url: Set(poster_url),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    debug!(tmdb_id = details.tmdb_id, movie_id = created.id, "imported movie from catalog");
    Ok((created, true))
}
