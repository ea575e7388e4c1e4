use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
};
use sea_orm::{
    ActiveModelTrait, EntityTrait, QueryOrder, Set,
};
use serde::Deserialize;

use crate::{
    AppState,
    auth::AuthUser,
    db::now_sec,
    entities::{movie, review},
    error::{ApiError, ApiResult},
    ingest,
    models::{
        CreateMovieRequest, CreateReviewRequest, ImportRequest, LoginRequest, LoginResponse,
        MessageResponse, MovieCandidate, ReviewWithMovie, UpdateReviewRequest, UserInfo,
    },
    templates,
};

pub async fn index(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    let reviews = reviews_with_movies(&state).await?;
    Ok(Html(templates::reviews_page(&reviews)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if req.username != state.config.admin_username || req.password != state.config.admin_password {
        return Err(ApiError::Auth("invalid credentials".to_string()));
    }

    let token = state.sessions.issue(&req.username).await;
    tracing::info!(username = %req.username, "login");

    Ok(Json(LoginResponse {
        message: "login successful".to_string(),
        user: UserInfo { username: req.username },
        token,
    }))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    state.sessions.revoke(&user.token).await;
    tracing::info!(username = %user.username, "logout");
    Ok(Json(MessageResponse { message: "logged out".to_string() }))
}

pub async fn movies_index(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<movie::Model>>> {
    let movies = movie::Entity::find().all(&state.db).await?;
    Ok(Json(movies))
}

pub async fn movies_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<movie::Model>> {
    let movie = movie::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("movie {id} not found")))?;
    Ok(Json(movie))
}

pub async fn movies_create(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(req): Json<CreateMovieRequest>,
) -> ApiResult<(StatusCode, Json<movie::Model>)> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }
    if req.director.trim().is_empty() {
        return Err(ApiError::Validation("director is required".to_string()));
    }
    let today: jiff::civil::Date = jiff::Zoned::now().into();
    let current_year = i32::from(today.year());
    if req.release_year > current_year {
        return Err(ApiError::Validation(format!(
            "release_year must not be after {current_year}"
        )));
    }

    let model = movie::ActiveModel {
        name: Set(req.name.trim().to_string()),
        director: Set(req.director.trim().to_string()),
        release_year: Set(Some(req.release_year)),
        favorite: Set(false),
        created_at: Set(now_sec()),
        ..Default::default()
    };
    let created = model.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    query: String,
}

pub async fn movies_search(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SearchQuery>,
) -> ApiResult<Json<Vec<MovieCandidate>>> {
    let candidates = state.tmdb.search(q.query.trim()).await?;
    Ok(Json(candidates))
}

pub async fn movies_from_tmdb(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ImportRequest>,
) -> ApiResult<(StatusCode, Json<movie::Model>)> {
    let details = state.tmdb.movie_details(req.tmdb_id).await?;
    let poster_url = details.poster_path.as_deref().map(|p| state.tmdb.poster_url(p));

    let (movie, created) = ingest::import_from_tmdb(&state.db, &details, poster_url).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(movie)))
}

pub async fn reviews_index(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ReviewWithMovie>>> {
    let reviews = reviews_with_movies(&state).await?;
    Ok(Json(reviews))
}

pub async fn reviews_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ReviewWithMovie>> {
    let found = review::Entity::find_by_id(id)
        .find_also_related(movie::Entity)
        .one(&state.db)
        .await?;

    match found {
        Some((review, Some(movie))) => Ok(Json(ReviewWithMovie { review, movie })),
        _ => Err(ApiError::NotFound(format!("review {id} not found"))),
    }
}

pub async fn reviews_create(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(req): Json<CreateReviewRequest>,
) -> ApiResult<(StatusCode, Json<ReviewWithMovie>)> {
    let movie = movie::Entity::find_by_id(req.movie_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            ApiError::Validation(format!(
                "movie_id {} does not reference an existing movie",
                req.movie_id
            ))
        })?;
    validate_rating(req.rating)?;

    let model = review::ActiveModel {
        movie_id: Set(movie.id),
        rating: Set(req.rating),
        comment: Set(req.comment),
        created_at: Set(now_sec()),
        ..Default::default()
    };
    let created = model.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(ReviewWithMovie { review: created, movie })))
}

pub async fn reviews_update(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i32>,
    Json(req): Json<UpdateReviewRequest>,
) -> ApiResult<Json<ReviewWithMovie>> {
    let existing = review::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("review {id} not found")))?;

    if let Some(rating) = req.rating {
        validate_rating(rating)?;
    }

    let mut active: review::ActiveModel = existing.into();
    if let Some(rating) = req.rating {
        active.rating = Set(rating);
    }
    if let Some(comment) = req.comment {
        active.comment = Set(Some(comment));
    }
    let updated = active.update(&state.db).await?;

    let movie = movie::Entity::find_by_id(updated.movie_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("movie {} not found", updated.movie_id)))?;

    Ok(Json(ReviewWithMovie { review: updated, movie }))
}

async fn reviews_with_movies(state: &AppState) -> ApiResult<Vec<ReviewWithMovie>> {
    let rows = review::Entity::find()
        .find_also_related(movie::Entity)
        .order_by_desc(review::Column::Id)
        .all(&state.db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(review, movie)| movie.map(|movie| ReviewWithMovie { review, movie }))
        .collect())
}

fn validate_rating(rating: i32) -> ApiResult<()> {
    if !(0..=5).contains(&rating) {
        return Err(ApiError::Validation("rating must be between 0 and 5".to_string()));
    }
    Ok(())
}
