pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod ingest;
pub mod models;
pub mod routes;
pub mod search;
pub mod stars;
pub mod templates;
pub mod tmdb;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{auth::SessionStore, config::Config, tmdb::TmdbClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: DatabaseConnection,
    pub tmdb: Arc<TmdbClient>,
    pub sessions: SessionStore,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/login", post(routes::login))
        .route("/logout", post(routes::logout))
        .route("/movies", get(routes::movies_index).post(routes::movies_create))
        .route("/movies/search", get(routes::movies_search))
        .route("/movies/from-tmdb", post(routes::movies_from_tmdb))
        .route("/movies/{id}", get(routes::movies_show))
        .route("/reviews", get(routes::reviews_index).post(routes::reviews_create))
        .route("/reviews/{id}", get(routes::reviews_show).put(routes::reviews_update))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
