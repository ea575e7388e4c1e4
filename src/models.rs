use serde::{Deserialize, Serialize};

use crate::entities::{movie, review};

/// A catalog search result before it is materialized as a local movie.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MovieCandidate {
    pub tmdb_id: i32,
    pub title: String,
    pub release_year: Option<i32>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserInfo,
    pub token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateMovieRequest {
    pub name: String,
    pub director: String,
    pub release_year: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportRequest {
    pub tmdb_id: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub movie_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

/// A review with its movie embedded, the shape review endpoints return.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewWithMovie {
    #[serde(flatten)]
    pub review: review::Model,
    pub movie: movie::Model,
}
