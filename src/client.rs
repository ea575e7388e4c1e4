//! HTTP client for the review API, holding the bearer token as explicit
//! session state: set on login, cleared on logout.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::{
    entities::movie,
    models::{
        CreateMovieRequest, CreateReviewRequest, ImportRequest, LoginRequest, LoginResponse,
        MovieCandidate, ReviewWithMovie, UpdateReviewRequest,
    },
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("api error ({status}): {message}")]
    Api { status: StatusCode, message: String },
    #[error("not logged in")]
    NotLoggedIn,
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into(), token: None }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn login(&mut self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let resp = self
            .http
            .post(self.url("/login"))
            .json(&LoginRequest { username: username.to_string(), password: password.to_string() })
            .send()
            .await?;

        let out: LoginResponse = decode(resp).await?;
        self.token = Some(out.token.clone());
        Ok(out)
    }

    /// Logs out on the server, then clears the local token even if the
    /// server call failed.
    pub async fn logout(&mut self) -> ClientResult<()> {
        let result = match self.token.as_deref() {
            Some(token) => match self.http.post(self.url("/logout")).bearer_auth(token).send().await
            {
                Ok(resp) => decode::<serde_json::Value>(resp).await.map(|_| ()),
                Err(err) => Err(err.into()),
            },
            None => Ok(()),
        };
        self.token = None;
        result
    }

    pub async fn fetch_movies(&self) -> ClientResult<Vec<movie::Model>> {
        let resp = self.http.get(self.url("/movies")).send().await?;
        decode(resp).await
    }

    pub async fn fetch_movie(&self, id: i32) -> ClientResult<movie::Model> {
        let resp = self.http.get(self.url(&format!("/movies/{id}"))).send().await?;
        decode(resp).await
    }

    pub async fn create_movie(&self, req: &CreateMovieRequest) -> ClientResult<movie::Model> {
        let resp = self
            .http
            .post(self.url("/movies"))
            .bearer_auth(self.bearer()?)
            .json(req)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn search_movies(&self, query: &str) -> ClientResult<Vec<MovieCandidate>> {
        let resp = self
            .http
            .get(self.url("/movies/search"))
            .query(&[("query", query)])
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn create_movie_from_tmdb(&self, tmdb_id: i32) -> ClientResult<movie::Model> {
        let resp = self
            .http
            .post(self.url("/movies/from-tmdb"))
            .json(&ImportRequest { tmdb_id })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn fetch_reviews(&self) -> ClientResult<Vec<ReviewWithMovie>> {
        let resp = self.http.get(self.url("/reviews")).send().await?;
        decode(resp).await
    }

    pub async fn fetch_review(&self, id: i32) -> ClientResult<ReviewWithMovie> {
        let resp = self.http.get(self.url(&format!("/reviews/{id}"))).send().await?;
        decode(resp).await
    }

    pub async fn create_review(&self, req: &CreateReviewRequest) -> ClientResult<ReviewWithMovie> {
        let resp = self
            .http
            .post(self.url("/reviews"))
            .bearer_auth(self.bearer()?)
            .json(req)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn update_review(
        &self,
        id: i32,
        req: &UpdateReviewRequest,
    ) -> ClientResult<ReviewWithMovie> {
        let resp = self
            .http
            .put(self.url(&format!("/reviews/{id}")))
            .bearer_auth(self.bearer()?)
            .json(req)
            .send()
            .await?;
        decode(resp).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn bearer(&self) -> ClientResult<&str> {
        self.token.as_deref().ok_or(ClientError::NotLoggedIn)
    }
}

/// Decodes a 2xx body as JSON; non-2xx bodies become `ClientError::Api`,
/// preferring the server's `{message}` field over raw text.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> ClientResult<T> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(text);

    Err(ClientError::Api { status, message })
}
