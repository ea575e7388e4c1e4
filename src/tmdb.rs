use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    models::MovieCandidate,
};

pub struct TmdbClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
    image_base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(
        client: reqwest::Client,
        access_token: String,
        base_url: String,
        image_base_url: String,
        rps: u32,
    ) -> Self {
        if access_token.trim().is_empty() {
            tracing::warn!("no TMDB_ACCESS_TOKEN provided - catalog search will be unavailable");
        }

        let limiter =
            Arc::new(RateLimiter::direct(Quota::per_second(NonZeroU32::new(rps.max(1)).unwrap())));
        Self { client, access_token, base_url, image_base_url, limiter }
    }

    fn ensure_configured(&self) -> ApiResult<()> {
        if self.access_token.trim().is_empty() {
            return Err(ApiError::Misconfigured("TMDB_ACCESS_TOKEN is not set".to_string()));
        }
        Ok(())
    }

    pub async fn search(&self, query: &str) -> ApiResult<Vec<MovieCandidate>> {
        self.ensure_configured()?;
        self.limiter.until_ready().await;

        let url = format!("{}/search/movie", self.base_url.trim_end_matches('/'));
        let resp: SearchResponse = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[("query", query), ("include_adult", "false")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let candidates = resp
            .results
            .into_iter()
            .map(|m| MovieCandidate {
                tmdb_id: m.id,
                title: m.title,
                release_year: parse_release_year(m.release_date.as_deref()),
                release_date: m.release_date,
                overview: m.overview,
                poster_path: m.poster_path,
            })
            .collect();

        Ok(candidates)
    }

    pub async fn movie_details(&self, tmdb_id: i32) -> ApiResult<MovieDetails> {
        self.ensure_configured()?;
        self.limiter.until_ready().await;

        let url = format!("{}/movie/{}", self.base_url.trim_end_matches('/'), tmdb_id);
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[("append_to_response", "credits")])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("movie {tmdb_id} not found in catalog")));
        }

        let details: DetailsResponse = resp.error_for_status()?.json().await?;

        Ok(MovieDetails {
            tmdb_id: details.id,
            title: details.title,
            release_date: details.release_date,
            overview: details.overview,
            poster_path: details.poster_path,
            crew: details
                .credits
                .crew
                .into_iter()
                .map(|c| CrewMember { name: c.name, job: c.job })
                .collect(),
        })
    }

    pub fn poster_url(&self, poster_path: &str) -> String {
        format!(
            "{}/{}",
            self.image_base_url.trim_end_matches('/'),
            poster_path.trim_start_matches('/')
        )
    }
}

#[derive(Clone, Debug)]
pub struct MovieDetails {
    pub tmdb_id: i32,
    pub title: String,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub crew: Vec<CrewMember>,
}

#[derive(Clone, Debug)]
pub struct CrewMember {
    pub name: String,
    pub job: String,
}

impl MovieDetails {
    pub fn release_year(&self) -> Option<i32> {
        parse_release_year(self.release_date.as_deref())
    }

    /// First crew member credited as "Director", empty string when none.
    pub fn director(&self) -> String {
        self.crew
            .iter()
            .find(|c| c.job == "Director")
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }
}

fn parse_release_year(release_date: Option<&str>) -> Option<i32> {
    release_date?.get(..4)?.parse().ok()
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchMovie>,
}

#[derive(Debug, Deserialize)]
struct SearchMovie {
    id: i32,
    title: String,
    release_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    id: i32,
    title: String,
    release_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    #[serde(default)]
    credits: Credits,
}

#[derive(Debug, Default, Deserialize)]
struct Credits {
    #[serde(default)]
    crew: Vec<CrewEntry>,
}

#[derive(Debug, Deserialize)]
struct CrewEntry {
    name: String,
    job: String,
}
