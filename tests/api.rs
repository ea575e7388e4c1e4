use std::sync::Arc;

use cinelog::{
    AppState, app,
    auth::SessionStore,
    client::{ApiClient, ClientError},
    config::Config,
    db,
    models::{CreateMovieRequest, CreateReviewRequest, UpdateReviewRequest},
    tmdb::TmdbClient,
};
use reqwest::StatusCode;
use sea_orm::ConnectOptions;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

const ADMIN: &str = "admin";
const PASSWORD: &str = "secret";

async fn spawn_app(tmdb_base_url: &str, tmdb_token: &str) -> String {
    let config = Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        database_url: "sqlite::memory:".to_string(),
        tmdb_access_token: tmdb_token.to_string(),
        tmdb_base_url: tmdb_base_url.to_string(),
        tmdb_image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
        tmdb_rps: 50,
        admin_username: ADMIN.to_string(),
        admin_password: PASSWORD.to_string(),
    };

    let mut options = ConnectOptions::new(config.database_url.clone());
    options.max_connections(1).sqlx_logging(false);
    let db = db::connect_and_migrate(options).await.unwrap();

    let tmdb = TmdbClient::new(
        reqwest::Client::new(),
        config.tmdb_access_token.clone(),
        config.tmdb_base_url.clone(),
        config.tmdb_image_base_url.clone(),
        config.tmdb_rps,
    );

    let state = Arc::new(AppState {
        config: Arc::new(config),
        db,
        tmdb: Arc::new(tmdb),
        sessions: SessionStore::new(),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });

    format!("http://{addr}")
}

async fn spawn_app_without_tmdb() -> String {
    spawn_app("http://127.0.0.1:1", "test-token").await
}

async fn logged_in_client(base_url: &str) -> ApiClient {
    let mut client = ApiClient::new(base_url);
    client.login(ADMIN, PASSWORD).await.unwrap();
    client
}

async fn mount_matrix_details(server: &MockServer) {
    let body = serde_json::json!({
        "id": 603,
        "title": "The Matrix",
        "release_date": "1999-03-30",
        "overview": "A hacker learns the truth.",
        "poster_path": "/matrix.jpg",
        "credits": {
            "crew": [
                {"name": "Bill Pope", "job": "Director of Photography"},
                {"name": "Lana Wachowski", "job": "Director"}
            ]
        }
    });

    Mock::given(matchers::method("GET"))
        .and(matchers::path("/movie/603"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_issues_token_and_rejects_bad_password() {
    let base_url = spawn_app_without_tmdb().await;

    let mut client = ApiClient::new(&base_url);
    let err = client.login(ADMIN, "wrong").await.unwrap_err();
    match err {
        ClientError::Api { status, .. } => assert_eq!(status, StatusCode::UNAUTHORIZED),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(client.token(), None);

    let out = client.login(ADMIN, PASSWORD).await.unwrap();
    assert!(!out.token.is_empty());
    assert_eq!(out.user.username, ADMIN);
    assert_eq!(client.token(), Some(out.token.as_str()));
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let base_url = spawn_app_without_tmdb().await;
    let mut client = logged_in_client(&base_url).await;

    let token = client.token().unwrap().to_string();
    client.logout().await.unwrap();
    assert_eq!(client.token(), None);

    // The revoked token no longer opens protected routes.
    let resp = reqwest::Client::new()
        .post(format!("{base_url}/reviews"))
        .bearer_auth(&token)
        .json(&CreateReviewRequest { movie_id: 1, rating: 5, comment: None })
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn movie_crud_round_trip() {
    let base_url = spawn_app_without_tmdb().await;
    let client = logged_in_client(&base_url).await;

    let created = client
        .create_movie(&CreateMovieRequest {
            name: "Alien".to_string(),
            director: "Ridley Scott".to_string(),
            release_year: 1979,
        })
        .await
        .unwrap();
    assert_eq!(created.name, "Alien");
    assert!(!created.favorite);

    let fetched = client.fetch_movie(created.id).await.unwrap();
    assert_eq!(fetched, created);

    let all = client.fetch_movies().await.unwrap();
    assert_eq!(all.len(), 1);

    let err = client.fetch_movie(9999).await.unwrap_err();
    match err {
        ClientError::Api { status, .. } => assert_eq!(status, StatusCode::NOT_FOUND),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn movie_create_requires_auth() {
    let base_url = spawn_app_without_tmdb().await;

    let resp = reqwest::Client::new()
        .post(format!("{base_url}/movies"))
        .json(&CreateMovieRequest {
            name: "Alien".to_string(),
            director: "Ridley Scott".to_string(),
            release_year: 1979,
        })
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn search_proxies_the_catalog() {
    let tmdb = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/search/movie"))
        .and(matchers::query_param("query", "matrix"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "page": 1,
            "results": [{
                "id": 603,
                "title": "The Matrix",
                "release_date": "1999-03-30",
                "overview": "A hacker learns the truth.",
                "poster_path": "/matrix.jpg"
            }],
            "total_pages": 1,
            "total_results": 1
        })))
        .mount(&tmdb)
        .await;

    let base_url = spawn_app(&tmdb.uri(), "test-token").await;
    let client = ApiClient::new(&base_url);

    let candidates = client.search_movies("matrix").await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].tmdb_id, 603);
    assert_eq!(candidates[0].release_year, Some(1999));
}

#[tokio::test]
async fn search_without_credential_is_a_server_error() {
    let base_url = spawn_app("http://127.0.0.1:1", "").await;
    let client = ApiClient::new(&base_url);

    let err = client.search_movies("matrix").await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert!(message.contains("TMDB_ACCESS_TOKEN"));
        },
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn import_from_tmdb_creates_then_reuses() {
    let tmdb = MockServer::start().await;
    mount_matrix_details(&tmdb).await;

    let base_url = spawn_app(&tmdb.uri(), "test-token").await;
    let http = reqwest::Client::new();

    let first = http
        .post(format!("{base_url}/movies/from-tmdb"))
        .json(&serde_json::json!({ "tmdb_id": 603 }))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    let first: serde_json::Value = first.json().await.unwrap();
    assert_eq!(first["name"], "The Matrix");
    assert_eq!(first["director"], "Lana Wachowski");
    assert_eq!(first["release_year"], 1999);
    assert_eq!(first["poster_url"], "https://image.tmdb.org/t/p/w500/matrix.jpg");

    let second = http
        .post(format!("{base_url}/movies/from-tmdb"))
        .json(&serde_json::json!({ "tmdb_id": 603 }))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let second: serde_json::Value = second.json().await.unwrap();
    assert_eq!(second["id"], first["id"]);
}

#[tokio::test]
async fn import_backfills_tmdb_id_on_manual_movie() {
    let tmdb = MockServer::start().await;
    mount_matrix_details(&tmdb).await;

    let base_url = spawn_app(&tmdb.uri(), "test-token").await;
    let client = logged_in_client(&base_url).await;

    let manual = client
        .create_movie(&CreateMovieRequest {
            name: "The Matrix".to_string(),
            director: "Lana Wachowski".to_string(),
            release_year: 1999,
        })
        .await
        .unwrap();
    assert_eq!(manual.tmdb_id, None);

    let imported = client.create_movie_from_tmdb(603).await.unwrap();
    assert_eq!(imported.id, manual.id);
    assert_eq!(imported.tmdb_id, Some(603));
}

#[tokio::test]
async fn review_create_embeds_movie_and_validates() {
    let base_url = spawn_app_without_tmdb().await;
    let client = logged_in_client(&base_url).await;

    let movie = client
        .create_movie(&CreateMovieRequest {
            name: "Alien".to_string(),
            director: "Ridley Scott".to_string(),
            release_year: 1979,
        })
        .await
        .unwrap();

    let review = client
        .create_review(&CreateReviewRequest {
            movie_id: movie.id,
            rating: 5,
            comment: Some("great".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(review.review.rating, 5);
    assert_eq!(review.review.comment.as_deref(), Some("great"));
    assert_eq!(review.movie.id, movie.id);

    // Rating out of range, both directions.
    for rating in [6, -1] {
        let err = client
            .create_review(&CreateReviewRequest { movie_id: movie.id, rating, comment: None })
            .await
            .unwrap_err();
        match err {
            ClientError::Api { status, .. } => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    // Unknown movie reference.
    let err = client
        .create_review(&CreateReviewRequest { movie_id: 9999, rating: 3, comment: None })
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert!(message.contains("movie_id"));
        },
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn reviews_list_is_newest_first_with_movies() {
    let base_url = spawn_app_without_tmdb().await;
    let client = logged_in_client(&base_url).await;

    let movie = client
        .create_movie(&CreateMovieRequest {
            name: "Alien".to_string(),
            director: "Ridley Scott".to_string(),
            release_year: 1979,
        })
        .await
        .unwrap();

    for rating in [2, 4] {
        client
            .create_review(&CreateReviewRequest { movie_id: movie.id, rating, comment: None })
            .await
            .unwrap();
    }

    let reviews = client.fetch_reviews().await.unwrap();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0].review.rating, 4);
    assert_eq!(reviews[1].review.rating, 2);
    assert!(reviews.iter().all(|r| r.movie.id == movie.id));
}

#[tokio::test]
async fn review_update_is_partial() {
    let base_url = spawn_app_without_tmdb().await;
    let client = logged_in_client(&base_url).await;

    let movie = client
        .create_movie(&CreateMovieRequest {
            name: "Alien".to_string(),
            director: "Ridley Scott".to_string(),
            release_year: 1979,
        })
        .await
        .unwrap();
    let review = client
        .create_review(&CreateReviewRequest {
            movie_id: movie.id,
            rating: 3,
            comment: Some("fine".to_string()),
        })
        .await
        .unwrap();

    let updated = client
        .update_review(
            review.review.id,
            &UpdateReviewRequest { rating: Some(5), comment: None },
        )
        .await
        .unwrap();
    assert_eq!(updated.review.rating, 5);
    assert_eq!(updated.review.comment.as_deref(), Some("fine"));
    assert_eq!(updated.movie.id, movie.id);

    let err = client
        .update_review(review.review.id, &UpdateReviewRequest { rating: Some(6), comment: None })
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, .. } => assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY),
        other => panic!("unexpected error: {other}"),
    }

    let err = client
        .update_review(9999, &UpdateReviewRequest::default())
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, .. } => assert_eq!(status, StatusCode::NOT_FOUND),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn index_page_renders_reviews() {
    let base_url = spawn_app_without_tmdb().await;
    let client = logged_in_client(&base_url).await;

    let movie = client
        .create_movie(&CreateMovieRequest {
            name: "Alien".to_string(),
            director: "Ridley Scott".to_string(),
            release_year: 1979,
        })
        .await
        .unwrap();
    client
        .create_review(&CreateReviewRequest {
            movie_id: movie.id,
            rating: 4,
            comment: Some("still holds up".to_string()),
        })
        .await
        .unwrap();

    let html = reqwest::get(&base_url).await.unwrap().text().await.unwrap();
    assert!(html.contains("Alien"));
    assert!(html.contains("still holds up"));
}
