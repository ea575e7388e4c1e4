use std::{collections::HashMap, sync::Arc};

use axum::{extract::FromRequestParts, http::request::Parts};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Process-wide store of opaque bearer tokens issued at login.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    tokens: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn issue(&self, username: &str) -> String {
        let token = Uuid::new_v4().to_string();
        self.tokens.write().await.insert(token.clone(), username.to_string());
        token
    }

    pub async fn revoke(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token).is_some()
    }

    pub async fn username(&self, token: &str) -> Option<String> {
        self.tokens.read().await.get(token).cloned()
    }
}

/// Extracts and validates the bearer token on protected routes.
pub struct AuthUser {
    pub username: String,
    pub token: String,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Auth("missing bearer token".to_string()))?
            .to_string();

        let username = state
            .sessions
            .username(&token)
            .await
            .ok_or_else(|| ApiError::Auth("invalid or expired token".to_string()))?;

        Ok(AuthUser { username, token })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
