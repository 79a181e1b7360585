use super::state::ServerState;
use crate::error::ApiError;
use crate::user::Permission;

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;

pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";
const BEARER_PREFIX: &str = "Bearer ";

/// An authenticated caller. Everything in here came from the verified
/// token and the user row it points at, nothing from the request body.
#[derive(Debug)]
pub struct Session {
    pub user_id: i64,
    pub permissions: Vec<Permission>,
}

impl Session {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn require(&self, permission: Permission) -> Result<(), ApiError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(ApiError::auth("Request is not authorized"))
        }
    }
}

fn extract_bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(HEADER_SESSION_TOKEN_KEY)
        .ok_or_else(|| ApiError::auth("Authorization token required"))?;
    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| ApiError::auth("Request is not authorized"))
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;
        let user = ctx.user_manager.authenticate(token)?;
        debug!("Authenticated session for user_id={}", user.id);
        Ok(Session {
            user_id: user.id,
            permissions: user.role.permissions().to_vec(),
        })
    }
}
