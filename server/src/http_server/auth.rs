use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{self, header::AUTHORIZATION, StatusCode},
};
use color_eyre::eyre::eyre;

use crate::{state::AdminConfig, AppState};

use super::errors::ServerError;

/// Extractor for requests carrying `Authorization: Bearer <ADMIN_TOKEN>`.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser;

fn bearer_token(parts: &http::request::Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    scheme
        .eq_ignore_ascii_case("bearer")
        .then_some(token.trim())
        .filter(|token| !token.is_empty())
}

/// Compares every byte so the time taken does not depend on where the first mismatch is.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn is_admin(admin: &AdminConfig, presented: Option<&str>) -> bool {
    match (admin.token.as_deref(), presented) {
        (Some(expected), Some(presented)) => {
            constant_time_eq(expected.as_bytes(), presented.as_bytes())
        }
        _ => false,
    }
}

fn unauthorized() -> ServerError {
    ServerError(eyre!("Invalid or missing admin token"), StatusCode::UNAUTHORIZED)
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if is_admin(&state.admin, bearer_token(parts)) {
            Ok(AdminUser)
        } else {
            Err(unauthorized())
        }
    }
}

/// Lets public routes show more to an admin. A wrong token is still rejected.
impl OptionalFromRequestParts<AppState> for AdminUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match bearer_token(parts) {
            None => Ok(None),
            Some(token) if is_admin(&state.admin, Some(token)) => Ok(Some(AdminUser)),
            Some(_) => Err(unauthorized()),
        }
    }
}
