use axum::{
    extract::{rejection::PathRejection, Path, Request},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::extractors::AuthUser;
use crate::error::ApiError;

/// Guards `/users/:id` routes: the bearer token must belong to `:id`.
///
/// A missing or invalid token is rejected by `AuthUser` with 401 before this
/// runs; an identity mismatch is 403.
pub async fn require_owner(
    AuthUser(caller): AuthUser,
    path: Result<Path<i32>, PathRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Path(user_id) = path.map_err(|_| ApiError::NotFound("User not found".into()))?;

    if caller != user_id {
        warn!(caller, user_id, "token identity does not match path");
        return Err(ApiError::Forbidden(
            "Token does not grant access to this user".into(),
        ));
    }

    request.extensions_mut().insert(AuthUser(caller));
    Ok(next.run(request).await)
}
