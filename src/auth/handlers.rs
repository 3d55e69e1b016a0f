use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, TokenResponse},
        jwt::JwtKeys,
        password::verify_password_blocking,
    },
    error::ApiError,
    state::AppState,
    users::validate,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/users/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(payload) = payload?;
    let email = validate::normalize_email(&validate::required(payload.email, "email")?);
    let password = validate::required(payload.password, "password")?;

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    };

    let ok = verify_password_blocking(password, user.password_hash.clone())
        .await
        .map_err(ApiError::internal)?;
    if !ok {
        warn!(%email, user_id = user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id).map_err(ApiError::internal)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse {
        token,
        token_type: "Bearer",
        expires_in: keys.ttl.whole_seconds(),
        user: user.into(),
    }))
}
