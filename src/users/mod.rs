pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod validate;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{auth::middleware::require_owner, state::AppState};

pub fn router(state: AppState) -> Router<AppState> {
    let owned = Router::new()
        .route(
            "/users/:id",
            get(handlers::get_user)
                .put(handlers::edit_user)
                .delete(handlers::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state, require_owner));

    Router::new()
        .route("/users", post(handlers::create_user))
        .route("/users/", post(handlers::create_user))
        .merge(owned)
}
