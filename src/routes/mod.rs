use axum::{Router, routing::post};

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod blog;
pub mod cart;
pub mod doc;
pub mod health;
pub mod params;
pub mod purchases;
pub mod reviews;
pub mod templates;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/templates", templates::router())
        .nest("/reviews", reviews::router())
        .nest("/cart", cart::router())
        .route("/checkout", post(purchases::checkout))
        .nest("/purchases", purchases::router())
        .nest("/blog", blog::router())
        .nest("/admin", admin::router())
}
