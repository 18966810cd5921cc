use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        reviews::{CreateReviewRequest, ReviewList},
        templates::{CategoryList, TemplateList},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Review, Template},
    response::ApiResponse,
    routes::params::{Pagination, TemplateQuery},
    services::{review_service, template_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_templates))
        .route("/categories", get(list_categories))
        .route("/{id}", get(get_template))
        .route("/{id}/reviews", get(list_reviews).post(upsert_review))
}

#[utoipa::path(
    get,
    path = "/api/templates",
    params(TemplateQuery),
    responses(
        (status = 200, description = "Filtered and sorted catalog", body = ApiResponse<TemplateList>),
        (status = 400, description = "min_price above max_price")
    ),
    tag = "Templates"
)]
pub async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> AppResult<Json<ApiResponse<TemplateList>>> {
    let resp = template_service::list_templates(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/templates/categories",
    responses(
        (status = 200, description = "Distinct categories in first-seen order", body = ApiResponse<CategoryList>)
    ),
    tag = "Templates"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = template_service::list_categories(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/templates/{id}",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template detail", body = ApiResponse<Template>),
        (status = 404, description = "Not Found")
    ),
    tag = "Templates"
)]
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Template>>> {
    let resp = template_service::get_template(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/templates/{id}/reviews",
    params(
        ("id" = Uuid, Path, description = "Template ID"),
        Pagination
    ),
    responses(
        (status = 200, description = "Reviews with average rating", body = ApiResponse<ReviewList>),
        (status = 404, description = "Not Found")
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let resp = review_service::list_reviews(&state, id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/templates/{id}/reviews",
    params(("id" = Uuid, Path, description = "Template ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 200, description = "Review created or replaced", body = ApiResponse<Review>),
        (status = 400, description = "Rating out of range"),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn upsert_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::upsert_review(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
