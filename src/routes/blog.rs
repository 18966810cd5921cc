use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::blog::BlogPostList, error::AppResult, models::BlogPost, response::ApiResponse,
    routes::params::Pagination, services::blog_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts))
        .route("/{slug}", get(get_post))
}

#[utoipa::path(
    get,
    path = "/api/blog",
    params(Pagination),
    responses(
        (status = 200, description = "Published posts, newest first", body = ApiResponse<BlogPostList>)
    ),
    tag = "Blog"
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<BlogPostList>>> {
    let resp = blog_service::list_published(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/blog/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Published post", body = ApiResponse<BlogPost>),
        (status = 404, description = "Not Found")
    ),
    tag = "Blog"
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<BlogPost>>> {
    let resp = blog_service::get_published_by_slug(&state, &slug).await?;
    Ok(Json(resp))
}
