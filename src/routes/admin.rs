use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    routing::{get, post},
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{
        blog::{BlogPostList, CreateBlogPostRequest, UpdateBlogPostRequest},
        templates::{CreateTemplateRequest, TemplateList, UpdateTemplateRequest},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{BlogPost, Template},
    response::ApiResponse,
    routes::params::{BlogListQuery, Pagination},
    services::admin_service,
    state::AppState,
    storage::{Folder, StoredFile},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blog", get(list_blog_posts).post(create_blog_post))
        .route(
            "/blog/{id}",
            get(get_blog_post)
                .put(update_blog_post)
                .delete(delete_blog_post),
        )
        .route("/templates", get(list_templates).post(create_template))
        .route(
            "/templates/{id}",
            axum::routing::put(update_template).delete(delete_template),
        )
        .route("/uploads", post(upload_file))
}

/// Shape of the multipart upload form.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// `images` (default) or `downloads`.
    pub folder: Option<Folder>,
}

#[utoipa::path(
    get,
    path = "/api/admin/blog",
    params(BlogListQuery),
    responses(
        (status = 200, description = "All posts including drafts (admin only)", body = ApiResponse<BlogPostList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_blog_posts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<BlogListQuery>,
) -> AppResult<Json<ApiResponse<BlogPostList>>> {
    let resp = admin_service::list_blog_posts(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/blog/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post for editing (admin only)", body = ApiResponse<BlogPost>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_blog_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BlogPost>>> {
    let resp = admin_service::get_blog_post(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/blog",
    request_body = CreateBlogPostRequest,
    responses(
        (status = 200, description = "Post created", body = ApiResponse<BlogPost>),
        (status = 400, description = "Missing title or content"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Slug already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_blog_post(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBlogPostRequest>,
) -> AppResult<Json<ApiResponse<BlogPost>>> {
    let resp = admin_service::create_blog_post(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/blog/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdateBlogPostRequest,
    responses(
        (status = 200, description = "Post updated", body = ApiResponse<BlogPost>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Slug already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_blog_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBlogPostRequest>,
) -> AppResult<Json<ApiResponse<BlogPost>>> {
    let resp = admin_service::update_blog_post(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/blog/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_blog_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::delete_blog_post(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/templates",
    params(Pagination),
    responses(
        (status = 200, description = "All templates, newest first (admin only)", body = ApiResponse<TemplateList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_templates(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<TemplateList>>> {
    let resp = admin_service::list_templates(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/templates",
    request_body = CreateTemplateRequest,
    responses(
        (status = 200, description = "Template created", body = ApiResponse<Template>),
        (status = 400, description = "Invalid pricing or missing fields"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Title already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_template(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTemplateRequest>,
) -> AppResult<Json<ApiResponse<Template>>> {
    let resp = admin_service::create_template(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/templates/{id}",
    params(("id" = Uuid, Path, description = "Template ID")),
    request_body = UpdateTemplateRequest,
    responses(
        (status = 200, description = "Template updated", body = ApiResponse<Template>),
        (status = 400, description = "Invalid pricing"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Title already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_template(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTemplateRequest>,
) -> AppResult<Json<ApiResponse<Template>>> {
    let resp = admin_service::update_template(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/templates/{id}",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_template(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::delete_template(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/uploads",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored; returns its public URL", body = ApiResponse<StoredFile>),
        (status = 400, description = "Missing file or unknown folder"),
        (status = 403, description = "Forbidden"),
        (status = 413, description = "File too large")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<StoredFile>>> {
    let mut folder = Folder::default();
    let mut file: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                file = Some((file_name, bytes.to_vec()));
            }
            Some("folder") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                folder = Folder::parse(&raw).ok_or_else(|| {
                    AppError::BadRequest("folder must be `images` or `downloads`".into())
                })?;
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| AppError::BadRequest("multipart field `file` is required".into()))?;
    let resp =
        admin_service::upload_file(&state, &user, folder, file_name.as_deref(), &bytes).await?;
    Ok(Json(resp))
}
