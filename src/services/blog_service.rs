use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::{
    dto::blog::BlogPostList,
    entity::blog_posts::{Column, Entity as BlogPosts},
    error::{AppError, AppResult},
    models::BlogPost,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_published(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<BlogPostList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = BlogPosts::find()
        .filter(Column::Published.eq(true))
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(BlogPost::from)
        .collect();

    Ok(ApiResponse::success(
        "Blog posts",
        BlogPostList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Drafts are invisible here.
pub async fn get_published_by_slug(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<BlogPost>> {
    let post = BlogPosts::find()
        .filter(Column::Slug.eq(slug))
        .filter(Column::Published.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Blog post", BlogPost::from(post), None))
}

/// Lowercase ASCII alphanumeric runs joined by single dashes.
pub fn slugify(raw: &str) -> String {
    raw.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
