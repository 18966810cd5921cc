use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        blog::{BlogPostList, CreateBlogPostRequest, UpdateBlogPostRequest},
        templates::{CreateTemplateRequest, TemplateList, UpdateTemplateRequest},
    },
    entity::{
        blog_posts::{
            ActiveModel as PostActive, Column as PostCol, Entity as BlogPosts, Model as PostModel,
        },
        purchase_items::{Column as ItemCol, Entity as PurchaseItems},
        templates::{
            ActiveModel as TemplateActive, Column as TemplateCol, Entity as Templates,
            Model as TemplateModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{BlogPost, Template},
    response::{ApiResponse, Meta},
    routes::params::{BlogListQuery, Pagination},
    services::blog_service::slugify,
    state::AppState,
    storage::{Folder, StoredFile},
};

pub async fn list_blog_posts(
    state: &AppState,
    user: &AuthUser,
    query: BlogListQuery,
) -> AppResult<ApiResponse<BlogPostList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(published) = query.published {
        condition = condition.add(PostCol::Published.eq(published));
    }
    let finder = BlogPosts::find()
        .filter(condition)
        .order_by_desc(PostCol::CreatedAt);

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

pub async fn get_blog_post(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<BlogPost>> {
    ensure_admin(user)?;
    let post = find_post(state, id).await?;
    Ok(ApiResponse::success("Blog post", BlogPost::from(post), None))
}

pub async fn create_blog_post(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBlogPostRequest,
) -> AppResult<ApiResponse<BlogPost>> {
    ensure_admin(user)?;
    let title = required("title", &payload.title)?;
    let content = required("content", &payload.content)?;
    let slug = resolve_slug(payload.slug.as_deref(), &title)?;
    ensure_slug_free(state, &slug, None).await?;

    let post = PostActive {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        slug: Set(slug),
        excerpt: Set(payload.excerpt),
        content: Set(content),
        cover_image_url: Set(payload.cover_image_url),
        published: Set(payload.published),
        author_id: Set(Some(user.user_id)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        Some(user.user_id),
        "blog_post_create",
        "blog_posts",
        serde_json::json!({ "post_id": post.id, "slug": post.slug }),
    )
    .await;

    Ok(ApiResponse::success(
        "Blog post created",
        BlogPost::from(post),
        Some(Meta::empty()),
    ))
}

pub async fn update_blog_post(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBlogPostRequest,
) -> AppResult<ApiResponse<BlogPost>> {
    ensure_admin(user)?;
    let existing = find_post(state, id).await?;
    let old_cover = existing.cover_image_url.clone();
    let mut active: PostActive = existing.into();

    if let Some(title) = payload.title {
        active.title = Set(required("title", &title)?);
    }
    if let Some(slug) = payload.slug {
        let slug = resolve_slug(Some(slug.as_str()), "")?;
        ensure_slug_free(state, &slug, Some(id)).await?;
        active.slug = Set(slug);
    }
    if let Some(excerpt) = payload.excerpt {
        active.excerpt = Set(excerpt);
    }
    if let Some(content) = payload.content {
        active.content = Set(required("content", &content)?);
    }
    let replaced_cover = match payload.cover_image_url {
        Some(cover) => {
            let replaced = old_cover.filter(|old| cover.as_ref() != Some(old));
            active.cover_image_url = Set(cover);
            replaced
        }
        None => None,
    };
    if let Some(published) = payload.published {
        active.published = Set(published);
    }
    active.updated_at = Set(Utc::now().into());

    let post = active.update(&state.orm).await?;
    state.storage.discard(replaced_cover.as_deref()).await;

    audit::record(
        state,
        Some(user.user_id),
        "blog_post_update",
        "blog_posts",
        serde_json::json!({ "post_id": post.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        BlogPost::from(post),
        Some(Meta::empty()),
    ))
}

pub async fn delete_blog_post(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let post = find_post(state, id).await?;
    BlogPosts::delete_by_id(id).exec(&state.orm).await?;
    state.storage.discard(post.cover_image_url.as_deref()).await;

    audit::record(
        state,
        Some(user.user_id),
        "blog_post_delete",
        "blog_posts",
        serde_json::json!({ "post_id": id }),
    )
    .await;

    Ok(ApiResponse::done("Deleted"))
}

pub async fn list_templates(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<TemplateList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();
    let finder = Templates::find().order_by_desc(TemplateCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Template::from)
        .collect();

    Ok(ApiResponse::success(
        "Templates",
        TemplateList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn create_template(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTemplateRequest,
) -> AppResult<ApiResponse<Template>> {
    ensure_admin(user)?;
    let title = required("title", &payload.title)?;
    let category = required("category", &payload.category)?;
    validate_pricing(payload.price, payload.discounted_price)?;
    ensure_title_free(state, &title, None).await?;

    let template = TemplateActive {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        description: Set(payload.description),
        category: Set(category),
        price: Set(payload.price),
        discounted_price: Set(payload.discounted_price),
        product_type: Set(payload.product_type),
        is_bundle: Set(payload.is_bundle),
        is_featured: Set(payload.is_featured),
        image_url: Set(payload.image_url),
        download_url: Set(payload.download_url),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        Some(user.user_id),
        "template_create",
        "templates",
        serde_json::json!({ "template_id": template.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Template created",
        Template::from(template),
        Some(Meta::empty()),
    ))
}

pub async fn update_template(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateTemplateRequest,
) -> AppResult<ApiResponse<Template>> {
    ensure_admin(user)?;
    let existing = find_template(state, id).await?;

    let price = payload.price.unwrap_or(existing.price);
    let discounted_price = payload
        .discounted_price
        .unwrap_or(existing.discounted_price);
    validate_pricing(price, discounted_price)?;

    let mut replaced: Vec<String> = Vec::new();
    if let Some(Some(url)) = &payload.image_url {
        replaced.extend(existing.image_url.clone().filter(|old| old != url));
    } else if let Some(None) = &payload.image_url {
        replaced.extend(existing.image_url.clone());
    }
    if let Some(Some(url)) = &payload.download_url {
        replaced.extend(existing.download_url.clone().filter(|old| old != url));
    } else if let Some(None) = &payload.download_url {
        replaced.extend(existing.download_url.clone());
    }

    let mut active: TemplateActive = existing.into();
    if let Some(title) = payload.title {
        let title = required("title", &title)?;
        ensure_title_free(state, &title, Some(id)).await?;
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(category) = payload.category {
        active.category = Set(required("category", &category)?);
    }
    active.price = Set(price);
    active.discounted_price = Set(discounted_price);
    if let Some(product_type) = payload.product_type {
        active.product_type = Set(product_type);
    }
    if let Some(is_bundle) = payload.is_bundle {
        active.is_bundle = Set(is_bundle);
    }
    if let Some(is_featured) = payload.is_featured {
        active.is_featured = Set(is_featured);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(image_url);
    }
    if let Some(download_url) = payload.download_url {
        active.download_url = Set(download_url);
    }
    active.updated_at = Set(Utc::now().into());

    let template = active.update(&state.orm).await?;
    discard_unpurchased(state, replaced).await;

    audit::record(
        state,
        Some(user.user_id),
        "template_update",
        "templates",
        serde_json::json!({ "template_id": template.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Template::from(template),
        Some(Meta::empty()),
    ))
}

pub async fn delete_template(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let template = find_template(state, id).await?;
    Templates::delete_by_id(id).exec(&state.orm).await?;

    let files = [template.image_url, template.download_url];
    discard_unpurchased(state, files.into_iter().flatten().collect()).await;

    audit::record(
        state,
        Some(user.user_id),
        "template_delete",
        "templates",
        serde_json::json!({ "template_id": id }),
    )
    .await;

    Ok(ApiResponse::done("Deleted"))
}

pub async fn upload_file(
    state: &AppState,
    user: &AuthUser,
    folder: Folder,
    file_name: Option<&str>,
    bytes: &[u8],
) -> AppResult<ApiResponse<StoredFile>> {
    ensure_admin(user)?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("file is empty".into()));
    }

    let stored = state.storage.put(folder, file_name, bytes).await?;

    audit::record(
        state,
        Some(user.user_id),
        "file_upload",
        "storage",
        serde_json::json!({ "path": stored.path, "size": stored.size }),
    )
    .await;

    Ok(ApiResponse::success("Uploaded", stored, Some(Meta::empty())))
}

/// Upper bound on a unit price in cents. Keeps cart totals at the maximum line
/// quantity well inside `i64`.
pub const MAX_PRICE: i64 = 1_000_000_000;

/// List price must lie within `0..=MAX_PRICE`; a discounted price must sit strictly below it.
pub fn validate_pricing(price: i64, discounted_price: Option<i64>) -> AppResult<()> {
    if !(0..=MAX_PRICE).contains(&price) {
        return Err(AppError::BadRequest(format!(
            "price must be between 0 and {MAX_PRICE}"
        )));
    }
    match discounted_price {
        Some(discounted) if discounted < 0 || discounted >= price => Err(AppError::BadRequest(
            "discounted_price must be below price and not negative".into(),
        )),
        _ => Ok(()),
    }
}

/// Purchased downloads stay on disk; buyers keep fetching them from their receipts.
async fn discard_unpurchased(state: &AppState, urls: Vec<String>) {
    if urls.is_empty() {
        return;
    }
    let purchased: Vec<Option<String>> = match PurchaseItems::find()
        .select_only()
        .column(ItemCol::DownloadUrl)
        .filter(ItemCol::DownloadUrl.is_in(urls.clone()))
        .distinct()
        .into_tuple()
        .all(&state.orm)
        .await
    {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(error = %err, "could not check purchased files, keeping them");
            return;
        }
    };

    let orphaned: Vec<&str> = urls
        .iter()
        .filter(|url| !purchased.iter().flatten().any(|kept| kept == *url))
        .map(String::as_str)
        .collect();
    if orphaned.len() < urls.len() {
        tracing::debug!(
            kept = urls.len() - orphaned.len(),
            "keeping files referenced by purchases"
        );
    }
    state.storage.discard(orphaned).await;
}

fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn resolve_slug(explicit: Option<&str>, title: &str) -> AppResult<String> {
    let slug = slugify(explicit.unwrap_or(title));
    if slug.is_empty() {
        return Err(AppError::BadRequest(
            "slug must contain at least one letter or digit".into(),
        ));
    }
    Ok(slug)
}

async fn ensure_slug_free(state: &AppState, slug: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = BlogPosts::find().filter(PostCol::Slug.eq(slug));
    if let Some(id) = except {
        finder = finder.filter(PostCol::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict(format!("slug `{slug}` is already used")));
    }
    Ok(())
}

async fn ensure_title_free(state: &AppState, title: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = Templates::find().filter(TemplateCol::Title.eq(title));
    if let Some(id) = except {
        finder = finder.filter(TemplateCol::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict(format!("template `{title}` already exists")));
    }
    Ok(())
}

async fn find_post(state: &AppState, id: Uuid) -> AppResult<PostModel> {
    BlogPosts::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn find_template(state: &AppState, id: Uuid) -> AppResult<TemplateModel> {
    Templates::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}
