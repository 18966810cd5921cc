use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use crate::{
    audit,
    dto::reviews::{CreateReviewRequest, ReviewList},
    entity::{
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews},
        templates::Entity as Templates,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Review,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub const MAX_COMMENT_LEN: usize = 2000;

pub async fn list_reviews(
    state: &AppState,
    template_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    ensure_template(state, template_id).await?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Reviews::find()
        .filter(ReviewCol::TemplateId.eq(template_id))
        .order_by_desc(ReviewCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let average_rating: Option<f64> = Reviews::find()
        .select_only()
        .column_as(Expr::cust("AVG(rating)::float8"), "average")
        .filter(ReviewCol::TemplateId.eq(template_id))
        .into_tuple::<Option<f64>>()
        .one(&state.orm)
        .await?
        .flatten();

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();

    Ok(ApiResponse::success(
        "Reviews",
        ReviewList {
            items,
            average_rating: average_rating.map(|avg| (avg * 100.0).round() / 100.0),
        },
        Some(Meta::new(page, limit, total)),
    ))
}

/// One review per user and template; posting again replaces the earlier one.
pub async fn upsert_review(
    state: &AppState,
    user: &AuthUser,
    template_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest("rating must be between 1 and 5".into()));
    }
    let comment = payload
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    if comment.as_ref().is_some_and(|c| c.chars().count() > MAX_COMMENT_LEN) {
        return Err(AppError::BadRequest(format!(
            "comment must be at most {MAX_COMMENT_LEN} characters"
        )));
    }
    ensure_template(state, template_id).await?;

    Reviews::insert(ReviewActive {
        id: Set(Uuid::new_v4()),
        template_id: Set(template_id),
        user_id: Set(user.user_id),
        rating: Set(payload.rating),
        comment: Set(comment),
        created_at: NotSet,
    })
    .on_conflict(
        OnConflict::columns([ReviewCol::TemplateId, ReviewCol::UserId])
            .update_columns([ReviewCol::Rating, ReviewCol::Comment])
            .to_owned(),
    )
    .exec_without_returning(&state.orm)
    .await?;

    let review = Reviews::find()
        .filter(ReviewCol::TemplateId.eq(template_id))
        .filter(ReviewCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("review vanished after upsert")))?;

    audit::record(
        state,
        Some(user.user_id),
        "review_upsert",
        "reviews",
        serde_json::json!({ "review_id": review.id, "template_id": template_id }),
    )
    .await;

    Ok(ApiResponse::success("Review saved", Review::from(review), None))
}

/// Authors may delete their own review; admins may delete any.
pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let review = Reviews::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if review.user_id != user.user_id && !user.is_admin() {
        return Err(AppError::Forbidden);
    }

    Reviews::delete_by_id(id).exec(&state.orm).await?;

    audit::record(
        state,
        Some(user.user_id),
        "review_delete",
        "reviews",
        serde_json::json!({ "review_id": id }),
    )
    .await;

    Ok(ApiResponse::done("Review deleted"))
}

async fn ensure_template(state: &AppState, template_id: Uuid) -> AppResult<()> {
    Templates::find_by_id(template_id)
        .one(&state.orm)
        .await?
        .map(|_| ())
        .ok_or(AppError::NotFound)
}
