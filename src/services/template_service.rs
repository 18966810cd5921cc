use sea_orm::{EntityTrait, QueryOrder};
use uuid::Uuid;

use crate::{
    catalog,
    dto::templates::{CategoryList, TemplateList},
    entity::templates::{Column, Entity as Templates},
    error::{AppError, AppResult},
    models::Template,
    response::{ApiResponse, Meta},
    routes::params::{Pagination, TemplateQuery},
    state::AppState,
};

/// The catalog is small, so filtering and ordering run in memory over the full set.
pub async fn list_templates(
    state: &AppState,
    query: TemplateQuery,
) -> AppResult<ApiResponse<TemplateList>> {
    let filter = query.filter();
    if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
        if min > max {
            return Err(AppError::BadRequest(
                "min_price must not exceed max_price".into(),
            ));
        }
    }

    let all = load_catalog(state).await?;
    let (items, meta) = paginate(catalog::filter_and_sort(all, &filter), &query.pagination());
    Ok(ApiResponse::success("Templates", TemplateList { items }, Some(meta)))
}

pub async fn get_template(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Template>> {
    let template = Templates::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(Template::from)
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Template", template, None))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let all = load_catalog(state).await?;
    let items = catalog::categories(&all);
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

async fn load_catalog(state: &AppState) -> AppResult<Vec<Template>> {
    Ok(Templates::find()
        .order_by_asc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Template::from)
        .collect())
}

/// One page of an already ordered list, with its paging meta.
pub fn paginate<T>(items: Vec<T>, pagination: &Pagination) -> (Vec<T>, Meta) {
    let (page, per_page, offset) = pagination.normalize();
    let total = items.len() as i64;
    let page_items = items
        .into_iter()
        .skip(offset as usize)
        .take(per_page as usize)
        .collect();
    (page_items, Meta::new(page, per_page, total))
}

