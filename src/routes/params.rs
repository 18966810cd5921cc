use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::catalog::{CatalogFilter, SortKey};

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Page number, default 1.
    pub page: Option<i64>,
    /// Items per page, default 20, at most 100.
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

/// Query string for the storefront catalog. Pagination fields are inline rather
/// than flattened because url-encoded flattening loses numeric types.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TemplateQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Exact category name; `All` or absent matches everything.
    pub category: Option<String>,
    /// Inclusive lower bound on the effective price, in cents.
    pub min_price: Option<i64>,
    /// Inclusive upper bound on the effective price, in cents.
    pub max_price: Option<i64>,
    /// `featured`, `price-low`, `price-high` or `newest`.
    pub sort: Option<SortKey>,
    /// Case-insensitive search over title and description.
    pub q: Option<String>,
}

impl TemplateQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    pub fn filter(&self) -> CatalogFilter {
        CatalogFilter {
            category: self.category.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            search: self.q.clone(),
            sort: self.sort.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BlogListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Admin listing only: restrict to published (`true`) or drafts (`false`).
    pub published: Option<bool>,
}

impl BlogListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}
