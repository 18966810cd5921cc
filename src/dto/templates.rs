use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{dto::double_option, models::Template};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTemplateRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub price: i64,
    pub discounted_price: Option<i64>,
    pub product_type: Option<String>,
    #[serde(default)]
    pub is_bundle: bool,
    #[serde(default)]
    pub is_featured: bool,
    pub image_url: Option<String>,
    pub download_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTemplateRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub category: Option<String>,
    pub price: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub discounted_price: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub product_type: Option<Option<String>>,
    pub is_bundle: Option<bool>,
    pub is_featured: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub download_url: Option<Option<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TemplateList {
    #[schema(value_type = Vec<Template>)]
    pub items: Vec<Template>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    pub items: Vec<String>,
}
