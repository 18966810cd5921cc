use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    blog_posts::Model as BlogPostModel, purchase_items::Model as PurchaseItemModel,
    purchases::Model as PurchaseModel, reviews::Model as ReviewModel,
    templates::Model as TemplateModel, users::Model as UserModel,
};

/// Public view of a user; the password hash never leaves the service layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Template {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub price: i64,
    pub discounted_price: Option<i64>,
    pub product_type: Option<String>,
    pub is_bundle: bool,
    pub is_featured: bool,
    pub image_url: Option<String>,
    pub download_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub invoice_number: String,
    pub subtotal: i64,
    pub line_discount: i64,
    pub promo_code: Option<String>,
    pub promo_discount: i64,
    pub total_amount: i64,
    pub status: String,
    pub payer_name: String,
    pub payer_email: String,
    pub card_last4: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseItem {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub template_id: Option<Uuid>,
    pub title: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub download_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub template_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub published: bool,
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserModel> for Profile {
    fn from(model: UserModel) -> Self {
        Self {
            id: model.id,
            email: model.email,
            full_name: model.full_name,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<TemplateModel> for Template {
    fn from(model: TemplateModel) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            category: model.category,
            price: model.price,
            discounted_price: model.discounted_price,
            product_type: model.product_type,
            is_bundle: model.is_bundle,
            is_featured: model.is_featured,
            image_url: model.image_url,
            download_url: model.download_url,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<PurchaseModel> for Purchase {
    fn from(model: PurchaseModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            invoice_number: model.invoice_number,
            subtotal: model.subtotal,
            line_discount: model.line_discount,
            promo_code: model.promo_code,
            promo_discount: model.promo_discount,
            total_amount: model.total_amount,
            status: model.status,
            payer_name: model.payer_name,
            payer_email: model.payer_email,
            card_last4: model.card_last4,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<PurchaseItemModel> for PurchaseItem {
    fn from(model: PurchaseItemModel) -> Self {
        Self {
            id: model.id,
            purchase_id: model.purchase_id,
            template_id: model.template_id,
            title: model.title,
            unit_price: model.unit_price,
            quantity: model.quantity,
            download_url: model.download_url,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<ReviewModel> for Review {
    fn from(model: ReviewModel) -> Self {
        Self {
            id: model.id,
            template_id: model.template_id,
            user_id: model.user_id,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<BlogPostModel> for BlogPost {
    fn from(model: BlogPostModel) -> Self {
        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            excerpt: model.excerpt,
            content: model.content,
            cover_image_url: model.cover_image_url,
            published: model.published,
            author_id: model.author_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
