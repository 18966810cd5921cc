use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::CartSummary,
    catalog::SortKey,
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest},
        blog::{BlogPostList, CreateBlogPostRequest, UpdateBlogPostRequest},
        cart::{AddToCartRequest, ApplyPromoRequest, CartView, UpdateQuantityRequest},
        purchases::{CheckoutRequest, PurchaseList, PurchaseWithItems},
        reviews::{CreateReviewRequest, ReviewList},
        templates::{CategoryList, CreateTemplateRequest, TemplateList, UpdateTemplateRequest},
    },
    models::{BlogPost, Profile, Purchase, PurchaseItem, Review, Template},
    pricing::CartLine,
    response::{ApiResponse, Meta},
    routes::{admin, auth, blog, cart, health, params, purchases, reviews, templates},
    storage::{Folder, StoredFile},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        auth::update_me,
        templates::list_templates,
        templates::list_categories,
        templates::get_template,
        templates::list_reviews,
        templates::upsert_review,
        reviews::delete_review,
        cart::cart_view,
        cart::add_to_cart,
        cart::update_quantity,
        cart::increment,
        cart::decrement,
        cart::remove_from_cart,
        cart::clear_cart,
        cart::apply_promo,
        cart::remove_promo,
        purchases::checkout,
        purchases::list_purchases,
        purchases::get_purchase,
        blog::list_posts,
        blog::get_post,
        admin::list_blog_posts,
        admin::get_blog_post,
        admin::create_blog_post,
        admin::update_blog_post,
        admin::delete_blog_post,
        admin::list_templates,
        admin::create_template,
        admin::update_template,
        admin::delete_template,
        admin::upload_file
    ),
    components(
        schemas(
            Profile,
            Template,
            Purchase,
            PurchaseItem,
            Review,
            BlogPost,
            CartLine,
            CartSummary,
            CartView,
            SortKey,
            Folder,
            StoredFile,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            AddToCartRequest,
            UpdateQuantityRequest,
            ApplyPromoRequest,
            CheckoutRequest,
            CreateReviewRequest,
            CreateTemplateRequest,
            UpdateTemplateRequest,
            CreateBlogPostRequest,
            UpdateBlogPostRequest,
            admin::UploadForm,
            TemplateList,
            CategoryList,
            ReviewList,
            BlogPostList,
            PurchaseList,
            PurchaseWithItems,
            params::Pagination,
            params::TemplateQuery,
            params::BlogListQuery,
            Meta,
            ApiResponse<Template>,
            ApiResponse<TemplateList>,
            ApiResponse<CartView>,
            ApiResponse<PurchaseWithItems>,
            ApiResponse<PurchaseList>,
            ApiResponse<BlogPost>,
            ApiResponse<BlogPostList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, sign-in and profile"),
        (name = "Templates", description = "Storefront catalog"),
        (name = "Reviews", description = "Template reviews"),
        (name = "Cart", description = "Cart and promo codes"),
        (name = "Purchases", description = "Checkout and purchase history"),
        (name = "Blog", description = "Published blog posts"),
        (name = "Admin", description = "Content management for blog posts, templates and uploads"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
