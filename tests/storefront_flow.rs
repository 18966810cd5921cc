use axum::{extract::FromRequestParts, http::Request};
use sea_orm::{ConnectionTrait, Statement};
use template_store_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        auth::{LoginRequest, RegisterRequest},
        blog::{CreateBlogPostRequest, UpdateBlogPostRequest},
        cart::{AddToCartRequest, ApplyPromoRequest, UpdateQuantityRequest},
        purchases::CheckoutRequest,
        reviews::CreateReviewRequest,
        templates::{CreateTemplateRequest, UpdateTemplateRequest},
    },
    entity::users,
    error::AppError,
    middleware::auth::{AuthUser, ROLE_ADMIN},
    routes::params::{Pagination, TemplateQuery},
    services::{
        admin_service, auth_service, blog_service, cart_service, purchase_service,
        review_service, template_service,
    },
    state::AppState,
    storage::Folder,
};

const PASSWORD: &str = "correct-horse";

// Integration flow: admin publishes content -> shopper signs in, fills the cart,
// applies a promo, checks out and reviews -> sign-out revokes the token.
#[tokio::test]
async fn storefront_purchase_and_admin_content_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let upload_dir = tempfile::tempdir()?;
    let state = setup_state(&database_url, upload_dir.path()).await?;

    let shopper = sign_in(&state, "shopper@example.com").await?;
    register_and_login(&state, "admin@example.com").await?;
    promote_to_admin(&state, "admin@example.com").await?;
    // Role is read from the token, so sign in again after promotion.
    let admin = sign_in_existing(&state, "admin@example.com").await?;

    // Non-admins are kept out of the admin surface.
    let forbidden = admin_service::list_templates(&state, &shopper, Pagination::new(1, 20)).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    // Admin uploads a download and creates two templates.
    let upload = admin_service::upload_file(
        &state,
        &admin,
        Folder::Downloads,
        Some("corporate.zip"),
        b"zip-bytes",
    )
    .await?
    .data
    .expect("stored file");

    let corporate = admin_service::create_template(
        &state,
        &admin,
        CreateTemplateRequest {
            title: "Corporate Pro".into(),
            description: Some("Business site".into()),
            category: "Business".into(),
            price: 4900,
            discounted_price: Some(3900),
            product_type: Some("website".into()),
            is_bundle: false,
            is_featured: true,
            image_url: None,
            download_url: Some(upload.url.clone()),
        },
    )
    .await?
    .data
    .expect("template");

    let journal = admin_service::create_template(
        &state,
        &admin,
        CreateTemplateRequest {
            title: "Minimal Journal".into(),
            description: None,
            category: "Blog".into(),
            price: 2500,
            discounted_price: None,
            product_type: None,
            is_bundle: false,
            is_featured: false,
            image_url: None,
            download_url: None,
        },
    )
    .await?
    .data
    .expect("template");

    let duplicate = admin_service::create_template(
        &state,
        &admin,
        CreateTemplateRequest {
            title: "Corporate Pro".into(),
            description: None,
            category: "Business".into(),
            price: 100,
            discounted_price: None,
            product_type: None,
            is_bundle: false,
            is_featured: false,
            image_url: None,
            download_url: None,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // Catalog filtering over the stored templates.
    let business = template_service::list_templates(
        &state,
        TemplateQuery {
            category: Some("Business".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("templates");
    assert_eq!(business.items.len(), 1);
    assert_eq!(business.items[0].id, corporate.id);

    // Cart: add twice, add another, then adjust.
    cart_service::add_to_cart(&state, &shopper, AddToCartRequest { product_id: corporate.id }).await?;
    cart_service::add_to_cart(&state, &shopper, AddToCartRequest { product_id: corporate.id }).await?;
    cart_service::add_to_cart(&state, &shopper, AddToCartRequest { product_id: journal.id }).await?;
    let view = cart_service::decrement(&state, &shopper, journal.id)
        .await?
        .data
        .expect("cart");
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.summary.item_count, 2);
    assert_eq!(view.summary.subtotal, 3900 * 2);
    assert_eq!(view.summary.line_discount, 1000 * 2);

    let view = cart_service::update_quantity(
        &state,
        &shopper,
        corporate.id,
        UpdateQuantityRequest { quantity: 3 },
    )
    .await?
    .data
    .expect("cart");
    assert_eq!(view.summary.item_count, 3);

    // Promo codes.
    let bogus = cart_service::apply_promo(
        &state,
        &shopper,
        ApplyPromoRequest { code: "BOGUS".into() },
    )
    .await;
    assert!(matches!(bogus, Err(AppError::BadRequest(_))));

    let view = cart_service::apply_promo(
        &state,
        &shopper,
        ApplyPromoRequest { code: "SAVE20".into() },
    )
    .await?
    .data
    .expect("cart");
    assert_eq!(view.summary.subtotal, 11_700);
    assert_eq!(view.summary.promo_discount, 2_340);
    assert_eq!(view.summary.grand_total, 9_360);

    // Checkout records the purchase and empties the cart.
    let receipt = purchase_service::checkout(
        &state,
        &shopper,
        CheckoutRequest {
            full_name: "Shopper".into(),
            email: "shopper@example.com".into(),
            card_number: "4242 4242 4242 4242".into(),
            expiry: "12/99".into(),
            cvc: "123".into(),
        },
    )
    .await?
    .data
    .expect("purchase");
    assert_eq!(receipt.purchase.total_amount, 9_360);
    assert_eq!(receipt.purchase.promo_code.as_deref(), Some("SAVE20"));
    assert_eq!(receipt.purchase.card_last4, "4242");
    assert_eq!(receipt.items.len(), 1);
    assert_eq!(receipt.items[0].download_url.as_deref(), Some(upload.url.as_str()));

    let cart = cart_service::get_cart(&state, &shopper).await?.data.expect("cart");
    assert!(cart.items.is_empty());
    assert_eq!(cart.summary.promo_code, None);

    let empty_checkout = purchase_service::checkout(
        &state,
        &shopper,
        CheckoutRequest {
            full_name: "Shopper".into(),
            email: "shopper@example.com".into(),
            card_number: "4242 4242 4242 4242".into(),
            expiry: "12/99".into(),
            cvc: "123".into(),
        },
    )
    .await;
    assert!(matches!(empty_checkout, Err(AppError::BadRequest(_))));

    let history = purchase_service::list_purchases(&state, &shopper, Pagination::new(1, 20))
        .await?
        .data
        .expect("purchases");
    assert_eq!(history.items.len(), 1);
    let fetched = purchase_service::get_purchase(&state, &admin, receipt.purchase.id).await;
    assert!(matches!(fetched, Err(AppError::NotFound)));

    // Reviews: a second review from the same user replaces the first.
    review_service::upsert_review(
        &state,
        &shopper,
        corporate.id,
        CreateReviewRequest { rating: 3, comment: None },
    )
    .await?;
    let review = review_service::upsert_review(
        &state,
        &shopper,
        corporate.id,
        CreateReviewRequest {
            rating: 5,
            comment: Some("Great layout".into()),
        },
    )
    .await?
    .data
    .expect("review");
    let reviews = review_service::list_reviews(&state, corporate.id, Pagination::new(1, 20))
        .await?
        .data
        .expect("reviews");
    assert_eq!(reviews.items.len(), 1);
    assert_eq!(reviews.average_rating, Some(5.0));
    let out_of_range = review_service::upsert_review(
        &state,
        &shopper,
        corporate.id,
        CreateReviewRequest { rating: 6, comment: None },
    )
    .await;
    assert!(matches!(out_of_range, Err(AppError::BadRequest(_))));
    review_service::delete_review(&state, &admin, review.id).await?;

    // Blog: drafts stay hidden until published.
    let post = admin_service::create_blog_post(
        &state,
        &admin,
        CreateBlogPostRequest {
            title: "Launch Week Tips".into(),
            slug: None,
            excerpt: None,
            content: "Ship it.".into(),
            cover_image_url: None,
            published: false,
        },
    )
    .await?
    .data
    .expect("post");
    assert_eq!(post.slug, "launch-week-tips");
    assert!(matches!(
        blog_service::get_published_by_slug(&state, &post.slug).await,
        Err(AppError::NotFound)
    ));

    admin_service::update_blog_post(
        &state,
        &admin,
        post.id,
        UpdateBlogPostRequest {
            published: Some(true),
            ..Default::default()
        },
    )
    .await?;
    let public = blog_service::get_published_by_slug(&state, &post.slug)
        .await?
        .data
        .expect("post");
    assert_eq!(public.id, post.id);

    // A purchased download survives removal from the template and its deletion.
    let stored_path = upload_dir.path().join(&upload.path);
    assert!(stored_path.exists());
    admin_service::update_template(
        &state,
        &admin,
        corporate.id,
        UpdateTemplateRequest {
            download_url: Some(None),
            ..Default::default()
        },
    )
    .await?;
    assert!(stored_path.exists());
    admin_service::delete_template(&state, &admin, corporate.id).await?;
    assert!(stored_path.exists());
    let receipt_again = purchase_service::get_purchase(&state, &shopper, receipt.purchase.id)
        .await?
        .data
        .expect("purchase");
    assert_eq!(
        receipt_again.items[0].download_url.as_deref(),
        Some(upload.url.as_str())
    );

    // A download nobody bought is removed with its template.
    let unsold = admin_service::upload_file(
        &state,
        &admin,
        Folder::Downloads,
        Some("journal.zip"),
        b"zip-bytes",
    )
    .await?
    .data
    .expect("stored file");
    admin_service::update_template(
        &state,
        &admin,
        journal.id,
        UpdateTemplateRequest {
            download_url: Some(Some(unsold.url.clone())),
            ..Default::default()
        },
    )
    .await?;
    let unsold_path = upload_dir.path().join(&unsold.path);
    assert!(unsold_path.exists());
    admin_service::delete_template(&state, &admin, journal.id).await?;
    assert!(!unsold_path.exists());
    assert!(matches!(
        template_service::get_template(&state, journal.id).await,
        Err(AppError::NotFound)
    ));

    // Signing out revokes the token.
    let token = login(&state, "shopper@example.com").await?;
    let user = authenticate(&state, &token).await?;
    auth_service::logout_user(&state, &user).await?;
    assert!(matches!(
        authenticate(&state, &token).await,
        Err(AppError::Unauthorized)
    ));

    Ok(())
}

async fn setup_state(database_url: &str, upload_dir: &std::path::Path) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE purchase_items, purchases, reviews, cart_items, cart_promos, blog_posts, templates, revoked_tokens, audit_logs, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 3000,
        jwt_secret: "integration-secret".into(),
        upload_dir: upload_dir.display().to_string(),
        public_base_url: "http://localhost:3000".into(),
        max_upload_bytes: 1024 * 1024,
        promo_codes: Vec::new(),
    };
    Ok(AppState::new(orm, config))
}

async fn register_and_login(state: &AppState, email: &str) -> anyhow::Result<String> {
    auth_service::register_user(
        state,
        RegisterRequest {
            email: email.into(),
            password: PASSWORD.into(),
            full_name: Some("Test User".into()),
        },
    )
    .await?;
    login(state, email).await
}

async fn login(state: &AppState, email: &str) -> anyhow::Result<String> {
    let resp = auth_service::login_user(
        state,
        LoginRequest {
            email: email.into(),
            password: PASSWORD.into(),
        },
    )
    .await?;
    Ok(resp.data.expect("login").token)
}

async fn sign_in(state: &AppState, email: &str) -> anyhow::Result<AuthUser> {
    let token = register_and_login(state, email).await?;
    Ok(authenticate(state, &token).await?)
}

async fn sign_in_existing(state: &AppState, email: &str) -> anyhow::Result<AuthUser> {
    let token = login(state, email).await?;
    Ok(authenticate(state, &token).await?)
}

async fn authenticate(state: &AppState, token: &str) -> Result<AuthUser, AppError> {
    let (mut parts, ()) = Request::builder()
        .header("Authorization", format!("Bearer {token}"))
        .body(())
        .expect("request")
        .into_parts();
    AuthUser::from_request_parts(&mut parts, state).await
}

async fn promote_to_admin(state: &AppState, email: &str) -> anyhow::Result<()> {
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, sea_query::Expr};

    users::Entity::update_many()
        .col_expr(users::Column::Role, Expr::value(ROLE_ADMIN))
        .filter(users::Column::Email.eq(email))
        .exec(&state.orm)
        .await?;
    Ok(())
}
