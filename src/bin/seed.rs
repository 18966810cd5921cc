use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::OnConflict,
};
use template_store_api::{
    catalog::sample_catalog,
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{blog_posts, templates, users},
    middleware::auth::{ROLE_ADMIN, ROLE_USER},
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&orm, "admin@example.com", "admin1234", "Store Admin", ROLE_ADMIN).await?;
    let user_id = ensure_user(&orm, "user@example.com", "user12345", "Demo Customer", ROLE_USER).await?;
    seed_templates(&orm).await?;
    seed_blog(&orm, admin_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
    full_name: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    users::Entity::insert(users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        full_name: Set(Some(full_name.to_string())),
        role: Set(role.to_string()),
        created_at: NotSet,
    })
    .on_conflict(
        OnConflict::column(users::Column::Email)
            .update_column(users::Column::Role)
            .to_owned(),
    )
    .exec_without_returning(orm)
    .await?;

    let user = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user {email} missing after upsert"))?;

    println!("Ensured user {email} (role={role})");
    Ok(user.id)
}

async fn seed_templates(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let mut inserted = 0;
    for template in sample_catalog() {
        let rows = templates::Entity::insert(templates::ActiveModel {
            id: Set(template.id),
            title: Set(template.title),
            description: Set(template.description),
            category: Set(template.category),
            price: Set(template.price),
            discounted_price: Set(template.discounted_price),
            product_type: Set(template.product_type),
            is_bundle: Set(template.is_bundle),
            is_featured: Set(template.is_featured),
            image_url: Set(template.image_url),
            download_url: Set(template.download_url),
            created_at: Set(template.created_at.fixed_offset()),
            updated_at: Set(template.updated_at.fixed_offset()),
        })
        .on_conflict(
            OnConflict::column(templates::Column::Title)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(orm)
        .await?;
        inserted += rows;
    }

    println!("Seeded templates ({inserted} new)");
    Ok(())
}

async fn seed_blog(orm: &DatabaseConnection, author_id: Uuid) -> anyhow::Result<()> {
    blog_posts::Entity::insert(blog_posts::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set("Welcome to the template store".to_string()),
        slug: Set("welcome-to-the-template-store".to_string()),
        excerpt: Set(Some("What you can find here and how purchases work.".to_string())),
        content: Set(
            "Browse the catalog by category or price, add templates to your cart and \
             check out in a few clicks. Downloads appear on your purchase page right away."
                .to_string(),
        ),
        cover_image_url: Set(None),
        published: Set(true),
        author_id: Set(Some(author_id)),
        created_at: NotSet,
        updated_at: NotSet,
    })
    .on_conflict(
        OnConflict::column(blog_posts::Column::Slug)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(orm)
    .await?;

    println!("Seeded blog");
    Ok(())
}
