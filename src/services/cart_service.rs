use chrono::Utc;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    audit,
    cart::{CartSession, CartStore, LineChange},
    dto::cart::{AddToCartRequest, ApplyPromoRequest, CartView, UpdateQuantityRequest},
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems},
        cart_promos::{ActiveModel as PromoActive, Column as PromoCol, Entity as CartPromos},
        templates::{Entity as Templates, Model as TemplateModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    pricing::CartLine,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// [`CartStore`] over the `cart_items` and `cart_promos` tables. Generic over the
/// connection so checkout can read through its transaction.
pub struct DbCartStore<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> DbCartStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }
}

impl<C: ConnectionTrait + Sync> CartStore for DbCartStore<'_, C> {
    async fn fetch_lines(&self, user_id: Uuid) -> AppResult<Vec<CartLine>> {
        let rows = CartItems::find()
            .filter(CartCol::UserId.eq(user_id))
            .order_by_asc(CartCol::CreatedAt)
            .find_also_related(Templates)
            .all(self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(item, template)| {
                template.map(|template| CartLine {
                    quantity: item.quantity,
                    ..line_from_template(&template)
                })
            })
            .collect())
    }

    async fn upsert_line(&self, user_id: Uuid, line: &CartLine) -> AppResult<()> {
        CartItems::insert(CartActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            product_id: Set(line.id),
            quantity: Set(line.quantity),
            created_at: NotSet,
        })
        .on_conflict(
            OnConflict::columns([CartCol::UserId, CartCol::ProductId])
                .update_column(CartCol::Quantity)
                .to_owned(),
        )
        .exec_without_returning(self.conn)
        .await?;
        Ok(())
    }

    async fn delete_line(&self, user_id: Uuid, product_id: Uuid) -> AppResult<()> {
        CartItems::delete_many()
            .filter(CartCol::UserId.eq(user_id))
            .filter(CartCol::ProductId.eq(product_id))
            .exec(self.conn)
            .await?;
        Ok(())
    }

    async fn clear_lines(&self, user_id: Uuid) -> AppResult<()> {
        CartItems::delete_many()
            .filter(CartCol::UserId.eq(user_id))
            .exec(self.conn)
            .await?;
        Ok(())
    }

    async fn load_promo(&self, user_id: Uuid) -> AppResult<Option<String>> {
        let promo = CartPromos::find_by_id(user_id).one(self.conn).await?;
        Ok(promo.map(|p| p.code))
    }

    async fn save_promo(&self, user_id: Uuid, code: Option<&str>) -> AppResult<()> {
        match code {
            Some(code) => {
                CartPromos::insert(PromoActive {
                    user_id: Set(user_id),
                    code: Set(code.to_string()),
                    updated_at: Set(Utc::now().into()),
                })
                .on_conflict(
                    OnConflict::column(PromoCol::UserId)
                        .update_columns([PromoCol::Code, PromoCol::UpdatedAt])
                        .to_owned(),
                )
                .exec_without_returning(self.conn)
                .await?;
            }
            None => {
                CartPromos::delete_by_id(user_id).exec(self.conn).await?;
            }
        }
        Ok(())
    }
}

pub fn line_from_template(template: &TemplateModel) -> CartLine {
    CartLine {
        id: template.id,
        title: template.title.clone(),
        unit_price: template.price,
        discounted_unit_price: template.discounted_price,
        quantity: 1,
        product_type: template.product_type.clone(),
        is_bundle: Some(template.is_bundle),
    }
}

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let store = DbCartStore::new(&state.orm);
    let session = CartSession::load(&store, &state.promos, user.user_id).await?;
    Ok(ApiResponse::success("OK", view(&session), Some(Meta::empty())))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    let template = Templates::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("product not found".to_string()))?;

    let store = DbCartStore::new(&state.orm);
    let mut session = CartSession::load(&store, &state.promos, user.user_id).await?;
    let quantity = session.add(line_from_template(&template)).await?;

    audit::record(
        state,
        Some(user.user_id),
        "cart_add",
        "cart_items",
        serde_json::json!({ "product_id": template.id, "quantity": quantity }),
    )
    .await;

    Ok(ApiResponse::success("Added to cart", view(&session), None))
}

pub async fn update_quantity(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: UpdateQuantityRequest,
) -> AppResult<ApiResponse<CartView>> {
    let store = DbCartStore::new(&state.orm);
    let mut session = CartSession::load(&store, &state.promos, user.user_id).await?;
    let change = session.update_quantity(product_id, payload.quantity).await?;
    record_change(state, user, product_id, change).await;
    Ok(ApiResponse::success("Cart updated", view(&session), None))
}

pub async fn increment(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let store = DbCartStore::new(&state.orm);
    let mut session = CartSession::load(&store, &state.promos, user.user_id).await?;
    let change = session.increment(product_id).await?;
    record_change(state, user, product_id, change).await;
    Ok(ApiResponse::success("Cart updated", view(&session), None))
}

pub async fn decrement(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let store = DbCartStore::new(&state.orm);
    let mut session = CartSession::load(&store, &state.promos, user.user_id).await?;
    let change = session.decrement(product_id).await?;
    record_change(state, user, product_id, change).await;
    Ok(ApiResponse::success("Cart updated", view(&session), None))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let store = DbCartStore::new(&state.orm);
    let mut session = CartSession::load(&store, &state.promos, user.user_id).await?;
    session.remove(product_id).await?;
    record_change(state, user, product_id, LineChange::Removed).await;
    Ok(ApiResponse::success("Removed from cart", view(&session), None))
}

pub async fn clear_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let store = DbCartStore::new(&state.orm);
    let mut session = CartSession::load(&store, &state.promos, user.user_id).await?;
    session.clear().await?;

    audit::record(
        state,
        Some(user.user_id),
        "cart_clear",
        "cart_items",
        serde_json::json!({}),
    )
    .await;

    Ok(ApiResponse::success("Cart cleared", view(&session), None))
}

pub async fn apply_promo(
    state: &AppState,
    user: &AuthUser,
    payload: ApplyPromoRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.code.is_empty() {
        return Err(AppError::BadRequest("promo code is required".into()));
    }

    let store = DbCartStore::new(&state.orm);
    let mut session = CartSession::load(&store, &state.promos, user.user_id).await?;
    let application = session.apply_promo(&payload.code).await?;
    if !application.is_valid {
        return Err(AppError::BadRequest("Invalid promo code".into()));
    }

    audit::record(
        state,
        Some(user.user_id),
        "promo_apply",
        "cart_promos",
        serde_json::json!({ "code": payload.code, "discount": application.discount_amount }),
    )
    .await;

    Ok(ApiResponse::success("Promo code applied", view(&session), None))
}

pub async fn remove_promo(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let store = DbCartStore::new(&state.orm);
    let mut session = CartSession::load(&store, &state.promos, user.user_id).await?;
    session.remove_promo().await?;
    Ok(ApiResponse::success("Promo code removed", view(&session), None))
}

fn view<S: CartStore>(session: &CartSession<'_, S>) -> CartView {
    CartView {
        items: session.cart().lines().to_vec(),
        summary: session.summary(),
    }
}

async fn record_change(state: &AppState, user: &AuthUser, product_id: Uuid, change: LineChange) {
    let (action, quantity) = match change {
        LineChange::Quantity(quantity) => ("cart_update", quantity),
        LineChange::Removed => ("cart_remove", 0),
    };
    audit::record(
        state,
        Some(user.user_id),
        action,
        "cart_items",
        serde_json::json!({ "product_id": product_id, "quantity": quantity }),
    )
    .await;
}
