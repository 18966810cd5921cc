//! The cart state holder.
//!
//! [`Cart`] is the in-memory line collection with its promo state. [`CartSession`]
//! binds a cart to a [`CartStore`] for one user: every mutation is applied locally
//! and then persisted, and a failed persistence call resynchronises the cart from
//! the store before the error is returned.

use std::future::Future;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    pricing::{self, CartLine, PromoApplication, PromoTable},
};

pub const MAX_LINE_QUANTITY: i32 = 999;

/// Outcome of a quantity change on a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    Quantity(i32),
    Removed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
    promo_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CartSummary {
    pub item_count: i64,
    pub subtotal: i64,
    pub line_discount: i64,
    pub promo_code: Option<String>,
    pub promo_discount: i64,
    pub grand_total: i64,
}

impl Cart {
    pub fn new(lines: Vec<CartLine>, promo_code: Option<String>) -> Self {
        Self { lines, promo_code }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    pub fn line(&self, id: Uuid) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    pub fn promo_code(&self) -> Option<&str> {
        self.promo_code.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds one unit of `line`. A product already in the cart gets its quantity
    /// bumped instead of a second line. Returns the resulting quantity.
    pub fn add(&mut self, line: CartLine) -> i32 {
        if let Some(existing) = self.lines.iter_mut().find(|l| l.id == line.id) {
            existing.quantity += 1;
            return existing.quantity;
        }
        self.lines.push(CartLine { quantity: 1, ..line });
        1
    }

    pub fn increment(&mut self, id: Uuid) -> Option<LineChange> {
        let current = self.line(id)?.quantity;
        self.update_quantity(id, current + 1)
    }

    /// At quantity 1 this removes the line.
    pub fn decrement(&mut self, id: Uuid) -> Option<LineChange> {
        let current = self.line(id)?.quantity;
        self.update_quantity(id, current - 1)
    }

    /// A quantity below 1 is a removal request. `None` when the line is absent.
    pub fn update_quantity(&mut self, id: Uuid, quantity: i32) -> Option<LineChange> {
        let index = self.lines.iter().position(|line| line.id == id)?;
        if quantity < 1 {
            self.lines.remove(index);
            return Some(LineChange::Removed);
        }
        let line = self.lines.get_mut(index)?;
        line.quantity = quantity;
        Some(LineChange::Quantity(quantity))
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Replaces the active code when `code` is valid; otherwise leaves it untouched.
    pub fn apply_promo(&mut self, code: &str, table: &PromoTable) -> PromoApplication {
        let subtotal = pricing::compute_totals(&self.lines).subtotal;
        let application = table.apply(code, subtotal);
        if application.is_valid {
            self.promo_code = Some(code.to_string());
        }
        application
    }

    pub fn clear_promo(&mut self) {
        self.promo_code = None;
    }

    /// Promo discount is derived from the current subtotal every time.
    pub fn summary(&self, table: &PromoTable) -> CartSummary {
        let totals = pricing::compute_totals(&self.lines);
        let (promo_code, promo_discount) = match self.promo_code.as_deref() {
            Some(code) => {
                let application = table.apply(code, totals.subtotal);
                if application.is_valid {
                    (Some(code.to_string()), application.discount_amount)
                } else {
                    (None, 0)
                }
            }
            None => (None, 0),
        };

        CartSummary {
            item_count: totals.item_count,
            subtotal: totals.subtotal,
            line_discount: totals.line_discount,
            promo_code,
            promo_discount,
            grand_total: pricing::grand_total(totals.subtotal, promo_discount),
        }
    }
}

/// Persistence for one user's cart lines and active promo code.
pub trait CartStore {
    fn fetch_lines(&self, user_id: Uuid) -> impl Future<Output = AppResult<Vec<CartLine>>> + Send;

    /// Insert or update the row keyed by `(user_id, line.id)`.
    fn upsert_line(
        &self,
        user_id: Uuid,
        line: &CartLine,
    ) -> impl Future<Output = AppResult<()>> + Send;

    fn delete_line(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> impl Future<Output = AppResult<()>> + Send;

    fn clear_lines(&self, user_id: Uuid) -> impl Future<Output = AppResult<()>> + Send;

    fn load_promo(&self, user_id: Uuid) -> impl Future<Output = AppResult<Option<String>>> + Send;

    fn save_promo(
        &self,
        user_id: Uuid,
        code: Option<&str>,
    ) -> impl Future<Output = AppResult<()>> + Send;
}

pub struct CartSession<'a, S> {
    store: &'a S,
    promos: &'a PromoTable,
    user_id: Uuid,
    cart: Cart,
}

impl<'a, S: CartStore> CartSession<'a, S> {
    pub async fn load(store: &'a S, promos: &'a PromoTable, user_id: Uuid) -> AppResult<Self> {
        let cart = fetch_cart(store, user_id).await?;
        Ok(Self {
            store,
            promos,
            user_id,
            cart,
        })
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn summary(&self) -> CartSummary {
        self.cart.summary(self.promos)
    }

    pub fn into_cart(self) -> Cart {
        self.cart
    }

    pub async fn add(&mut self, line: CartLine) -> AppResult<i32> {
        let id = line.id;
        let quantity = self.cart.add(line);
        if quantity > MAX_LINE_QUANTITY {
            self.cart.update_quantity(id, quantity - 1);
            return Err(quantity_out_of_range());
        }
        self.persist(id, LineChange::Quantity(quantity)).await?;
        Ok(quantity)
    }

    pub async fn increment(&mut self, id: Uuid) -> AppResult<LineChange> {
        let current = self.cart.line(id).ok_or(AppError::NotFound)?.quantity;
        self.update_quantity(id, current + 1).await
    }

    pub async fn decrement(&mut self, id: Uuid) -> AppResult<LineChange> {
        let current = self.cart.line(id).ok_or(AppError::NotFound)?.quantity;
        self.update_quantity(id, current - 1).await
    }

    pub async fn update_quantity(&mut self, id: Uuid, quantity: i32) -> AppResult<LineChange> {
        if quantity > MAX_LINE_QUANTITY {
            return Err(quantity_out_of_range());
        }
        let change = self
            .cart
            .update_quantity(id, quantity)
            .ok_or(AppError::NotFound)?;
        self.persist(id, change).await?;
        Ok(change)
    }

    pub async fn remove(&mut self, id: Uuid) -> AppResult<()> {
        if !self.cart.remove(id) {
            return Err(AppError::NotFound);
        }
        self.persist(id, LineChange::Removed).await
    }

    pub async fn clear(&mut self) -> AppResult<()> {
        self.cart.clear();
        let result = self.store.clear_lines(self.user_id).await;
        self.settle(result).await
    }

    /// An invalid code is reported through the returned application and changes nothing.
    pub async fn apply_promo(&mut self, code: &str) -> AppResult<PromoApplication> {
        let application = self.cart.apply_promo(code, self.promos);
        if !application.is_valid {
            return Ok(application);
        }
        let result = self.store.save_promo(self.user_id, Some(code)).await;
        self.settle(result).await?;
        Ok(application)
    }

    pub async fn remove_promo(&mut self) -> AppResult<()> {
        self.cart.clear_promo();
        let result = self.store.save_promo(self.user_id, None).await;
        self.settle(result).await
    }

    async fn persist(&mut self, id: Uuid, change: LineChange) -> AppResult<()> {
        let store = self.store;
        let result = match change {
            LineChange::Removed => store.delete_line(self.user_id, id).await,
            LineChange::Quantity(_) => match self.cart.line(id) {
                Some(line) => store.upsert_line(self.user_id, line).await,
                None => Ok(()),
            },
        };
        self.settle(result).await
    }

    /// On failure the local cart is replaced with the store's view before the
    /// error is handed back.
    async fn settle<T>(&mut self, result: AppResult<T>) -> AppResult<T> {
        if let Err(err) = &result {
            tracing::warn!(user_id = %self.user_id, error = %err, "cart persistence failed, resyncing");
            match fetch_cart(self.store, self.user_id).await {
                Ok(cart) => self.cart = cart,
                Err(resync_err) => {
                    tracing::error!(user_id = %self.user_id, error = %resync_err, "cart resync failed");
                }
            }
        }
        result
    }
}

async fn fetch_cart<S: CartStore>(store: &S, user_id: Uuid) -> AppResult<Cart> {
    let lines = store.fetch_lines(user_id).await?;
    let promo = store.load_promo(user_id).await?;
    Ok(Cart::new(lines, promo))
}

fn quantity_out_of_range() -> AppError {
    AppError::BadRequest(format!("quantity must not exceed {MAX_LINE_QUANTITY}"))
}
