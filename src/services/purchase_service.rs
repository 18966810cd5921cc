use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    cart::{CartSession, CartStore},
    dto::purchases::{CheckoutRequest, PurchaseList, PurchaseWithItems},
    entity::{
        purchase_items::{ActiveModel as ItemActive, Column as ItemCol, Entity as PurchaseItems},
        purchases::{ActiveModel as PurchaseActive, Column as PurchaseCol, Entity as Purchases},
        templates::{Column as TemplateCol, Entity as Templates},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Purchase, PurchaseItem},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::cart_service::DbCartStore,
    state::AppState,
};

pub const STATUS_COMPLETED: &str = "completed";

/// The parts of a payment form that survive validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPayment {
    pub payer_name: String,
    pub payer_email: String,
    pub card_last4: String,
}

pub fn validate_payment(form: &CheckoutRequest, today: NaiveDate) -> AppResult<ValidatedPayment> {
    let payer_name = form.full_name.trim();
    if payer_name.is_empty() {
        return Err(AppError::BadRequest("full_name is required".into()));
    }

    let payer_email = form.email.trim();
    match payer_email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => return Err(AppError::BadRequest("email is invalid".into())),
    }

    let digits: String = form
        .card_number
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    if !(13..=19).contains(&digits.len())
        || !digits.chars().all(|c| c.is_ascii_digit())
        || !luhn_valid(&digits)
    {
        return Err(AppError::BadRequest("card number is invalid".into()));
    }

    let (month, year) = parse_expiry(&form.expiry)
        .ok_or_else(|| AppError::BadRequest("expiry must look like MM/YY".into()))?;
    if (year, month) < (today.year(), today.month()) {
        return Err(AppError::BadRequest("card has expired".into()));
    }

    let cvc = form.cvc.trim();
    if !(3..=4).contains(&cvc.len()) || !cvc.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest("cvc is invalid".into()));
    }

    let card_last4 = digits.chars().skip(digits.len() - 4).collect();
    Ok(ValidatedPayment {
        payer_name: payer_name.to_string(),
        payer_email: payer_email.to_lowercase(),
        card_last4,
    })
}

/// Luhn checksum over an all-digit string.
pub fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    !digits.is_empty() && sum % 10 == 0
}

/// `MM/YY` to `(month, full year)`.
fn parse_expiry(raw: &str) -> Option<(u32, i32)> {
    let (month, year) = raw.trim().split_once('/')?;
    let month: u32 = month.trim().parse().ok()?;
    let year = year.trim();
    if !(1..=12).contains(&month) || year.len() != 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    Some((month, 2000 + year))
}

pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<PurchaseWithItems>> {
    let payment = validate_payment(&payload, Utc::now().date_naive())?;

    let txn = state.orm.begin().await?;
    let store = DbCartStore::new(&txn);
    let session = CartSession::load(&store, &state.promos, user.user_id).await?;
    if session.cart().is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    let summary = session.summary();
    let lines = session.into_cart().into_lines();

    let ids: Vec<Uuid> = lines.iter().map(|line| line.id).collect();
    let downloads: HashMap<Uuid, Option<String>> = Templates::find()
        .filter(TemplateCol::Id.is_in(ids))
        .all(&txn)
        .await?
        .into_iter()
        .map(|t| (t.id, t.download_url))
        .collect();

    let purchase_id = Uuid::new_v4();
    let purchase = PurchaseActive {
        id: Set(purchase_id),
        user_id: Set(user.user_id),
        invoice_number: Set(build_invoice_number(purchase_id)),
        subtotal: Set(summary.subtotal),
        line_discount: Set(summary.line_discount),
        promo_code: Set(summary.promo_code.clone()),
        promo_discount: Set(summary.promo_discount),
        total_amount: Set(summary.grand_total),
        status: Set(STATUS_COMPLETED.into()),
        payer_name: Set(payment.payer_name),
        payer_email: Set(payment.payer_email),
        card_last4: Set(payment.card_last4),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<PurchaseItem> = Vec::with_capacity(lines.len());
    for line in &lines {
        let item = ItemActive {
            id: Set(Uuid::new_v4()),
            purchase_id: Set(purchase.id),
            template_id: Set(Some(line.id)),
            title: Set(line.title.clone()),
            unit_price: Set(line.effective_unit_price()),
            quantity: Set(line.quantity),
            download_url: Set(downloads.get(&line.id).cloned().flatten()),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(PurchaseItem::from(item));
    }

    store.clear_lines(user.user_id).await?;
    store.save_promo(user.user_id, None).await?;

    txn.commit().await?;

    tracing::info!(
        user_id = %user.user_id,
        purchase_id = %purchase.id,
        total = purchase.total_amount,
        "checkout completed"
    );
    audit::record(
        state,
        Some(user.user_id),
        "checkout",
        "purchases",
        serde_json::json!({ "purchase_id": purchase.id, "total": purchase.total_amount }),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout success",
        PurchaseWithItems {
            purchase: Purchase::from(purchase),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_purchases(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<PurchaseList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Purchases::find()
        .filter(PurchaseCol::UserId.eq(user.user_id))
        .order_by_desc(PurchaseCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Purchase::from)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        PurchaseList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Thank-you page data.
pub async fn get_purchase(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<PurchaseWithItems>> {
    let purchase = Purchases::find()
        .filter(
            Condition::all()
                .add(PurchaseCol::UserId.eq(user.user_id))
                .add(PurchaseCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = PurchaseItems::find()
        .filter(ItemCol::PurchaseId.eq(purchase.id))
        .order_by_asc(ItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(PurchaseItem::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        PurchaseWithItems {
            purchase: Purchase::from(purchase),
            items,
        },
        Some(Meta::empty()),
    ))
}

fn build_invoice_number(purchase_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let short: String = purchase_id.simple().to_string().chars().take(8).collect();
    format!("TPL-{date}-{}", short.to_uppercase())
}
