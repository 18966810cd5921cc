use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use template_store_api::{
    cart::{CartSession, CartStore, LineChange, MAX_LINE_QUANTITY},
    error::{AppError, AppResult},
    pricing::{CartLine, PromoTable},
};
use uuid::Uuid;

/// Cart rows held in memory, with a switch that makes the next write fail.
#[derive(Default)]
struct MemoryStore {
    lines: Mutex<HashMap<Uuid, Vec<CartLine>>>,
    promos: Mutex<HashMap<Uuid, String>>,
    fail_next_write: AtomicBool,
}

impl MemoryStore {
    fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    fn check_write(&self) -> AppResult<()> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(AppError::Internal(anyhow::anyhow!("store offline")));
        }
        Ok(())
    }

    fn seed(&self, user_id: Uuid, line: CartLine) {
        self.lines
            .lock()
            .unwrap()
            .entry(user_id)
            .or_default()
            .push(line);
    }

    fn remote_quantity(&self, user_id: Uuid, id: Uuid) -> Option<i32> {
        self.lines
            .lock()
            .unwrap()
            .get(&user_id)
            .and_then(|lines| lines.iter().find(|l| l.id == id))
            .map(|l| l.quantity)
    }
}

impl CartStore for MemoryStore {
    async fn fetch_lines(&self, user_id: Uuid) -> AppResult<Vec<CartLine>> {
        Ok(self
            .lines
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn upsert_line(&self, user_id: Uuid, line: &CartLine) -> AppResult<()> {
        self.check_write()?;
        let mut lines = self.lines.lock().unwrap();
        let lines = lines.entry(user_id).or_default();
        match lines.iter_mut().find(|l| l.id == line.id) {
            Some(existing) => *existing = line.clone(),
            None => lines.push(line.clone()),
        }
        Ok(())
    }

    async fn delete_line(&self, user_id: Uuid, product_id: Uuid) -> AppResult<()> {
        self.check_write()?;
        if let Some(lines) = self.lines.lock().unwrap().get_mut(&user_id) {
            lines.retain(|l| l.id != product_id);
        }
        Ok(())
    }

    async fn clear_lines(&self, user_id: Uuid) -> AppResult<()> {
        self.check_write()?;
        self.lines.lock().unwrap().remove(&user_id);
        Ok(())
    }

    async fn load_promo(&self, user_id: Uuid) -> AppResult<Option<String>> {
        Ok(self.promos.lock().unwrap().get(&user_id).cloned())
    }

    async fn save_promo(&self, user_id: Uuid, code: Option<&str>) -> AppResult<()> {
        self.check_write()?;
        let mut promos = self.promos.lock().unwrap();
        match code {
            Some(code) => promos.insert(user_id, code.to_string()),
            None => promos.remove(&user_id),
        };
        Ok(())
    }
}

fn template_line(price: i64) -> CartLine {
    CartLine {
        id: Uuid::new_v4(),
        title: "Corporate Pro".into(),
        unit_price: price,
        discounted_unit_price: None,
        quantity: 1,
        product_type: Some("website".into()),
        is_bundle: Some(false),
    }
}

#[tokio::test]
async fn adding_existing_product_increments_instead_of_duplicating() -> anyhow::Result<()> {
    let store = MemoryStore::default();
    let promos = PromoTable::default();
    let user = Uuid::new_v4();
    let line = template_line(4900);

    let mut session = CartSession::load(&store, &promos, user).await?;
    assert_eq!(session.add(line.clone()).await?, 1);
    assert_eq!(session.add(line.clone()).await?, 2);

    assert_eq!(session.cart().lines().len(), 1);
    assert_eq!(session.summary().item_count, 2);
    assert_eq!(store.remote_quantity(user, line.id), Some(2));
    Ok(())
}

#[tokio::test]
async fn decrement_at_one_removes_the_line() -> anyhow::Result<()> {
    let store = MemoryStore::default();
    let promos = PromoTable::default();
    let user = Uuid::new_v4();
    let line = template_line(2500);

    let mut session = CartSession::load(&store, &promos, user).await?;
    session.add(line.clone()).await?;
    assert_eq!(session.increment(line.id).await?, LineChange::Quantity(2));
    assert_eq!(session.decrement(line.id).await?, LineChange::Quantity(1));
    assert_eq!(session.decrement(line.id).await?, LineChange::Removed);

    assert!(session.cart().is_empty());
    assert_eq!(store.remote_quantity(user, line.id), None);
    Ok(())
}

#[tokio::test]
async fn quantity_below_one_is_a_removal() -> anyhow::Result<()> {
    let store = MemoryStore::default();
    let promos = PromoTable::default();
    let user = Uuid::new_v4();
    let line = template_line(2500);

    let mut session = CartSession::load(&store, &promos, user).await?;
    session.add(line.clone()).await?;
    assert_eq!(session.update_quantity(line.id, 0).await?, LineChange::Removed);
    assert!(session.cart().line(line.id).is_none());
    Ok(())
}

#[tokio::test]
async fn quantity_above_limit_is_rejected() -> anyhow::Result<()> {
    let store = MemoryStore::default();
    let promos = PromoTable::default();
    let user = Uuid::new_v4();
    let line = template_line(2500);

    let mut session = CartSession::load(&store, &promos, user).await?;
    session.add(line.clone()).await?;
    let err = session
        .update_quantity(line.id, MAX_LINE_QUANTITY + 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(session.cart().line(line.id).map(|l| l.quantity), Some(1));
    Ok(())
}

#[tokio::test]
async fn unknown_line_is_not_found() -> anyhow::Result<()> {
    let store = MemoryStore::default();
    let promos = PromoTable::default();
    let mut session = CartSession::load(&store, &promos, Uuid::new_v4()).await?;

    assert!(matches!(
        session.increment(Uuid::new_v4()).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        session.remove(Uuid::new_v4()).await,
        Err(AppError::NotFound)
    ));
    Ok(())
}

#[tokio::test]
async fn failed_write_resyncs_from_store() -> anyhow::Result<()> {
    let store = MemoryStore::default();
    let promos = PromoTable::default();
    let user = Uuid::new_v4();
    let line = template_line(4900);
    store.seed(user, CartLine { quantity: 3, ..line.clone() });

    let mut session = CartSession::load(&store, &promos, user).await?;
    store.fail_next_write();
    let result = session.increment(line.id).await;

    assert!(matches!(result, Err(AppError::Internal(_))));
    assert_eq!(session.cart().line(line.id).map(|l| l.quantity), Some(3));
    assert_eq!(store.remote_quantity(user, line.id), Some(3));
    Ok(())
}

#[tokio::test]
async fn failed_clear_restores_remote_lines() -> anyhow::Result<()> {
    let store = MemoryStore::default();
    let promos = PromoTable::default();
    let user = Uuid::new_v4();
    store.seed(user, template_line(1000));
    store.seed(user, template_line(2000));

    let mut session = CartSession::load(&store, &promos, user).await?;
    store.fail_next_write();
    assert!(session.clear().await.is_err());
    assert_eq!(session.cart().lines().len(), 2);

    session.clear().await?;
    assert!(session.cart().is_empty());
    Ok(())
}

#[tokio::test]
async fn promo_is_persisted_and_invalid_codes_change_nothing() -> anyhow::Result<()> {
    let store = MemoryStore::default();
    let promos = PromoTable::default();
    let user = Uuid::new_v4();
    store.seed(user, template_line(10_000));

    let mut session = CartSession::load(&store, &promos, user).await?;
    let applied = session.apply_promo("SAVE20").await?;
    assert!(applied.is_valid);
    assert_eq!(applied.discount_amount, 2_000);

    let rejected = session.apply_promo("BOGUS").await?;
    assert!(!rejected.is_valid);

    let reloaded = CartSession::load(&store, &promos, user).await?;
    let summary = reloaded.summary();
    assert_eq!(summary.promo_code.as_deref(), Some("SAVE20"));
    assert_eq!(summary.grand_total, 8_000);

    session.remove_promo().await?;
    let reloaded = CartSession::load(&store, &promos, user).await?;
    assert_eq!(reloaded.summary().promo_code, None);
    Ok(())
}
