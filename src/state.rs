use std::sync::Arc;

use crate::{config::AppConfig, db::OrmConn, pricing::PromoTable, storage::Storage};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub promos: Arc<PromoTable>,
    pub storage: Storage,
}

impl AppState {
    pub fn new(orm: OrmConn, config: AppConfig) -> Self {
        let promos = PromoTable::with_codes(config.promo_codes.iter().cloned());
        let storage = Storage::new(&config.upload_dir, &config.public_base_url);
        Self {
            orm,
            config: Arc::new(config),
            promos: Arc::new(promos),
            storage,
        }
    }
}
