use std::env;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub upload_dir: String,
    pub public_base_url: String,
    pub max_upload_bytes: usize,
    /// Extra promo codes on top of the built-in ones, as `(code, percent)`.
    pub promo_codes: Vec<(String, u8)>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();
        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10 * 1024 * 1024);
        let promo_codes = match env::var("PROMO_CODES") {
            Ok(raw) => parse_promo_codes(&raw)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            upload_dir,
            public_base_url,
            max_upload_bytes,
            promo_codes,
        })
    }
}

/// Parses `CODE:PERCENT,CODE:PERCENT`. Percentages must be within 1..=100.
pub fn parse_promo_codes(raw: &str) -> anyhow::Result<Vec<(String, u8)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (code, percent) = entry
                .split_once(':')
                .with_context(|| format!("promo entry `{entry}` must look like CODE:PERCENT"))?;
            let percent: u8 = percent
                .trim()
                .parse()
                .with_context(|| format!("invalid percentage in promo entry `{entry}`"))?;
            if !(1..=100).contains(&percent) {
                anyhow::bail!("promo percentage for `{}` must be within 1..=100", code.trim());
            }
            Ok((code.trim().to_string(), percent))
        })
        .collect()
}
