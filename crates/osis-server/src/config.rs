use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub upload_dir: PathBuf,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = get("OSIS_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("OSIS_JWT_SECRET is unset or still a placeholder; it must match the login service's secret");
        }

        let port = match get("OSIS_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("OSIS_PORT is not a valid port: {raw}"))?,
            None => 3000,
        };

        Ok(Self {
            host: get("OSIS_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: get("OSIS_DB_PATH").unwrap_or_else(|| "osis.db".into()).into(),
            upload_dir: get("OSIS_UPLOAD_DIR")
                .unwrap_or_else(|| "./uploads/images".into())
                .into(),
            jwt_secret,
        })
    }
}
