use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::FixedOffset;

/// Runtime settings, read from `OLRADAR_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub photo_dir: PathBuf,
    /// Base URL for photo links, without a trailing slash.
    pub public_url: String,
    /// `None` means the host's local offset.
    pub utc_offset: Option<FixedOffset>,
    pub stats_window_days: i64,
    pub seed: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = var("OLRADAR_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("OLRADAR_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("OLRADAR_PORT must be a port number")?;
        let db_path = var("OLRADAR_DB_PATH").unwrap_or_else(|| "olradar.db".into()).into();
        let photo_dir = var("OLRADAR_PHOTO_DIR").unwrap_or_else(|| "./photos".into()).into();
        let public_url = var("OLRADAR_PUBLIC_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        let utc_offset = match var("OLRADAR_UTC_OFFSET_MINUTES") {
            Some(raw) => {
                let minutes: i32 = raw
                    .parse()
                    .context("OLRADAR_UTC_OFFSET_MINUTES must be a whole number of minutes")?;
                let offset = FixedOffset::east_opt(minutes * 60)
                    .with_context(|| format!("UTC offset of {minutes} minutes is out of range"))?;
                Some(offset)
            }
            None => None,
        };

        let stats_window_days: i64 = var("OLRADAR_STATS_WINDOW_DAYS")
            .unwrap_or_else(|| "120".into())
            .parse()
            .context("OLRADAR_STATS_WINDOW_DAYS must be a number of days")?;
        if stats_window_days <= 0 {
            anyhow::bail!("OLRADAR_STATS_WINDOW_DAYS must be positive");
        }

        let seed = matches!(
            var("OLRADAR_SEED").map(|v| v.to_ascii_lowercase()).as_deref(),
            Some("1" | "true" | "yes" | "on")
        );

        Ok(Self {
            host,
            port,
            db_path,
            photo_dir,
            public_url,
            utc_offset,
            stats_window_days,
            seed,
        })
    }
}
