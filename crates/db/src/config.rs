//! Store configuration loaded from environment variables.

use std::path::PathBuf;

/// Storage configuration.
///
/// All fields have sensible defaults suitable for local development. In
/// production, override via environment variables.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// SQLite database URL (default: `sqlite://muster.db`).
    pub database_url: String,
    /// Directory closure snapshots are written to (default: `reports`).
    pub reports_dir: PathBuf,
}

impl StoreConfig {
    /// Load configuration from environment variables with defaults,
    /// reading a `.env` file when present.
    ///
    /// | Env Var        | Default              |
    /// |----------------|----------------------|
    /// | `DATABASE_URL` | `sqlite://muster.db` |
    /// | `REPORTS_DIR`  | `reports`            |
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://muster.db".into());

        let reports_dir = std::env::var("REPORTS_DIR")
            .unwrap_or_else(|_| "reports".into())
            .into();

        Self {
            database_url,
            reports_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_env_is_unset() {
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("REPORTS_DIR");
        let config = StoreConfig::from_env();
        assert_eq!(config.database_url, "sqlite://muster.db");
        assert_eq!(config.reports_dir, PathBuf::from("reports"));
    }
}
