//! Shared handler state.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::rate_limit::RateLimits;
use crate::config::AppConfig;
use crate::error::Result;

/// Cloned into every handler; all fields are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub limits: Arc<RateLimits>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Result<Self> {
        let limits = RateLimits::from_config(&config.rate_limit)?;
        Ok(Self {
            db,
            config: Arc::new(config),
            limits: Arc::new(limits),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_db;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_bad_rate_limit_is_config_error() {
        let mut config = AppConfig::default();
        config.rate_limit.login = "5/fortnight".to_string();

        let err = AppState::new(memory_db().await, config).err().unwrap();
        assert!(matches!(err, AppError::Config(_)));
    }
}
