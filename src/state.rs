use crate::config::AppConfig;
use crate::services::payments::PaymentGateway;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub gateway: Arc<dyn PaymentGateway>,
  pub config: Arc<AppConfig>,
}
