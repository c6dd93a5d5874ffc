use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A completed sale line written by the payment platform after a checkout
/// session settles. Several rows share one `checkout_session_id`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Sale {
  pub id: Uuid,
  pub tenant_id: Uuid,
  pub checkout_session_id: String,
  pub item_id: Uuid,
  pub qty: i64,
  pub total_cents: i64,
  pub status: Option<String>,
  pub email: Option<String>,
  pub user_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
}
