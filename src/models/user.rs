use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A storefront account. Created lazily the first time a magic-link code is
/// exchanged for this email; there is no password.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
  pub id: Uuid,
  pub email: String,
  pub created_at: DateTime<Utc>,
}
