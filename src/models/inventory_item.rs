use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One row of the backend's inventory table. This service only reads it;
/// quantities are maintained by the payment platform.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InventoryItem {
  pub id: Uuid,
  pub tenant_id: Uuid,
  pub name: String,
  pub description: Option<String>,
  pub category: Option<String>,
  pub image_urls: Option<Vec<String>>,
  pub active: bool,
  pub currency: String,
  pub unit_amount_cents: i64,
  pub quantity: i64,
  pub restock_threshold: Option<i64>,
  pub discount_percent: Option<i64>,
  pub sale_price_cents: Option<i64>,
  pub collection: Option<String>,
  pub provider_price_id: Option<String>,
  pub provider_product_id: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
