#![allow(dead_code)] // Allow unused code in this common test module

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use storefront_app::models::{InventoryItem, Sale};
use storefront_app::services::checkout::{LineItemMetadata, LineItemRequest, PriceDataRequest, ProductDataRequest};
use storefront_app::services::inventory::LookupKey;

pub const TENANT: Uuid = Uuid::nil();

pub fn inventory_item(
  name: &str,
  quantity: i64,
  unit_amount_cents: i64,
  price_id: Option<&str>,
  product_id: Option<&str>,
) -> InventoryItem {
  let now = Utc::now();
  InventoryItem {
    id: Uuid::new_v4(),
    tenant_id: TENANT,
    name: name.to_string(),
    description: None,
    category: None,
    image_urls: None,
    active: true,
    currency: "usd".to_string(),
    unit_amount_cents,
    quantity,
    restock_threshold: None,
    discount_percent: None,
    sale_price_cents: None,
    collection: None,
    provider_price_id: price_id.map(str::to_string),
    provider_product_id: product_id.map(str::to_string),
    created_at: now,
    updated_at: now,
  }
}

/// Builds the lookup map the same dual-keyed way the inventory service does.
pub fn inventory_map(rows: Vec<InventoryItem>) -> HashMap<LookupKey, InventoryItem> {
  let mut map = HashMap::new();
  for row in rows {
    if let Some(price_id) = row.provider_price_id.clone() {
      map.insert(LookupKey::Price(price_id), row.clone());
    }
    if let Some(product_id) = row.provider_product_id.clone() {
      map.insert(LookupKey::Product(product_id), row);
    }
  }
  map
}

pub fn price_line(price_id: &str, quantity: i64) -> LineItemRequest {
  LineItemRequest {
    price: Some(price_id.to_string()),
    price_data: None,
    quantity: Some(quantity),
  }
}

pub fn inline_line(
  name: &str,
  unit_amount: i64,
  quantity: i64,
  price_id: Option<&str>,
  product_id: Option<&str>,
) -> LineItemRequest {
  LineItemRequest {
    price: None,
    price_data: Some(PriceDataRequest {
      currency: Some("USD".to_string()),
      unit_amount: Some(unit_amount),
      product_data: Some(ProductDataRequest {
        name: Some(name.to_string()),
        images: None,
        metadata: Some(LineItemMetadata {
          price_id: price_id.map(str::to_string),
          product_id: product_id.map(str::to_string),
          source: None,
        }),
      }),
    }),
    quantity: Some(quantity),
  }
}

pub fn sale(
  session_id: &str,
  item_id: Uuid,
  qty: i64,
  total_cents: i64,
  minutes_ago: i64,
  status: Option<&str>,
) -> Sale {
  Sale {
    id: Uuid::new_v4(),
    tenant_id: TENANT,
    checkout_session_id: session_id.to_string(),
    item_id,
    qty,
    total_cents,
    status: status.map(str::to_string),
    email: Some("customer@example.com".to_string()),
    user_id: None,
    created_at: Utc::now() - Duration::minutes(minutes_ago),
  }
}

pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
  Utc::now() - Duration::minutes(minutes)
}
