//! Batched inventory lookup backing the oversell clamp.
//!
//! Lookup failures never fail a checkout: the map just comes back without the
//! affected rows and those lines pass through unclamped.

use sqlx::PgPool;
use std::collections::HashMap;
use std::fmt;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::models::InventoryItem;
use crate::services::checkout::LineItemRequest;

/// How a requested line locates its inventory row: by provider price id or by
/// provider product id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupKey {
  Price(String),
  Product(String),
}

impl fmt::Display for LookupKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LookupKey::Price(id) => write!(f, "price:{}", id),
      LookupKey::Product(id) => write!(f, "prod:{}", id),
    }
  }
}

/// Price ref wins, then the metadata price id, then the metadata product id.
pub fn resolve_lookup_key(item: &LineItemRequest) -> Option<LookupKey> {
  if let Some(price) = item.price.as_ref().filter(|p| !p.is_empty()) {
    return Some(LookupKey::Price(price.clone()));
  }
  let metadata = item
    .price_data
    .as_ref()?
    .product_data
    .as_ref()?
    .metadata
    .as_ref()?;
  if let Some(id) = metadata.price_id.as_ref().filter(|s| !s.is_empty()) {
    return Some(LookupKey::Price(id.clone()));
  }
  if let Some(id) = metadata.product_id.as_ref().filter(|s| !s.is_empty()) {
    return Some(LookupKey::Product(id.clone()));
  }
  None
}

/// Collects the provider price/product ids referenced by a request, each
/// family deduplicated, for one batched fetch.
pub fn gather_lookup_ids(items: &[LineItemRequest]) -> (Vec<String>, Vec<String>) {
  let mut price_ids: Vec<String> = Vec::new();
  let mut product_ids: Vec<String> = Vec::new();

  let mut push_unique = |list: &mut Vec<String>, id: &str| {
    if !id.is_empty() && !list.iter().any(|existing| existing == id) {
      list.push(id.to_string());
    }
  };

  for item in items {
    if let Some(price) = &item.price {
      push_unique(&mut price_ids, price);
    }
    let metadata = item
      .price_data
      .as_ref()
      .and_then(|pd| pd.product_data.as_ref())
      .and_then(|p| p.metadata.as_ref());
    if let Some(md) = metadata {
      if let Some(id) = &md.price_id {
        push_unique(&mut price_ids, id);
      }
      if let Some(id) = &md.product_id {
        push_unique(&mut product_ids, id);
      }
    }
  }

  (price_ids, product_ids)
}

const INVENTORY_COLUMNS: &str = "id, tenant_id, name, description, category, image_urls, active, currency, \
   unit_amount_cents, quantity, restock_threshold, discount_percent, sale_price_cents, collection, \
   provider_price_id, provider_product_id, created_at, updated_at";

/// Fetches the inventory rows matching the given ids, one query per id
/// family, merged into a map keyed both ways so either reference style finds
/// its row. Query errors are logged and the affected family is skipped.
#[instrument(skip(pool, price_ids, product_ids), fields(price_ids = price_ids.len(), product_ids = product_ids.len()))]
pub async fn fetch_inventory_rows(
  pool: &PgPool,
  tenant_id: Uuid,
  price_ids: &[String],
  product_ids: &[String],
) -> HashMap<LookupKey, InventoryItem> {
  let mut map: HashMap<LookupKey, InventoryItem> = HashMap::new();

  if !price_ids.is_empty() {
    let query = format!(
      "SELECT {} FROM inventory_items WHERE tenant_id = $1 AND provider_price_id = ANY($2)",
      INVENTORY_COLUMNS
    );
    match sqlx::query_as::<_, InventoryItem>(&query)
      .bind(tenant_id)
      .bind(price_ids.to_vec())
      .fetch_all(pool)
      .await
    {
      Ok(rows) => insert_rows(&mut map, rows),
      Err(e) => warn!("Inventory lookup by price ids failed, clamp skipped for them: {}", e),
    }
  }

  if !product_ids.is_empty() {
    let query = format!(
      "SELECT {} FROM inventory_items WHERE tenant_id = $1 AND provider_product_id = ANY($2)",
      INVENTORY_COLUMNS
    );
    match sqlx::query_as::<_, InventoryItem>(&query)
      .bind(tenant_id)
      .bind(product_ids.to_vec())
      .fetch_all(pool)
      .await
    {
      Ok(rows) => insert_rows(&mut map, rows),
      Err(e) => warn!("Inventory lookup by product ids failed, clamp skipped for them: {}", e),
    }
  }

  map
}

fn insert_rows(map: &mut HashMap<LookupKey, InventoryItem>, rows: Vec<InventoryItem>) {
  for row in rows {
    if let Some(price_id) = row.provider_price_id.clone() {
      map.insert(LookupKey::Price(price_id), row.clone());
    }
    if let Some(product_id) = row.provider_product_id.clone() {
      map.insert(LookupKey::Product(product_id), row);
    }
  }
}
