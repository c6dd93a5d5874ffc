//! Order history aggregation over the backend's sale rows.
//!
//! Sale rows are written out of band by the payment platform; this module
//! only reads them, groups them by checkout session and resolves item names.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{OrderLine, OrderSummary, Sale};

pub const ORDER_HISTORY_DAYS: i64 = 90;

const SALE_COLUMNS: &str =
  "id, tenant_id, checkout_session_id, item_id, qty, total_cents, status, email, user_id, created_at";

#[instrument(skip(pool))]
async fn fetch_recent_sales(
  pool: &PgPool,
  tenant_id: Uuid,
  email: Option<&str>,
  user_id: Option<Uuid>,
) -> Result<Vec<Sale>> {
  let since = Utc::now() - Duration::days(ORDER_HISTORY_DAYS);

  let rows = match (user_id, email) {
    (Some(uid), Some(em)) => {
      let query = format!(
        "SELECT {} FROM sales WHERE tenant_id = $1 AND created_at >= $2 AND (user_id = $3 OR email = $4) \
         ORDER BY created_at DESC",
        SALE_COLUMNS
      );
      sqlx::query_as::<_, Sale>(&query)
        .bind(tenant_id)
        .bind(since)
        .bind(uid)
        .bind(em)
        .fetch_all(pool)
        .await?
    }
    (Some(uid), None) => {
      let query = format!(
        "SELECT {} FROM sales WHERE tenant_id = $1 AND created_at >= $2 AND user_id = $3 \
         ORDER BY created_at DESC",
        SALE_COLUMNS
      );
      sqlx::query_as::<_, Sale>(&query)
        .bind(tenant_id)
        .bind(since)
        .bind(uid)
        .fetch_all(pool)
        .await?
    }
    (None, Some(em)) => {
      let query = format!(
        "SELECT {} FROM sales WHERE tenant_id = $1 AND created_at >= $2 AND email = $3 \
         ORDER BY created_at DESC",
        SALE_COLUMNS
      );
      sqlx::query_as::<_, Sale>(&query)
        .bind(tenant_id)
        .bind(since)
        .bind(em)
        .fetch_all(pool)
        .await?
    }
    (None, None) => {
      return Err(AppError::Validation("email or user_id required".to_string()));
    }
  };

  Ok(rows)
}

/// Batched name lookup for the order lines. Failures degrade to an empty map;
/// the aggregator falls back to a generic line name.
async fn fetch_item_names(pool: &PgPool, item_ids: &[Uuid]) -> HashMap<Uuid, String> {
  if item_ids.is_empty() {
    return HashMap::new();
  }
  match sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM inventory_items WHERE id = ANY($1)")
    .bind(item_ids.to_vec())
    .fetch_all(pool)
    .await
  {
    Ok(rows) => rows.into_iter().collect(),
    Err(e) => {
      warn!("Item name lookup failed, falling back to generic names: {}", e);
      HashMap::new()
    }
  }
}

/// Groups sale rows by checkout session: totals are summed, the earliest row
/// timestamp becomes the order's `placed_at`, and groups come back
/// newest-first.
pub fn group_sales(rows: &[Sale], names: &HashMap<Uuid, String>) -> Vec<OrderSummary> {
  let mut by_session: HashMap<String, OrderSummary> = HashMap::new();

  for row in rows {
    let entry = by_session
      .entry(row.checkout_session_id.clone())
      .or_insert_with(|| OrderSummary {
        checkout_session_id: row.checkout_session_id.clone(),
        placed_at: row.created_at,
        status: row.status.clone().unwrap_or_else(|| "completed".to_string()),
        total_cents: 0,
        lines: Vec::new(),
      });
    if row.created_at < entry.placed_at {
      entry.placed_at = row.created_at;
    }
    entry.total_cents += row.total_cents;
    entry.lines.push(OrderLine {
      name: names
        .get(&row.item_id)
        .cloned()
        .unwrap_or_else(|| "Item".to_string()),
      qty: row.qty.max(1),
    });
  }

  let mut orders: Vec<OrderSummary> = by_session.into_values().collect();
  orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
  orders
}

/// Read-only, idempotent projection of a customer's orders over the last
/// [`ORDER_HISTORY_DAYS`] days.
#[instrument(skip(pool))]
pub async fn order_history(
  pool: &PgPool,
  tenant_id: Uuid,
  email: Option<&str>,
  user_id: Option<Uuid>,
) -> Result<Vec<OrderSummary>> {
  let rows = fetch_recent_sales(pool, tenant_id, email, user_id).await?;

  let mut item_ids: Vec<Uuid> = Vec::new();
  for row in &rows {
    if !item_ids.contains(&row.item_id) {
      item_ids.push(row.item_id);
    }
  }
  let names = fetch_item_names(pool, &item_ids).await;

  Ok(group_sales(&rows, &names))
}
