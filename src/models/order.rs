use chrono::{DateTime, Utc};
use serde::Serialize;

/// Read-only projection over the sale rows of one checkout session. Never
/// persisted; assembled per request by the order history aggregator.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
  pub checkout_session_id: String,
  pub placed_at: DateTime<Utc>,
  pub status: String,
  pub total_cents: i64,
  pub lines: Vec<OrderLine>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OrderLine {
  pub name: String,
  pub qty: i64,
}
