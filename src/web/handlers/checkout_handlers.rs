use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::services::checkout::{self, CheckoutRequest, SessionParams};
use crate::services::inventory;
use crate::state::AppState;

// --- Handler Implementation ---

#[instrument(
    name = "handler::create_checkout",
    skip(app_state, req_payload),
    fields(item_count = req_payload.items.len())
)]
pub async fn create_checkout_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
  let request = req_payload.into_inner();
  if request.items.is_empty() {
    return Err(AppError::Validation("Cart is empty".to_string()));
  }

  // One batched inventory fetch for every referenced id; failures inside
  // degrade to "no clamp applied".
  let (price_ids, product_ids) = inventory::gather_lookup_ids(&request.items);
  let inventory_map = inventory::fetch_inventory_rows(
    &app_state.db_pool,
    app_state.config.tenant_id,
    &price_ids,
    &product_ids,
  )
  .await;

  let plan = checkout::build_line_items(
    &request.items,
    &inventory_map,
    app_state.config.shipping_price_id.as_deref(),
  )?;
  if !plan.clamp_notes.is_empty() {
    warn!("Oversell clamp: {}", plan.clamp_notes.join("; "));
  }
  info!(
    line_count = plan.line_items.len(),
    subtotal_cents = plan.subtotal_cents,
    shipping_cents = plan.shipping_cents,
    "Checkout line items built"
  );

  let params = SessionParams::new(
    plan.line_items,
    request.allow_promotion_codes,
    &app_state.config.app_base_url,
    app_state.config.automatic_tax,
  );
  let session = app_state.gateway.create_checkout_session(params).await?;

  info!("Checkout session '{}' created", session.id);
  Ok(HttpResponse::Ok().json(json!({ "url": session.url })))
}
