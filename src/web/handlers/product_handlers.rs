use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::errors::AppError;
use crate::models::InventoryItem;
use crate::state::AppState;

const PRODUCT_LIST_LIMIT: i64 = 20;

const INVENTORY_COLUMNS: &str = "id, tenant_id, name, description, category, image_urls, active, currency, \
   unit_amount_cents, quantity, restock_threshold, discount_percent, sale_price_cents, collection, \
   provider_price_id, provider_product_id, created_at, updated_at";

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let query = format!(
    "SELECT {} FROM inventory_items WHERE tenant_id = $1 AND active = TRUE ORDER BY name ASC LIMIT $2",
    INVENTORY_COLUMNS
  );
  let products: Vec<InventoryItem> = sqlx::query_as(&query)
    .bind(app_state.config.tenant_id)
    .bind(PRODUCT_LIST_LIMIT)
    .fetch_all(&app_state.db_pool)
    .await
    .map_err(|e| {
      error!("Failed to fetch products from database: {}", e);
      AppError::Sqlx(e)
    })?;

  info!("Successfully fetched {} products.", products.len());

  Ok(HttpResponse::Ok().json(json!({
      "message": "Products fetched successfully.",
      "products": products
  })))
}

/// Product detail is a merge: the provider's record when it knows the id,
/// the inventory row otherwise, field by field.
#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();

  let provider_product = match app_state.gateway.retrieve_product(&product_id).await {
    Ok(found) => found,
    Err(e) => {
      // Provider lookups degrade to the inventory row alone.
      warn!("Gateway product lookup failed for '{}': {}", product_id, e);
      None
    }
  };

  let query = format!(
    "SELECT {} FROM inventory_items WHERE tenant_id = $1 AND provider_product_id = $2 LIMIT 1",
    INVENTORY_COLUMNS
  );
  let inventory_row: Option<InventoryItem> = match sqlx::query_as(&query)
    .bind(app_state.config.tenant_id)
    .bind(&product_id)
    .fetch_optional(&app_state.db_pool)
    .await
  {
    Ok(row) => row,
    Err(e) => {
      warn!("Inventory lookup failed for product '{}': {}", product_id, e);
      None
    }
  };

  if provider_product.is_none() && inventory_row.is_none() {
    return Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)));
  }

  let provider_price = provider_product.as_ref().and_then(|p| p.default_price.as_ref());

  let name = provider_product
    .as_ref()
    .map(|p| p.name.clone())
    .or_else(|| inventory_row.as_ref().map(|r| r.name.clone()))
    .unwrap_or_default();
  let description = provider_product
    .as_ref()
    .and_then(|p| p.description.clone())
    .or_else(|| inventory_row.as_ref().and_then(|r| r.description.clone()));
  let price_id = provider_price
    .map(|p| p.id.clone())
    .or_else(|| inventory_row.as_ref().and_then(|r| r.provider_price_id.clone()));

  let unit_amount = provider_price
    .map(|p| p.unit_amount)
    .or_else(|| inventory_row.as_ref().map(|r| r.unit_amount_cents))
    .unwrap_or(0);
  let currency = provider_price
    .map(|p| p.currency.clone())
    .or_else(|| inventory_row.as_ref().map(|r| r.currency.clone()))
    .unwrap_or_else(|| "usd".to_string());

  let images: Vec<String> = inventory_row
    .as_ref()
    .and_then(|r| r.image_urls.clone())
    .filter(|urls| !urls.is_empty())
    .or_else(|| provider_product.as_ref().map(|p| p.images.clone()))
    .unwrap_or_default();

  // Inventory quantity is the source of truth for availability.
  let available = inventory_row.as_ref().map(|r| r.quantity).unwrap_or(0);

  info!("Product '{}' detail assembled.", product_id);
  Ok(HttpResponse::Ok().json(json!({
      "product": {
          "id": product_id,
          "name": name,
          "description": description,
          "discount_percent": inventory_row.as_ref().and_then(|r| r.discount_percent),
          "sale_price_cents": inventory_row.as_ref().and_then(|r| r.sale_price_cents),
          "provider_product_id": product_id,
          "provider_price_id": price_id,
      },
      "default_price": {
          "id": price_id,
          "unit_amount": unit_amount,
          "currency": currency,
      },
      "images": images,
      "inventory": { "available": available },
  })))
}
