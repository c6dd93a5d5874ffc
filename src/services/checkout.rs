//! Checkout request builder.
//!
//! Pure transformation from the cart payload to the payment provider's
//! line-item list: clamps requested quantities against live inventory, drops
//! out-of-stock lines, preserves each line's pricing mode and appends the
//! shipping charge. Session creation itself is delegated to the gateway.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{AppError, Result};
use crate::models::InventoryItem;
use crate::services::inventory::{resolve_lookup_key, LookupKey};

/// Free shipping at/above this subtotal; flat charge below it.
pub const FREE_SHIPPING_THRESHOLD_CENTS: i64 = 4000;
pub const SHIPPING_FLAT_CENTS: i64 = 499;
pub const SHIPPING_LABEL: &str = "Standard Shipping";

/// Metadata tag marking sessions and lines produced by this storefront.
pub const CART_SOURCE: &str = "storefront-cart";

// --- Request DTOs ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
  #[serde(default)]
  pub items: Vec<LineItemRequest>,
  #[serde(default, rename = "allowPromotionCodes")]
  pub allow_promotion_codes: bool,
}

/// One requested line. Exactly one of `price` (a provider-hosted price id) or
/// `price_data` (an ad-hoc price) is expected; quantity defaults to 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItemRequest {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub price: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub price_data: Option<PriceDataRequest>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub quantity: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceDataRequest {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub currency: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unit_amount: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub product_data: Option<ProductDataRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductDataRequest {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub images: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub metadata: Option<LineItemMetadata>,
}

/// Reconciliation ids a client may attach to an inline line so the clamp can
/// still locate the inventory row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItemMetadata {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub price_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub product_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source: Option<String>,
}

// --- Provider-facing line items ---

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum CheckoutLineItem {
  PriceRef {
    price: String,
    quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    adjustable_quantity: Option<AdjustableQuantity>,
  },
  Inline { price_data: InlinePriceData, quantity: i64 },
}

impl CheckoutLineItem {
  pub fn quantity(&self) -> i64 {
    match self {
      CheckoutLineItem::PriceRef { quantity, .. } => *quantity,
      CheckoutLineItem::Inline { quantity, .. } => *quantity,
    }
  }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdjustableQuantity {
  pub enabled: bool,
  pub minimum: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InlinePriceData {
  pub currency: String,
  pub unit_amount: i64,
  pub product_data: InlineProductData,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InlineProductData {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub images: Option<Vec<String>>,
  pub metadata: InlineMetadata,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InlineMetadata {
  pub price_id: String,
  pub product_id: String,
  pub source: String,
}

// --- Session parameters handed to the gateway ---

#[derive(Debug, Clone, Serialize)]
pub struct SessionParams {
  pub mode: String,
  pub line_items: Vec<CheckoutLineItem>,
  pub allow_promotion_codes: bool,
  pub success_url: String,
  pub cancel_url: String,
  pub metadata: SessionMetadata,
  pub automatic_tax: AutomaticTax,
  pub shipping_address_collection: ShippingAddressCollection,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionMetadata {
  pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AutomaticTax {
  pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShippingAddressCollection {
  pub allowed_countries: Vec<String>,
}

impl SessionParams {
  pub fn new(line_items: Vec<CheckoutLineItem>, allow_promotion_codes: bool, base_url: &str, automatic_tax: bool) -> Self {
    let base = base_url.trim_end_matches('/');
    Self {
      mode: "payment".to_string(),
      line_items,
      allow_promotion_codes,
      success_url: format!("{}/success?session_id={{CHECKOUT_SESSION_ID}}", base),
      cancel_url: format!("{}/cancel", base),
      metadata: SessionMetadata { source: CART_SOURCE.to_string() },
      automatic_tax: AutomaticTax { enabled: automatic_tax },
      shipping_address_collection: ShippingAddressCollection {
        allowed_countries: vec!["US".to_string()],
      },
    }
  }
}

// --- Builder ---

/// Product of [`build_line_items`]: the provider-ready list plus the numbers
/// the handler logs.
#[derive(Debug, Clone)]
pub struct LineItemPlan {
  pub line_items: Vec<CheckoutLineItem>,
  pub subtotal_cents: i64,
  pub shipping_cents: i64,
  pub clamp_notes: Vec<String>,
}

pub fn quote_shipping_cents(subtotal_cents: i64) -> i64 {
  if subtotal_cents >= FREE_SHIPPING_THRESHOLD_CENTS {
    0
  } else {
    SHIPPING_FLAT_CENTS
  }
}

/// Clamps every requested line against the inventory map and rebuilds the
/// provider line-item list, shipping line included.
///
/// Lines without a matching inventory row pass through unclamped; a row with
/// zero stock drops the line. Errors only when nothing survives.
pub fn build_line_items(
  items: &[LineItemRequest],
  inventory: &HashMap<LookupKey, InventoryItem>,
  shipping_price_id: Option<&str>,
) -> Result<LineItemPlan> {
  let mut line_items: Vec<CheckoutLineItem> = Vec::new();
  let mut subtotal_for_shipping: i64 = 0;
  let mut clamp_notes: Vec<String> = Vec::new();

  for raw in items {
    let requested_qty = raw.quantity.unwrap_or(1).max(1);
    let key = resolve_lookup_key(raw);
    let inv_row = key.as_ref().and_then(|k| inventory.get(k));

    let mut final_qty = requested_qty;
    if let Some(row) = inv_row {
      if row.quantity <= 0 {
        final_qty = 0; // skip OOS
        clamp_notes.push(format!("OOS: {}", row.name));
      } else if requested_qty > row.quantity {
        final_qty = row.quantity; // cap at available
        clamp_notes.push(format!("Clamped {} {} -> {}", row.name, requested_qty, final_qty));
      }
    }

    if final_qty == 0 {
      continue;
    }

    // Preserve the original pricing mode (price ref vs inline price_data).
    if let Some(price) = raw.price.as_ref().filter(|p| !p.is_empty()) {
      line_items.push(CheckoutLineItem::PriceRef {
        price: price.clone(),
        quantity: final_qty,
        adjustable_quantity: Some(AdjustableQuantity { enabled: true, minimum: 1 }),
      });
    } else if let Some(pd) = &raw.price_data {
      let (currency, unit_amount) = match (&pd.currency, pd.unit_amount) {
        (Some(c), Some(ua)) => (c.to_lowercase(), ua),
        _ => continue, // malformed inline line, nothing to forward
      };
      let product_data = pd.product_data.as_ref();
      let metadata = product_data.and_then(|p| p.metadata.as_ref());
      line_items.push(CheckoutLineItem::Inline {
        price_data: InlinePriceData {
          currency,
          unit_amount,
          product_data: InlineProductData {
            name: product_data
              .and_then(|p| p.name.clone())
              .filter(|n| !n.is_empty())
              .unwrap_or_else(|| "Item".to_string()),
            images: product_data.and_then(|p| p.images.clone()),
            metadata: InlineMetadata {
              price_id: metadata.and_then(|m| m.price_id.clone()).unwrap_or_default(),
              product_id: metadata.and_then(|m| m.product_id.clone()).unwrap_or_default(),
              source: CART_SOURCE.to_string(),
            },
          },
        },
        quantity: final_qty,
      });
    } else {
      continue;
    }

    subtotal_for_shipping += effective_line_cents_for_shipping(raw, inv_row, final_qty);
  }

  if line_items.is_empty() {
    return Err(AppError::Validation("No valid line items to process".to_string()));
  }

  let shipping_cents = quote_shipping_cents(subtotal_for_shipping);
  if shipping_cents > 0 {
    match shipping_price_id {
      // Pre-registered provider price for shipping, if configured
      Some(price_id) => line_items.push(CheckoutLineItem::PriceRef {
        price: price_id.to_string(),
        quantity: 1,
        adjustable_quantity: None,
      }),
      // Otherwise a one-off inline shipping line
      None => line_items.push(CheckoutLineItem::Inline {
        price_data: InlinePriceData {
          currency: "usd".to_string(),
          unit_amount: shipping_cents,
          product_data: InlineProductData {
            name: SHIPPING_LABEL.to_string(),
            images: None,
            metadata: InlineMetadata {
              price_id: String::new(),
              product_id: String::new(),
              source: CART_SOURCE.to_string(),
            },
          },
        },
        quantity: 1,
      }),
    }
  }

  Ok(LineItemPlan {
    line_items,
    subtotal_cents: subtotal_for_shipping,
    shipping_cents,
    clamp_notes,
  })
}

/// Contribution of one (already clamped) line to the shipping threshold
/// subtotal: list price for lines resolved against an inventory row, the
/// given unit amount for inline lines, zero otherwise.
fn effective_line_cents_for_shipping(raw: &LineItemRequest, inv_row: Option<&InventoryItem>, qty: i64) -> i64 {
  if raw.price.as_deref().is_some_and(|p| !p.is_empty()) {
    if let Some(row) = inv_row {
      return row.unit_amount_cents * qty;
    }
  }
  if let Some(pd) = &raw.price_data {
    if pd.currency.is_some() {
      if let Some(unit_amount) = pd.unit_amount {
        return unit_amount * qty;
      }
    }
  }
  0
}
