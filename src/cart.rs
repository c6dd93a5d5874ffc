//! Client-side cart model.
//!
//! The browser keeps the cart in local storage; this module is the shape of
//! that state and the rules over it: clamped quantity updates, effective
//! unit pricing, totals, and conversion into the checkout request payload.
//! The server never stores a cart.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::services::checkout::{
  quote_shipping_cents, LineItemMetadata, LineItemRequest, PriceDataRequest, ProductDataRequest, CART_SOURCE,
};

/// Local-storage key for the serialized snapshot. Versioned so a format
/// change can invalidate stale carts.
pub const CART_STORAGE_KEY: &str = "storefront_cart_v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
  /// Product key: the provider product id when known, else the catalog id.
  pub id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
  /// List price snapshot taken when the line was added.
  pub unit_amount_cents: i64,
  pub currency: String,
  /// Stock known at add time; quantity updates clamp against it.
  pub available_qty: i64,
  pub quantity: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub discount_percent: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sale_price_cents: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub price_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub product_id: Option<String>,
}

impl CartLine {
  /// Unit price the provider will actually charge: percent discount applied
  /// to the list price (rounded) wins over an explicit sale price.
  pub fn effective_unit_cents(&self) -> i64 {
    if let Some(percent) = self.discount_percent {
      if percent > 0 {
        return ((self.unit_amount_cents as f64) * (1.0 - percent as f64 / 100.0)).round() as i64;
      }
    }
    if let Some(sale) = self.sale_price_cents {
      return sale;
    }
    self.unit_amount_cents
  }

  pub fn is_discounted(&self) -> bool {
    self.discount_percent.map_or(false, |p| p > 0) || self.sale_price_cents.map_or(false, |s| s > 0)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
  pub total_units: i64,
  pub subtotal_cents: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
  pub items: BTreeMap<String, CartLine>,
}

impl Cart {
  pub fn new() -> Self {
    Self::default()
  }

  /// Upserts a line, clamping its quantity into `0..=available_qty`. A clamp
  /// to zero removes the line. Returns the stored line, if any survives.
  pub fn add_or_update(&mut self, line: CartLine) -> Option<&CartLine> {
    let clamped = line.quantity.clamp(0, line.available_qty.max(0));
    if clamped == 0 {
      self.items.remove(&line.id);
      return None;
    }
    let id = line.id.clone();
    self.items.insert(id.clone(), CartLine { quantity: clamped, ..line });
    self.items.get(&id)
  }

  /// Quantity controls never go below one; removal is explicit.
  pub fn set_quantity(&mut self, id: &str, quantity: i64) {
    if let Some(line) = self.items.get_mut(id) {
      line.quantity = quantity.max(1).min(line.available_qty.max(1));
    }
  }

  pub fn remove(&mut self, id: &str) -> Option<CartLine> {
    self.items.remove(id)
  }

  pub fn clear(&mut self) {
    self.items.clear();
  }

  pub fn get(&self, id: &str) -> Option<&CartLine> {
    self.items.get(id)
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
    self.items.values()
  }

  /// Unit count and subtotal over effective unit prices; the shipping
  /// threshold preview is computed from this subtotal.
  pub fn totals(&self) -> CartTotals {
    let mut total_units = 0;
    let mut subtotal_cents = 0;
    for line in self.items.values() {
      total_units += line.quantity;
      subtotal_cents += line.effective_unit_cents() * line.quantity;
    }
    CartTotals { total_units, subtotal_cents }
  }

  /// Client-side preview of the shipping charge; the server recomputes it.
  pub fn shipping_preview_cents(&self) -> i64 {
    quote_shipping_cents(self.totals().subtotal_cents)
  }

  /// Serializes the cart for local storage.
  pub fn snapshot(&self) -> serde_json::Result<String> {
    serde_json::to_string(self)
  }

  /// Restores a cart from a local-storage snapshot. Unreadable snapshots
  /// degrade to an empty cart, never an error.
  pub fn restore(raw: &str) -> Cart {
    serde_json::from_str(raw).unwrap_or_default()
  }

  /// Builds the POST /checkout payload. Undiscounted lines with a known
  /// provider price id go out as price refs (keeps promotion codes usable);
  /// discounted lines go out as inline price_data at the effective unit
  /// amount, carrying reconciliation metadata.
  pub fn checkout_items(&self) -> Vec<LineItemRequest> {
    self
      .items
      .values()
      .map(|line| {
        let quantity = Some(line.quantity.max(1));

        if !line.is_discounted() {
          if let Some(price_id) = &line.price_id {
            return LineItemRequest {
              price: Some(price_id.clone()),
              price_data: None,
              quantity,
            };
          }
        }

        LineItemRequest {
          price: None,
          price_data: Some(PriceDataRequest {
            currency: Some(line.currency.to_lowercase()),
            unit_amount: Some(line.effective_unit_cents()),
            product_data: Some(ProductDataRequest {
              name: Some(if line.name.is_empty() { "Item".to_string() } else { line.name.clone() }),
              images: line.image_url.clone().map(|url| vec![url]),
              metadata: Some(LineItemMetadata {
                price_id: line.price_id.clone(),
                product_id: line.product_id.clone(),
                source: Some(CART_SOURCE.to_string()),
              }),
            }),
          }),
          quantity,
        }
      })
      .collect()
  }
}
