// Checkout request builder: oversell clamping, pricing-mode preservation and
// the shipping line.

mod common;

use common::*;
use serde_json::json;
use std::collections::HashMap;

use storefront_app::errors::AppError;
use storefront_app::services::checkout::{
  build_line_items, quote_shipping_cents, CheckoutLineItem, FREE_SHIPPING_THRESHOLD_CENTS, SHIPPING_FLAT_CENTS,
};

#[test]
fn requested_quantity_is_capped_at_available_stock() {
  let inventory = inventory_map(vec![inventory_item("Plush Axolotl", 3, 1200, Some("price_axo"), None)]);
  let items = vec![price_line("price_axo", 5)];

  let plan = build_line_items(&items, &inventory, None).expect("plan should build");

  assert_eq!(plan.line_items[0].quantity(), 3);
  assert_eq!(plan.clamp_notes.len(), 1);
  assert!(plan.clamp_notes[0].contains("Plush Axolotl"));
}

#[test]
fn zero_stock_lines_are_dropped() {
  let inventory = inventory_map(vec![
    inventory_item("Sold Out Squid", 0, 900, Some("price_squid"), None),
    inventory_item("Plush Axolotl", 10, 1200, Some("price_axo"), None),
  ]);
  let items = vec![price_line("price_squid", 2), price_line("price_axo", 1)];

  let plan = build_line_items(&items, &inventory, None).expect("plan should build");

  // Only the in-stock product line survives (plus the shipping line).
  let product_lines: Vec<_> = plan
    .line_items
    .iter()
    .filter(|li| matches!(li, CheckoutLineItem::PriceRef { price, .. } if price.starts_with("price_")))
    .collect();
  assert_eq!(product_lines.len(), 1);
  assert!(plan.clamp_notes.iter().any(|n| n.starts_with("OOS:")));
}

#[test]
fn all_out_of_stock_cart_is_rejected() {
  let inventory = inventory_map(vec![inventory_item("Sold Out Squid", 0, 900, Some("price_squid"), None)]);
  let items = vec![price_line("price_squid", 2)];

  let err = build_line_items(&items, &inventory, None).unwrap_err();
  match err {
    AppError::Validation(message) => assert_eq!(message, "No valid line items to process"),
    other => panic!("expected validation error, got {:?}", other),
  }
}

#[test]
fn unknown_items_pass_through_unclamped() {
  // No inventory row at all: the clamp silently stands down.
  let items = vec![price_line("price_unknown", 7)];

  let plan = build_line_items(&items, &HashMap::new(), None).expect("plan should build");

  assert_eq!(plan.line_items[0].quantity(), 7);
  assert!(plan.clamp_notes.is_empty());
  // An unresolved price ref contributes nothing to the shipping subtotal.
  assert_eq!(plan.subtotal_cents, 0);
  assert_eq!(plan.shipping_cents, SHIPPING_FLAT_CENTS);
}

#[test]
fn pricing_modes_are_preserved() {
  let inventory = inventory_map(vec![
    inventory_item("Plush Axolotl", 10, 1200, Some("price_axo"), Some("prod_axo")),
    inventory_item("Sale Narwhal", 10, 1500, Some("price_nar"), Some("prod_nar")),
  ]);
  let items = vec![
    price_line("price_axo", 1),
    inline_line("Sale Narwhal", 1275, 2, Some("price_nar"), Some("prod_nar")),
  ];

  let plan = build_line_items(&items, &inventory, None).expect("plan should build");

  match &plan.line_items[0] {
    CheckoutLineItem::PriceRef {
      price,
      quantity,
      adjustable_quantity,
    } => {
      assert_eq!(price, "price_axo");
      assert_eq!(*quantity, 1);
      let adjustable = adjustable_quantity.as_ref().expect("product refs are adjustable");
      assert!(adjustable.enabled);
      assert_eq!(adjustable.minimum, 1);
    }
    other => panic!("expected a price ref, got {:?}", other),
  }
  match &plan.line_items[1] {
    CheckoutLineItem::Inline { price_data, quantity } => {
      assert_eq!(price_data.currency, "usd"); // lowercased
      assert_eq!(price_data.unit_amount, 1275);
      assert_eq!(price_data.product_data.name, "Sale Narwhal");
      assert_eq!(price_data.product_data.metadata.price_id, "price_nar");
      assert_eq!(price_data.product_data.metadata.product_id, "prod_nar");
      assert_eq!(*quantity, 2);
    }
    other => panic!("expected an inline line, got {:?}", other),
  }
}

#[test]
fn subtotal_uses_list_price_for_resolved_price_refs() {
  // List price 2000 x 2 = 4000: exactly at the free-shipping threshold.
  let inventory = inventory_map(vec![inventory_item("Big Whale", 5, 2000, Some("price_whale"), None)]);
  let items = vec![price_line("price_whale", 2)];

  let plan = build_line_items(&items, &inventory, None).expect("plan should build");

  assert_eq!(plan.subtotal_cents, FREE_SHIPPING_THRESHOLD_CENTS);
  assert_eq!(plan.shipping_cents, 0);
  assert_eq!(plan.line_items.len(), 1); // no shipping line at the threshold
}

#[test]
fn clamped_quantity_feeds_the_shipping_subtotal() {
  // 5 requested but only 1 in stock: the threshold math sees 1 x 2500.
  let inventory = inventory_map(vec![inventory_item("Big Whale", 1, 2500, Some("price_whale"), None)]);
  let items = vec![price_line("price_whale", 5)];

  let plan = build_line_items(&items, &inventory, None).expect("plan should build");

  assert_eq!(plan.subtotal_cents, 2500);
  assert_eq!(plan.shipping_cents, SHIPPING_FLAT_CENTS);
}

#[test]
fn below_threshold_gets_an_inline_shipping_line() {
  let inventory = inventory_map(vec![inventory_item("Tiny Crab", 10, 999, Some("price_crab"), None)]);
  let items = vec![price_line("price_crab", 1)];

  let plan = build_line_items(&items, &inventory, None).expect("plan should build");

  assert_eq!(plan.shipping_cents, SHIPPING_FLAT_CENTS);
  match plan.line_items.last().expect("shipping line appended") {
    CheckoutLineItem::Inline { price_data, quantity } => {
      assert_eq!(price_data.product_data.name, "Standard Shipping");
      assert_eq!(price_data.unit_amount, SHIPPING_FLAT_CENTS);
      assert_eq!(price_data.currency, "usd");
      assert_eq!(*quantity, 1);
    }
    other => panic!("expected an inline shipping line, got {:?}", other),
  }
}

#[test]
fn configured_shipping_price_is_used_as_a_ref() {
  let inventory = inventory_map(vec![inventory_item("Tiny Crab", 10, 999, Some("price_crab"), None)]);
  let items = vec![price_line("price_crab", 1)];

  let plan = build_line_items(&items, &inventory, Some("price_flat_shipping")).expect("plan should build");

  match plan.line_items.last().expect("shipping line appended") {
    CheckoutLineItem::PriceRef {
      price,
      quantity,
      adjustable_quantity,
    } => {
      assert_eq!(price, "price_flat_shipping");
      assert_eq!(*quantity, 1);
      assert!(adjustable_quantity.is_none());
    }
    other => panic!("expected a shipping price ref, got {:?}", other),
  }
}

#[test]
fn missing_or_non_positive_quantities_default_to_one() {
  let mut no_qty = price_line("price_unknown", 1);
  no_qty.quantity = None;
  let zero_qty = price_line("price_unknown", 0);
  let negative_qty = price_line("price_unknown", -3);

  let plan = build_line_items(&[no_qty, zero_qty, negative_qty], &HashMap::new(), None).expect("plan should build");

  let quantities: Vec<i64> = plan
    .line_items
    .iter()
    .filter(|li| matches!(li, CheckoutLineItem::PriceRef { price, .. } if price == "price_unknown"))
    .map(|li| li.quantity())
    .collect();
  assert_eq!(quantities, vec![1, 1, 1]);
}

#[test]
fn inline_lines_resolved_via_metadata_are_clamped() {
  // The inline line references the row only through its metadata product id.
  let inventory = inventory_map(vec![inventory_item("Sale Narwhal", 2, 1500, None, Some("prod_nar"))]);
  let items = vec![inline_line("Sale Narwhal", 1275, 6, None, Some("prod_nar"))];

  let plan = build_line_items(&items, &inventory, None).expect("plan should build");

  assert_eq!(plan.line_items[0].quantity(), 2);
  // Inline lines contribute their own unit amount, not the list price.
  assert_eq!(plan.subtotal_cents, 1275 * 2);
}

#[test]
fn malformed_inline_lines_are_skipped() {
  let mut broken = inline_line("Broken", 500, 1, None, None);
  if let Some(pd) = broken.price_data.as_mut() {
    pd.currency = None;
  }
  let healthy = price_line("price_unknown", 1);

  let plan = build_line_items(&[broken, healthy], &HashMap::new(), None).expect("plan should build");

  let product_lines = plan
    .line_items
    .iter()
    .filter(|li| matches!(li, CheckoutLineItem::PriceRef { price, .. } if price == "price_unknown"))
    .count();
  assert_eq!(product_lines, 1);
  assert_eq!(plan.line_items.len(), 2); // the unknown ref plus shipping
}

#[test]
fn shipping_quote_matches_the_threshold() {
  assert_eq!(quote_shipping_cents(0), SHIPPING_FLAT_CENTS);
  assert_eq!(quote_shipping_cents(3999), SHIPPING_FLAT_CENTS);
  assert_eq!(quote_shipping_cents(4000), 0);
  assert_eq!(quote_shipping_cents(25_000), 0);
}

#[test]
fn line_items_serialize_to_the_provider_wire_shape() {
  let inventory = inventory_map(vec![inventory_item("Plush Axolotl", 10, 1200, Some("price_axo"), None)]);
  let items = vec![price_line("price_axo", 2)];

  let plan = build_line_items(&items, &inventory, None).expect("plan should build");
  let wire = serde_json::to_value(&plan.line_items[0]).expect("serializable");

  assert_eq!(
    wire,
    json!({
      "price": "price_axo",
      "quantity": 2,
      "adjustable_quantity": { "enabled": true, "minimum": 1 }
    })
  );
}
