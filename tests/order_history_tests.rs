// Order history aggregation: grouping sale rows by checkout session.

mod common;

use common::*;
use std::collections::HashMap;
use uuid::Uuid;

use storefront_app::services::orders::group_sales;

#[test]
fn rows_sharing_a_session_become_one_order_with_a_summed_total() {
  let axolotl = Uuid::new_v4();
  let narwhal = Uuid::new_v4();
  let rows = vec![
    sale("cs_100", axolotl, 2, 2400, 30, Some("completed")),
    sale("cs_100", narwhal, 1, 1500, 29, Some("completed")),
  ];
  let names: HashMap<Uuid, String> = [
    (axolotl, "Plush Axolotl".to_string()),
    (narwhal, "Sale Narwhal".to_string()),
  ]
  .into_iter()
  .collect();

  let orders = group_sales(&rows, &names);

  assert_eq!(orders.len(), 1);
  let order = &orders[0];
  assert_eq!(order.checkout_session_id, "cs_100");
  assert_eq!(order.total_cents, 3900);
  assert_eq!(order.lines.len(), 2);
  assert_eq!(order.lines[0].name, "Plush Axolotl");
  assert_eq!(order.lines[0].qty, 2);
}

#[test]
fn orders_come_back_newest_first() {
  let item = Uuid::new_v4();
  let rows = vec![
    sale("cs_old", item, 1, 500, 120, None),
    sale("cs_new", item, 1, 700, 5, None),
    sale("cs_mid", item, 1, 600, 60, None),
  ];

  let orders = group_sales(&rows, &HashMap::new());

  let sessions: Vec<&str> = orders.iter().map(|o| o.checkout_session_id.as_str()).collect();
  assert_eq!(sessions, vec!["cs_new", "cs_mid", "cs_old"]);
}

#[test]
fn placed_at_is_the_earliest_row_of_the_group() {
  let item = Uuid::new_v4();
  let earliest = sale("cs_100", item, 1, 500, 45, None);
  let expected = earliest.created_at;
  let rows = vec![sale("cs_100", item, 1, 500, 10, None), earliest];

  let orders = group_sales(&rows, &HashMap::new());

  assert_eq!(orders[0].placed_at, expected);
}

#[test]
fn unknown_items_and_missing_fields_fall_back() {
  let item = Uuid::new_v4();
  // No name entry, no status, qty 0 on the row.
  let rows = vec![sale("cs_100", item, 0, 500, 10, None)];

  let orders = group_sales(&rows, &HashMap::new());

  assert_eq!(orders[0].status, "completed");
  assert_eq!(orders[0].lines[0].name, "Item");
  assert_eq!(orders[0].lines[0].qty, 1);
}

#[test]
fn no_rows_means_no_orders() {
  assert!(group_sales(&[], &HashMap::new()).is_empty());
}
