//! Payment gateway seam.
//!
//! The storefront only ever needs two provider calls: create a hosted
//! checkout session and look up a product record. Both sit behind
//! [`PaymentGateway`] so handlers and tests run against the mock.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result as AppResult};
use crate::services::checkout::SessionParams;

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
  pub id: String,
  /// Hosted payment page the client is redirected to.
  pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderPrice {
  pub id: String,
  pub unit_amount: i64,
  pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderProduct {
  pub id: String,
  pub name: String,
  pub description: Option<String>,
  pub images: Vec<String>,
  pub default_price: Option<ProviderPrice>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  async fn create_checkout_session(&self, params: SessionParams) -> AppResult<CheckoutSession>;

  /// `Ok(None)` when the provider does not know the id. Callers treat errors
  /// the same way and fall back to the inventory row.
  async fn retrieve_product(&self, product_id: &str) -> AppResult<Option<ProviderProduct>>;
}

/// Stand-in for the hosted provider. Mints deterministic-looking session ids
/// and can be forced to fail so error passthrough is testable.
pub struct MockGateway {
  checkout_base_url: String,
  fail_with: Option<String>,
}

impl MockGateway {
  pub fn new(checkout_base_url: impl Into<String>) -> Self {
    Self {
      checkout_base_url: checkout_base_url.into(),
      fail_with: None,
    }
  }

  /// Every session creation fails with the given provider message.
  pub fn failing_with(checkout_base_url: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      checkout_base_url: checkout_base_url.into(),
      fail_with: Some(message.into()),
    }
  }
}

#[async_trait]
impl PaymentGateway for MockGateway {
  #[instrument(skip(self, params), fields(line_count = params.line_items.len()))]
  async fn create_checkout_session(&self, params: SessionParams) -> AppResult<CheckoutSession> {
    if let Some(message) = &self.fail_with {
      return Err(AppError::Gateway(message.clone()));
    }
    if params.line_items.is_empty() {
      return Err(AppError::Gateway("A checkout session needs at least one line item".to_string()));
    }
    tokio::time::sleep(std::time::Duration::from_millis(50)).await; // Simulate network latency

    let session_id = format!("cs_mock_{}", Uuid::new_v4().simple());
    let url = format!("{}/c/{}", self.checkout_base_url.trim_end_matches('/'), session_id);
    info!("Mock checkout session '{}' created", session_id);
    Ok(CheckoutSession { id: session_id, url })
  }

  async fn retrieve_product(&self, product_id: &str) -> AppResult<Option<ProviderProduct>> {
    // The mock provider keeps no catalog of its own.
    info!("Mock gateway has no product record for '{}'", product_id);
    Ok(None)
  }
}
