use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  /// Base URL the payment provider redirects back to (success/cancel pages).
  pub app_base_url: String,

  /// Tenant whose inventory and sales this storefront serves.
  pub tenant_id: Uuid,
  /// Pre-registered provider price for the flat shipping charge, if any.
  pub shipping_price_id: Option<String>,
  /// Where the mock gateway hosts its checkout pages.
  pub gateway_checkout_base_url: String,
  pub automatic_tax: bool,

  pub email_sender: String,
  pub magic_link_ttl_minutes: i64,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;
    let app_base_url = get_env("APP_BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port));

    let tenant_id = get_env("TENANT_ID")?
      .parse::<Uuid>()
      .map_err(|e| AppError::Config(format!("Invalid TENANT_ID: {}", e)))?;
    let shipping_price_id = env::var("SHIPPING_PRICE_ID").ok().filter(|v| !v.is_empty());
    let gateway_checkout_base_url =
      get_env("GATEWAY_CHECKOUT_BASE_URL").unwrap_or_else(|_| "https://checkout.example.com".to_string());
    let automatic_tax = get_env("AUTOMATIC_TAX")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid AUTOMATIC_TAX value: {}", e)))?;

    let email_sender = get_env("EMAIL_SENDER").unwrap_or_else(|_| "noreply@example.com".to_string());
    let magic_link_ttl_minutes = get_env("MAGIC_LINK_TTL_MINUTES")
      .unwrap_or_else(|_| "15".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid MAGIC_LINK_TTL_MINUTES: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      app_base_url,
      tenant_id,
      shipping_price_id,
      gateway_checkout_base_url,
      automatic_tax,
      email_sender,
      magic_link_ttl_minutes,
    })
  }
}
