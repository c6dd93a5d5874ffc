use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::{auth, orders};
use crate::state::AppState;

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
pub struct ClaimRequestPayload {
  pub email: Option<String>,
  pub user_id: Option<Uuid>,
}

#[derive(Deserialize, Debug)]
pub struct OrderHistoryQuery {
  pub email: Option<String>,
  pub user_id: Option<Uuid>,
}

// --- Handler Implementations ---

/// Attaches guest sales to an account. With no account id there is nothing
/// to attach to, so the claim is a no-op rather than an error.
#[instrument(name = "handler::claim_orders", skip(app_state, req_payload))]
pub async fn claim_orders_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<ClaimRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  if payload.email.is_none() && payload.user_id.is_none() {
    return Err(AppError::Validation("email or user_id required".to_string()));
  }

  let claimed = match payload.user_id {
    Some(user_id) => {
      let email = match payload.email {
        Some(email) => Some(email),
        None => auth::find_user_email(&app_state.db_pool, user_id).await?,
      };
      match email {
        Some(email) => {
          auth::claim_guest_orders(&app_state.db_pool, app_state.config.tenant_id, &email, user_id).await?
        }
        None => {
          warn!("Claim for unknown user {} skipped.", user_id);
          0
        }
      }
    }
    None => 0,
  };

  info!("Claimed {} guest sale rows.", claimed);
  Ok(HttpResponse::Ok().json(json!({ "ok": true, "claimed": claimed })))
}

#[instrument(name = "handler::order_history", skip(app_state, query_params))]
pub async fn order_history_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<OrderHistoryQuery>,
) -> Result<HttpResponse, AppError> {
  let query = query_params.into_inner();
  if query.email.is_none() && query.user_id.is_none() {
    return Err(AppError::Validation("email or user_id required".to_string()));
  }

  let orders = orders::order_history(
    &app_state.db_pool,
    app_state.config.tenant_id,
    query.email.as_deref(),
    query.user_id,
  )
  .await?;

  info!("Returning {} orders.", orders.len());
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}
