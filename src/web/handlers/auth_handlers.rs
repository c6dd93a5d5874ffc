use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::{auth, email};
use crate::state::AppState;

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
pub struct MagicLinkRequestPayload {
  pub email: String,
}

#[derive(Deserialize, Debug)]
pub struct AuthCallbackQuery {
  pub code: Option<String>,
}

// --- Handler Implementations ---

#[instrument(
    name = "handler::request_magic_link",
    skip(app_state, req_payload),
    fields(req_email = %req_payload.email)
)]
pub async fn request_magic_link_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<MagicLinkRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();

  let issued = auth::issue_login_token(
    &app_state.db_pool,
    &payload.email,
    app_state.config.magic_link_ttl_minutes,
  )
  .await?;

  let login_url = format!(
    "{}/api/v1/auth/callback?code={}",
    app_state.config.app_base_url.trim_end_matches('/'),
    issued.code
  );
  email::send_magic_link_email(&payload.email, &app_state.config.email_sender, &login_url).await?;

  info!("Magic link issued, token {} expires at {}.", issued.token_id, issued.expires_at);
  Ok(HttpResponse::Ok().json(json!({
      "ok": true,
      "message": "Magic link sent! Check your email."
  })))
}

#[instrument(name = "handler::auth_callback", skip(app_state, query_params))]
pub async fn auth_callback_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<AuthCallbackQuery>,
) -> Result<HttpResponse, AppError> {
  let code = query_params
    .into_inner()
    .code
    .filter(|c| !c.is_empty())
    .ok_or_else(|| AppError::Validation("code required".to_string()))?;

  let session = auth::exchange_login_code(&app_state.db_pool, &code).await?;

  info!("Login code exchanged for user {}.", session.user_id);
  Ok(HttpResponse::Ok().json(json!({
      "user_id": session.user_id,
      "email": session.email,
      "session_token": session.session_token,
      "expires_at": session.expires_at,
  })))
}
