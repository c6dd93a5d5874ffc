//! Magic-link authentication.
//!
//! No passwords: a login is a one-time code emailed to the customer. Only the
//! argon2 hash of the code's secret half is stored, and a token dies on first
//! use or at its TTL.

use argon2::{
  password_hash::{
    rand_core::OsRng,
    PasswordHash,
    PasswordHasher,
    PasswordVerifier,
    SaltString,
  },
  Argon2,
};
use chrono::{DateTime, Duration, Utc};
use rand_core::RngCore;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::User;

/// Sessions minted on a successful exchange live this long.
const SESSION_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct IssuedLoginToken {
  pub token_id: Uuid,
  /// Opaque `<token_id>.<secret>` value embedded in the emailed link.
  pub code: String,
  pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SessionInfo {
  pub user_id: Uuid,
  pub email: String,
  pub session_token: String,
  pub expires_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct LoginTokenRow {
  id: Uuid,
  email: String,
  token_hash: String,
  expires_at: DateTime<Utc>,
  consumed_at: Option<DateTime<Utc>>,
}

fn generate_secret() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hashes a login-token secret with Argon2 for at-rest storage.
#[instrument(name = "auth::hash_login_token", skip(secret), err(Display))]
pub fn hash_login_token(secret: &str) -> Result<String> {
  if secret.is_empty() {
    return Err(AppError::Validation("Login token secret cannot be empty.".to_string()));
  }
  let salt = SaltString::generate(&mut OsRng);
  match Argon2::default().hash_password(secret.as_bytes(), &salt) {
    Ok(hash) => Ok(hash.to_string()),
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 token hashing failed.");
      Err(AppError::Internal(format!("Token hashing process failed: {}", argon_err)))
    }
  }
}

/// Verifies a presented secret against a stored Argon2 hash.
#[instrument(name = "auth::verify_login_token", skip(stored_hash, secret))]
pub fn verify_login_token(stored_hash: &str, secret: &str) -> Result<bool> {
  if stored_hash.is_empty() || secret.is_empty() {
    return Err(AppError::Auth("Invalid login token.".to_string()));
  }
  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored token hash.");
    AppError::Internal(format!("Invalid stored token hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(secret.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Login token verification failed: secret does not match.");
      Ok(false)
    }
    Err(other) => Err(AppError::Internal(format!(
      "Token verification process failed: {}",
      other
    ))),
  }
}

/// Creates a one-time login token for the email and returns the code to
/// embed in the magic link. The plain secret never touches the database.
#[instrument(skip(pool))]
pub async fn issue_login_token(pool: &PgPool, email: &str, ttl_minutes: i64) -> Result<IssuedLoginToken> {
  let email = email.trim().to_lowercase();
  if email.is_empty() || !email.contains('@') {
    return Err(AppError::Validation("A valid email address is required.".to_string()));
  }

  let secret = generate_secret();
  let token_hash = hash_login_token(&secret)?;
  let token_id = Uuid::new_v4();
  let expires_at = Utc::now() + Duration::minutes(ttl_minutes);

  sqlx::query("INSERT INTO login_tokens (id, email, token_hash, expires_at) VALUES ($1, $2, $3, $4)")
    .bind(token_id)
    .bind(&email)
    .bind(&token_hash)
    .bind(expires_at)
    .execute(pool)
    .await?;

  debug!("Login token {} issued for {}", token_id, email);
  Ok(IssuedLoginToken {
    token_id,
    code: format!("{}.{}", token_id.simple(), secret),
    expires_at,
  })
}

/// Exchanges a magic-link code for a session. The token is consumed on
/// success; consumed, expired and mismatched codes are all rejected the same
/// way.
#[instrument(skip(pool, code))]
pub async fn exchange_login_code(pool: &PgPool, code: &str) -> Result<SessionInfo> {
  let (id_part, secret) = code
    .split_once('.')
    .ok_or_else(|| AppError::Auth("Malformed login code.".to_string()))?;
  let token_id = Uuid::parse_str(id_part).map_err(|_| AppError::Auth("Malformed login code.".to_string()))?;

  let row: Option<LoginTokenRow> =
    sqlx::query_as("SELECT id, email, token_hash, expires_at, consumed_at FROM login_tokens WHERE id = $1")
      .bind(token_id)
      .fetch_optional(pool)
      .await?;
  let row = row.ok_or_else(|| AppError::Auth("Unknown login code.".to_string()))?;

  if row.consumed_at.is_some() {
    return Err(AppError::Auth("This login link was already used.".to_string()));
  }
  if row.expires_at < Utc::now() {
    return Err(AppError::Auth("This login link has expired.".to_string()));
  }
  if !verify_login_token(&row.token_hash, secret)? {
    return Err(AppError::Auth("Invalid login code.".to_string()));
  }

  sqlx::query("UPDATE login_tokens SET consumed_at = NOW() WHERE id = $1")
    .bind(row.id)
    .execute(pool)
    .await?;

  let user = upsert_user(pool, &row.email).await?;

  let session_token = format!("sess_{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
  let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);
  sqlx::query("INSERT INTO sessions (id, user_id, token, expires_at) VALUES ($1, $2, $3, $4)")
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(&session_token)
    .bind(expires_at)
    .execute(pool)
    .await?;

  Ok(SessionInfo {
    user_id: user.id,
    email: user.email,
    session_token,
    expires_at,
  })
}

async fn upsert_user(pool: &PgPool, email: &str) -> Result<User> {
  let user: User = sqlx::query_as(
    "INSERT INTO users (id, email) VALUES ($1, $2) \
     ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email \
     RETURNING id, email, created_at",
  )
  .bind(Uuid::new_v4())
  .bind(email)
  .fetch_one(pool)
  .await?;
  Ok(user)
}

/// Looks up the account email for a user id, for claims that only carry the
/// id.
pub async fn find_user_email(pool: &PgPool, user_id: Uuid) -> Result<Option<String>> {
  let email: Option<String> = sqlx::query_scalar("SELECT email FROM users WHERE id = $1")
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
  Ok(email)
}

/// Attaches guest sales (matching email, no owner yet) to the account.
/// Returns how many rows were claimed.
#[instrument(skip(pool))]
pub async fn claim_guest_orders(pool: &PgPool, tenant_id: Uuid, email: &str, user_id: Uuid) -> Result<u64> {
  let result = sqlx::query("UPDATE sales SET user_id = $1 WHERE tenant_id = $2 AND email = $3 AND user_id IS NULL")
    .bind(user_id)
    .bind(tenant_id)
    .bind(email)
    .execute(pool)
    .await?;
  Ok(result.rows_affected())
}
