use tracing::info;

use crate::errors::Result as AppResult;

#[derive(Debug)]
pub struct SentEmailInfo {
  pub to: String,
  pub from: String,
  pub subject: String,
  pub body_preview: String, // First N chars of body
  pub message_id: String,
}

/// Mock delivery for the magic-link email: logs the message instead of
/// talking to a real provider.
pub async fn send_magic_link_email(to: &str, from: &str, login_url: &str) -> AppResult<SentEmailInfo> {
  let subject = "Your sign-in link";
  let html_body = format!(
    "<p>Click to sign in: <a href=\"{0}\">{0}</a></p><p>The link works once and expires soon.</p>",
    login_url
  );

  info!(
    "Simulating sending email: To='{}', From='{}', Subject='{}'",
    to, from, subject
  );
  tokio::time::sleep(std::time::Duration::from_millis(20)).await; // Simulate network latency

  let body_preview = html_body.chars().take(50).collect::<String>() + "...";
  let message_id = format!("mock_email_{}", uuid::Uuid::new_v4());
  info!("Mock email sent successfully. Message ID: {}", message_id);

  Ok(SentEmailInfo {
    to: to.to_string(),
    from: from.to_string(),
    subject: subject.to_string(),
    body_preview,
    message_id,
  })
}
