use color_eyre::eyre::{eyre, Context};
use serde::{Deserialize, Serialize};
use tracing::instrument;

const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";

/// Transactional email over an HTTP API. Present only when `EMAIL_API_KEY` and `EMAIL_FROM` are set.
#[derive(Clone)]
pub struct MailerConfig {
    pub api_key: String,
    pub api_url: String,
    pub from: String,
    pub admin_email: Option<String>,
}

impl std::fmt::Debug for MailerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailerConfig")
            .field("api_url", &self.api_url)
            .field("from", &self.from)
            .field("admin_email", &self.admin_email)
            .finish_non_exhaustive()
    }
}

impl MailerConfig {
    #[instrument(name = "MailerConfig::from_env")]
    pub fn from_env() -> Option<Self> {
        let (Ok(api_key), Ok(from)) = (std::env::var("EMAIL_API_KEY"), std::env::var("EMAIL_FROM"))
        else {
            tracing::warn!("EMAIL_API_KEY or EMAIL_FROM missing, email notifications are disabled");
            return None;
        };

        Some(Self {
            api_key,
            api_url: std::env::var("EMAIL_API_URL")
                .unwrap_or_else(|_| DEFAULT_EMAIL_API_URL.to_string()),
            from,
            admin_email: std::env::var("ADMIN_EMAIL").ok(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    text: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailResponse {
    pub id: Option<String>,
}

pub struct Mailer<'a> {
    client: &'a reqwest::Client,
    config: &'a MailerConfig,
}

impl<'a> Mailer<'a> {
    pub fn new(client: &'a reqwest::Client, config: &'a MailerConfig) -> Self {
        Self { client, config }
    }

    #[instrument(skip(self, email), fields(email.to = %email.to, email.subject = %email.subject), err)]
    pub async fn send(&self, email: &Email) -> color_eyre::Result<SendEmailResponse> {
        let request = SendEmailRequest {
            from: &self.config.from,
            to: vec![email.to.as_str()],
            subject: &email.subject,
            text: &email.text,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to the email API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            return Err(eyre!("Email API returned error {}: {}", status, body));
        }

        let sent = response
            .json::<SendEmailResponse>()
            .await
            .context("Failed to parse email API response")?;
        tracing::info!(email.id = sent.id.as_deref().unwrap_or("unknown"), "Email sent");

        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_email_request_serialization() {
        let request = SendEmailRequest {
            from: "meals@example.com",
            to: vec!["admin@example.com"],
            subject: "New bug",
            text: "Something broke",
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["from"], "meals@example.com");
        assert_eq!(json["to"][0], "admin@example.com");
        assert_eq!(json["subject"], "New bug");
        assert_eq!(json["text"], "Something broke");
    }

    #[test]
    fn test_send_email_response_id_is_optional() {
        let sent: SendEmailResponse =
            serde_json::from_value(serde_json::json!({ "id": "49a3999c" })).unwrap();
        assert_eq!(sent.id.as_deref(), Some("49a3999c"));

        let sent: SendEmailResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(sent.id.is_none());
    }

    #[test]
    fn test_config_debug_hides_api_key() {
        let config = MailerConfig {
            api_key: "re_secret".to_string(),
            api_url: DEFAULT_EMAIL_API_URL.to_string(),
            from: "meals@example.com".to_string(),
            admin_email: None,
        };

        assert!(!format!("{config:?}").contains("re_secret"));
    }
}
