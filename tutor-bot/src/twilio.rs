//! Twilio REST client for outbound WhatsApp messages

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tutor_common::config::TwilioConfig;

use crate::format::{paginate_for_whatsapp, WHATSAPP_MESSAGE_LIMIT};
use crate::handler::mask_phone;

const USER_AGENT: &str = concat!("wa-tutor/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Channel prefix Twilio uses for WhatsApp addresses
pub const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Twilio client errors
#[derive(Debug, Error)]
pub enum TwilioError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Message body is empty")]
    EmptyBody,
}

/// Outcome of one (possibly multi-part) send
#[derive(Debug, Clone, Serialize)]
pub struct SentMessage {
    pub to: String,
    /// Twilio message SIDs, one per part, in send order
    pub sids: Vec<String>,
    /// Status reported for the last part
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

/// Add the `whatsapp:` channel prefix when absent
pub fn whatsapp_address(number: &str) -> String {
    let number = number.trim();
    if number.starts_with(WHATSAPP_PREFIX) {
        number.to_string()
    } else {
        format!("{}{}", WHATSAPP_PREFIX, number)
    }
}

/// Remove the `whatsapp:` channel prefix if present
pub fn strip_whatsapp_prefix(address: &str) -> &str {
    let address = address.trim();
    address.strip_prefix(WHATSAPP_PREFIX).unwrap_or(address).trim()
}

/// Twilio Messages API client
pub struct TwilioClient {
    http_client: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig) -> Result<Self, TwilioError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| TwilioError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    /// Send `body` to `to`, split into as many messages as needed
    ///
    /// Parts go out in order; the first failure stops the send.
    pub async fn send_message(&self, to: &str, body: &str) -> Result<SentMessage, TwilioError> {
        let pages = paginate_for_whatsapp(body, WHATSAPP_MESSAGE_LIMIT);
        if pages.is_empty() {
            return Err(TwilioError::EmptyBody);
        }

        let to_address = whatsapp_address(to);
        let from_address = whatsapp_address(&self.config.phone_number);
        let mut sent = SentMessage {
            to: to_address.clone(),
            sids: Vec::with_capacity(pages.len()),
            status: None,
        };

        for (index, page) in pages.iter().enumerate() {
            let resource = self.post_message(&from_address, &to_address, page).await?;
            tracing::debug!(
                to = %mask_phone(&to_address),
                part = index + 1,
                parts = pages.len(),
                sid = %resource.sid,
                "Message part sent"
            );
            sent.sids.push(resource.sid);
            sent.status = resource.status;
        }

        tracing::info!(
            to = %mask_phone(&to_address),
            parts = sent.sids.len(),
            "Outbound message sent"
        );

        Ok(sent)
    }

    async fn post_message(
        &self,
        from: &str,
        to: &str,
        body: &str,
    ) -> Result<MessageResource, TwilioError> {
        let form = [("From", from), ("To", to), ("Body", body)];

        let response = self
            .http_client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| TwilioError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TwilioError::Api(status.as_u16(), error_text));
        }

        response
            .json::<MessageResource>()
            .await
            .map_err(|e| TwilioError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_base: &str) -> TwilioConfig {
        TwilioConfig {
            account_sid: "AC123".to_string(),
            auth_token: "secret".to_string(),
            phone_number: "+14155238886".to_string(),
            api_base: api_base.to_string(),
        }
    }

    #[test]
    fn test_whatsapp_address_prefixes_once() {
        assert_eq!(whatsapp_address("+15550001234"), "whatsapp:+15550001234");
        assert_eq!(whatsapp_address("whatsapp:+15550001234"), "whatsapp:+15550001234");
    }

    #[test]
    fn test_strip_whatsapp_prefix() {
        assert_eq!(strip_whatsapp_prefix("whatsapp:+15550001234"), "+15550001234");
        assert_eq!(strip_whatsapp_prefix(" +15550001234 "), "+15550001234");
        assert_eq!(strip_whatsapp_prefix("whatsapp:"), "");
    }

    #[test]
    fn test_messages_url() {
        let client = TwilioClient::new(config("https://api.twilio.com/")).unwrap();
        assert_eq!(
            client.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[tokio::test]
    async fn test_empty_body_is_rejected_before_sending() {
        let client = TwilioClient::new(config("http://127.0.0.1:9")).unwrap();
        let result = client.send_message("+15550001234", "  \n ").await;
        assert!(matches!(result, Err(TwilioError::EmptyBody)));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_network_error() {
        let client = TwilioClient::new(config("http://127.0.0.1:9")).unwrap();
        let result = client.send_message("+15550001234", "hello").await;
        assert!(matches!(result, Err(TwilioError::Network(_))));
    }
}
