use super::SmsSender;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::TwilioConfig;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Deserialize)]
struct TwilioMessage {
    sid: String,
}

#[derive(Deserialize)]
struct TwilioError {
    message: Option<String>,
}

pub struct TwilioClient {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            config,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.config.base_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

#[async_trait]
impl SmsSender for TwilioClient {
    async fn send(&self, to: &str, body: &str) -> Result<String> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", to),
                ("From", self.config.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("SMS request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<TwilioError>(&text)
                .ok()
                .and_then(|err| err.message)
                .unwrap_or(text);
            return Err(AppError::ExternalService(format!(
                "SMS provider error ({}): {}",
                status, detail
            )));
        }

        let message: TwilioMessage = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse SMS response: {}", e)))?;

        Ok(message.sid)
    }
}
