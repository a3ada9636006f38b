pub mod twilio;

use crate::domain::error::Result;
use async_trait::async_trait;

pub use twilio::TwilioClient;

#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Sends `body` to `to` and returns the provider's message id.
    async fn send(&self, to: &str, body: &str) -> Result<String>;
}
