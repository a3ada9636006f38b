use crate::domain::error::{AppError, Result};
use crate::domain::lead::{SmsReceipt, SmsRequest};
use crate::infrastructure::db::leads::LeadRepository;
use crate::infrastructure::sms::SmsSender;
use std::sync::Arc;
use tracing::info;

pub struct SmsUseCase {
    leads: Arc<LeadRepository>,
    sender: Option<Arc<dyn SmsSender>>,
}

impl SmsUseCase {
    pub fn new(leads: Arc<LeadRepository>, sender: Option<Arc<dyn SmsSender>>) -> Self {
        Self { leads, sender }
    }

    pub async fn send_to_lead(&self, id: i64, request: SmsRequest) -> Result<SmsReceipt> {
        let lead = self.leads.get_lead(id).await?;

        let message = request.message.trim();
        if message.is_empty() {
            return Err(AppError::ValidationError("message is required".to_string()));
        }
        if lead.phone_number.trim().is_empty() {
            return Err(AppError::ValidationError(format!(
                "Lead {} has no phone number",
                lead.lead_id
            )));
        }

        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| AppError::Internal("SMS provider is not configured".to_string()))?;
        let message_id = sender.send(&lead.phone_number, message).await?;
        info!(lead_id = %lead.lead_id, message_id = %message_id, "SMS sent to lead");

        Ok(SmsReceipt {
            lead_id: lead.lead_id,
            message_id,
        })
    }
}
