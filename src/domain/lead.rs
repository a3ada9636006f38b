use crate::domain::error::{AppError, Result};
use crate::domain::labels::labelled_enum;
use crate::domain::lead_category::LeadCategory;
use crate::shared::dates::deserialize_optional_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

labelled_enum!(LeadStatus {
    New => "New",
    Hot => "Hot",
    Cold => "Cold",
    Warm => "Warm",
    Lost => "Lost",
    Closed => "Closed",
    PendingApproval => "Pending Approval",
    Timepass => "Timepass",
});

labelled_enum!(DlStatus {
    G => "G",
    G1 => "G1",
    G2 => "G2",
});

labelled_enum!(LeadSource {
    WalkIn => "Walk-in",
    Instagram => "Instagram",
    Facebook => "Facebook",
    Marketplace => "Marketplace",
    Referral => "Referral",
    Ad => "Ad",
    CarGurus => "Car Gurus",
    Web => "Web",
});

labelled_enum!(PaymentPlan {
    BiWeekly => "Bi-weekly",
    Monthly => "Monthly",
    CashDeal => "Cash Deal",
});

labelled_enum!(PriorityLevel {
    High => "High",
    Medium => "Medium",
    Low => "Low",
});

/// Editor recorded when an update carries no user.
pub const SYSTEM_EDITOR: &str = "System";

pub const NO_CHANGES_MESSAGE: &str = "No changes detected, lead not updated.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditHistoryEntry {
    pub edited_at: i64,
    pub edited_by: String,
    pub changes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: i64,
    pub lead_id: String,
    #[serde(rename = "leadcategory")]
    pub category_ids: Vec<i64>,
    pub status: Option<LeadStatus>,
    pub month: NaiveDate,
    pub manager: Option<String>,
    #[serde(rename = "dlstatus")]
    pub dl_status: Option<DlStatus>,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub lead_source: Option<LeadSource>,
    pub interested_models: Vec<String>,
    pub make: Option<String>,
    pub budget: Option<f64>,
    pub credit_score: Option<f64>,
    pub down_payment_amount: Option<f64>,
    pub payment_plan: Option<PaymentPlan>,
    pub last_follow_up: Option<NaiveDate>,
    pub next_follow_up: Option<NaiveDate>,
    pub trade_in_option: bool,
    pub trade_in_vehicle_details: Option<String>,
    pub assigned_to: Option<String>,
    pub priority_level: Option<PriorityLevel>,
    pub general_comments: Option<String>,
    pub budget_from: Option<f64>,
    pub budget_to: Option<f64>,
    pub edit_history: Vec<EditHistoryEntry>,
    pub is_active: bool,
    /// Cleared when the creating user is deleted.
    pub created_by: Option<i64>,
    pub created_date: i64,
    pub updated_date: i64,
}

/// A lead with its categories resolved, as returned by single-lead lookups.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadDetail {
    #[serde(flatten)]
    pub lead: Lead,
    pub categories: Vec<LeadCategory>,
}

/// A lead ready to be inserted: everything but the storage key and the
/// minted `leadId`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub category_ids: Vec<i64>,
    pub status: Option<LeadStatus>,
    pub month: NaiveDate,
    pub manager: Option<String>,
    pub dl_status: Option<DlStatus>,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub lead_source: Option<LeadSource>,
    pub interested_models: Vec<String>,
    pub make: Option<String>,
    pub budget: Option<f64>,
    pub credit_score: Option<f64>,
    pub down_payment_amount: Option<f64>,
    pub payment_plan: Option<PaymentPlan>,
    pub last_follow_up: Option<NaiveDate>,
    pub next_follow_up: Option<NaiveDate>,
    pub trade_in_option: bool,
    pub trade_in_vehicle_details: Option<String>,
    pub assigned_to: Option<String>,
    pub priority_level: Option<PriorityLevel>,
    pub general_comments: Option<String>,
    pub budget_from: Option<f64>,
    pub budget_to: Option<f64>,
    pub created_by: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LeadInput {
    /// Category labels; resolved to ids on create.
    #[serde(default)]
    pub lead_categories: Option<Vec<String>>,
    pub status: Option<LeadStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub month: Option<NaiveDate>,
    pub manager: Option<String>,
    #[serde(rename = "dlstatus")]
    pub dl_status: Option<DlStatus>,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "phoneNumber is required"))]
    pub phone_number: String,
    #[validate(email)]
    pub email: Option<String>,
    pub lead_source: Option<LeadSource>,
    #[serde(default)]
    pub interested_models: Vec<String>,
    pub make: Option<String>,
    pub budget: Option<f64>,
    pub credit_score: Option<f64>,
    pub down_payment_amount: Option<f64>,
    pub payment_plan: Option<PaymentPlan>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub last_follow_up: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub next_follow_up: Option<NaiveDate>,
    #[serde(default)]
    pub trade_in_option: bool,
    pub trade_in_vehicle_details: Option<String>,
    pub assigned_to: Option<String>,
    pub priority_level: Option<PriorityLevel>,
    pub general_comments: Option<String>,
    pub budget_from: Option<f64>,
    pub budget_to: Option<f64>,
}

impl LeadInput {
    /// Trims the required fields so that whitespace-only values fail
    /// validation.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.phone_number = normalize_phone_number(&self.phone_number);
        self.email = non_blank(self.email);
        self
    }

    /// Builds the insertable lead once categories are resolved.
    pub fn into_new_lead(self, category_ids: Vec<i64>, created_by: i64, today: NaiveDate) -> NewLead {
        NewLead {
            category_ids,
            status: self.status,
            month: self.month.unwrap_or(today),
            manager: non_blank(self.manager),
            dl_status: self.dl_status,
            name: self.name.trim().to_string(),
            phone_number: normalize_phone_number(&self.phone_number),
            email: non_blank(self.email),
            lead_source: self.lead_source,
            interested_models: clean_models(self.interested_models),
            make: non_blank(self.make),
            budget: self.budget,
            credit_score: self.credit_score,
            down_payment_amount: self.down_payment_amount,
            payment_plan: self.payment_plan,
            last_follow_up: self.last_follow_up,
            next_follow_up: self.next_follow_up,
            trade_in_option: self.trade_in_option,
            trade_in_vehicle_details: non_blank(self.trade_in_vehicle_details),
            assigned_to: non_blank(self.assigned_to),
            priority_level: self.priority_level,
            general_comments: non_blank(self.general_comments),
            budget_from: self.budget_from,
            budget_to: self.budget_to,
            created_by,
        }
    }
}

/// Partial update of a lead. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LeadPatch {
    #[serde(default, skip_serializing)]
    pub lead_categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub month: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    #[serde(rename = "dlstatus", skip_serializing_if = "Option::is_none")]
    pub dl_status: Option<DlStatus>,
    #[validate(length(min = 1, message = "name cannot be empty"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "phoneNumber cannot be empty"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[validate(email)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_source: Option<LeadSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interested_models: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_payment_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_plan: Option<PaymentPlan>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_follow_up: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_follow_up: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_in_option: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_in_vehicle_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_level: Option<PriorityLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_from: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_to: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl LeadPatch {
    /// Applies the same normalisation as lead creation so that re-submitting
    /// an unchanged form compares equal.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|name| name.trim().to_string());
        self.phone_number = self.phone_number.as_deref().map(normalize_phone_number);
        self.email = self.email.map(|email| email.trim().to_string());
        self.interested_models = self.interested_models.map(clean_models);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LeadUpdateOutcome {
    Updated(Lead),
    Unchanged { message: &'static str },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadFilters {
    pub status: Option<LeadStatus>,
    pub manager: Option<String>,
    pub priority_level: Option<PriorityLevel>,
    pub lead_source: Option<LeadSource>,
    pub interested_models: Option<String>,
    /// Defaults to active leads only.
    pub is_active: Option<bool>,
    pub search: Option<String>,
    /// `field:asc` or `field:desc`.
    pub sort_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadSortField {
    LeadId,
    Name,
    Status,
    Month,
    Manager,
    LeadSource,
    PriorityLevel,
    Budget,
    LastFollowUp,
    NextFollowUp,
    CreatedDate,
    UpdatedDate,
}

impl LeadSortField {
    fn from_key(key: &str) -> Option<Self> {
        let field = match key {
            "leadId" => LeadSortField::LeadId,
            "name" => LeadSortField::Name,
            "status" => LeadSortField::Status,
            "month" => LeadSortField::Month,
            "manager" => LeadSortField::Manager,
            "leadSource" => LeadSortField::LeadSource,
            "priorityLevel" => LeadSortField::PriorityLevel,
            "budget" => LeadSortField::Budget,
            "lastFollowUp" => LeadSortField::LastFollowUp,
            "nextFollowUp" => LeadSortField::NextFollowUp,
            "createdDate" => LeadSortField::CreatedDate,
            "updatedDate" => LeadSortField::UpdatedDate,
            _ => return None,
        };
        Some(field)
    }

    pub fn column(self) -> &'static str {
        match self {
            LeadSortField::LeadId => "lead_id",
            LeadSortField::Name => "name",
            LeadSortField::Status => "status",
            LeadSortField::Month => "month",
            LeadSortField::Manager => "manager",
            LeadSortField::LeadSource => "lead_source",
            LeadSortField::PriorityLevel => "priority_level",
            LeadSortField::Budget => "budget",
            LeadSortField::LastFollowUp => "last_follow_up",
            LeadSortField::NextFollowUp => "next_follow_up",
            LeadSortField::CreatedDate => "created_date",
            LeadSortField::UpdatedDate => "updated_date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadSort {
    pub field: LeadSortField,
    pub descending: bool,
}

impl LeadSort {
    /// Parses `createdDate:desc`. The order defaults to ascending.
    pub fn parse(raw: &str) -> Result<Self> {
        let (key, order) = match raw.split_once(':') {
            Some((key, order)) => (key.trim(), order.trim()),
            None => (raw.trim(), "asc"),
        };
        let field = LeadSortField::from_key(key)
            .ok_or_else(|| AppError::ValidationError(format!("Cannot sort leads by '{}'", key)))?;
        Ok(Self {
            field,
            descending: order.eq_ignore_ascii_case("desc"),
        })
    }
}

/// Listing query after validation.
#[derive(Debug, Clone, Default)]
pub struct LeadQuery {
    pub status: Option<LeadStatus>,
    pub manager: Option<String>,
    pub priority_level: Option<PriorityLevel>,
    pub lead_source: Option<LeadSource>,
    pub interested_model: Option<String>,
    pub is_active: bool,
    pub search: Option<String>,
    pub sort: Option<LeadSort>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCategoryUpdate {
    pub lead_ids: Option<Vec<i64>>,
    pub categories: Option<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateResult {
    pub message: String,
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelLeadCount {
    pub model: String,
    pub total_leads: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusLeadCount {
    pub status: Option<String>,
    pub total_leads: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadDashboard {
    pub top_car_leads: Vec<ModelLeadCount>,
    pub leads_by_status: Vec<StatusLeadCount>,
    pub total_leads: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SmsRequest {
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsReceipt {
    pub lead_id: String,
    pub message_id: String,
}

pub fn normalize_phone_number(raw: &str) -> String {
    raw.trim().replace('-', "")
}

fn clean_models(models: Vec<String>) -> Vec<String> {
    models
        .into_iter()
        .map(|model| model.trim().to_string())
        .filter(|model| !model.is_empty())
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parse() {
        let sort = LeadSort::parse("createdDate:desc").unwrap();
        assert_eq!(sort.field, LeadSortField::CreatedDate);
        assert!(sort.descending);

        let sort = LeadSort::parse("name").unwrap();
        assert_eq!(sort.field.column(), "name");
        assert!(!sort.descending);

        assert!(matches!(
            LeadSort::parse("password:asc"),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_phone_number_dashes_removed() {
        assert_eq!(normalize_phone_number(" 403-555-0199 "), "4035550199");
    }

    #[test]
    fn test_input_deserializes_labels() {
        let input: LeadInput = serde_json::from_str(
            r#"{
                "name": "Jordan",
                "phoneNumber": "403-555-0199",
                "status": "Pending Approval",
                "leadSource": "Walk-in",
                "paymentPlan": "Cash Deal",
                "month": "05-03-2024",
                "interestedModels": ["Civic", " "]
            }"#,
        )
        .unwrap();
        assert_eq!(input.status, Some(LeadStatus::PendingApproval));
        assert_eq!(input.lead_source, Some(LeadSource::WalkIn));

        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let lead = input.into_new_lead(vec![], 1, today);
        assert_eq!(lead.phone_number, "4035550199");
        assert_eq!(lead.month, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(lead.interested_models, vec!["Civic".to_string()]);
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = LeadPatch {
            lead_categories: Some(vec!["VIP".to_string()]),
            status: Some(LeadStatus::Hot),
            is_active: Some(true),
            ..LeadPatch::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["status"], "Hot");
        assert_eq!(object["isActive"], true);
    }
}
