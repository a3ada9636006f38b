use super::bulk_import::import_rows;
use super::lead_import::{LeadImporter, LeadRowMapper};
use crate::domain::error::{AppError, Result};
use crate::domain::import::{ImportReport, RawRow};
use crate::domain::lead::{
    BulkCategoryUpdate, BulkUpdateResult, DashboardQuery, EditHistoryEntry, Lead, LeadDashboard,
    LeadDetail, LeadFilters, LeadInput, LeadPatch, LeadQuery, LeadSort, LeadUpdateOutcome,
    NO_CHANGES_MESSAGE, SYSTEM_EDITOR,
};
use crate::domain::sequence::SequenceKind;
use crate::domain::user::User;
use crate::infrastructure::config::ImportConfig;
use crate::infrastructure::db::counters::SequenceCounter;
use crate::infrastructure::db::lead_categories::LeadCategoryRepository;
use crate::infrastructure::db::leads::LeadRepository;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

pub struct LeadUseCase {
    leads: Arc<LeadRepository>,
    categories: Arc<LeadCategoryRepository>,
    counter: Arc<dyn SequenceCounter>,
    import: ImportConfig,
}

impl LeadUseCase {
    pub fn new(
        leads: Arc<LeadRepository>,
        categories: Arc<LeadCategoryRepository>,
        counter: Arc<dyn SequenceCounter>,
        import: ImportConfig,
    ) -> Self {
        Self {
            leads,
            categories,
            counter,
            import,
        }
    }

    pub async fn create_lead(&self, input: LeadInput, creator: &User) -> Result<Lead> {
        let input = input.normalized();
        input.validate()?;
        let category_ids = match &input.lead_categories {
            Some(labels) => self.resolve_category_labels(labels).await?,
            None => Vec::new(),
        };

        let today = chrono::Local::now().date_naive();
        let new_lead = input.into_new_lead(category_ids, creator.id, today);
        let lead_id = self.counter.next_id(SequenceKind::Lead).await?;
        let now = chrono::Utc::now().timestamp_millis();

        let lead = self.leads.insert_lead(&lead_id, &new_lead, now).await?;
        info!(lead_id = %lead.lead_id, created_by = creator.id, "Lead created");
        Ok(lead)
    }

    pub async fn list_leads(&self, filters: LeadFilters) -> Result<Vec<Lead>> {
        let sort = filters
            .sort_by
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(LeadSort::parse)
            .transpose()?;

        let query = LeadQuery {
            status: filters.status,
            manager: non_empty(filters.manager),
            priority_level: filters.priority_level,
            lead_source: filters.lead_source,
            interested_model: non_empty(filters.interested_models),
            is_active: filters.is_active.unwrap_or(true),
            search: non_empty(filters.search),
            sort,
        };
        self.leads.list_leads(&query).await
    }

    pub async fn get_lead(&self, id: i64) -> Result<LeadDetail> {
        let lead = self.leads.get_lead(id).await?;
        let categories = self.categories.find_by_ids(&lead.category_ids).await?;
        Ok(LeadDetail { lead, categories })
    }

    /// Applies `patch` and records the changed fields in the edit history.
    /// Nothing is written when the patch matches the stored lead.
    pub async fn update_lead(
        &self,
        id: i64,
        patch: LeadPatch,
        editor: Option<&User>,
    ) -> Result<LeadUpdateOutcome> {
        let patch = patch.normalized();
        patch.validate()?;
        let existing = self.leads.get_lead(id).await?;

        let current = to_object(&existing)?;
        let incoming = to_object(&patch)?;
        let mut changes: BTreeMap<String, String> = incoming
            .iter()
            .filter(|(field, value)| current.get(*field) != Some(*value))
            .map(|(field, value)| (field.clone(), change_text(value)))
            .collect();

        let mut category_ids = existing.category_ids.clone();
        if let Some(labels) = &patch.lead_categories {
            let wanted = self.resolve_category_labels(labels).await?;
            if wanted != existing.category_ids {
                changes.insert("leadcategory".to_string(), labels.join(", "));
                category_ids = wanted;
            }
        }

        if changes.is_empty() {
            return Ok(LeadUpdateOutcome::Unchanged {
                message: NO_CHANGES_MESSAGE,
            });
        }

        let mut merged = current;
        merged.extend(incoming);
        let mut updated: Lead = serde_json::from_value(Value::Object(merged))
            .map_err(|e| AppError::ValidationError(format!("Invalid lead update: {}", e)))?;

        let now = chrono::Utc::now().timestamp_millis();
        updated.category_ids = category_ids;
        updated.updated_date = now;

        let entry = EditHistoryEntry {
            edited_at: now,
            edited_by: editor
                .map(|user| user.username.clone())
                .unwrap_or_else(|| SYSTEM_EDITOR.to_string()),
            changes,
        };
        let saved = self.leads.save_lead(&updated, Some(&entry)).await?;
        info!(
            lead_id = %saved.lead_id,
            edited_by = %entry.edited_by,
            fields = entry.changes.len(),
            "Lead updated"
        );
        Ok(LeadUpdateOutcome::Updated(saved))
    }

    /// Soft delete: the lead stays retrievable by id.
    pub async fn delete_lead(&self, id: i64) -> Result<Lead> {
        let now = chrono::Utc::now().timestamp_millis();
        let lead = self.leads.set_active(id, false, now).await?;
        info!(lead_id = %lead.lead_id, "Lead deactivated");
        Ok(lead)
    }

    pub async fn bulk_update_categories(&self, request: BulkCategoryUpdate) -> Result<BulkUpdateResult> {
        let lead_ids = request.lead_ids.unwrap_or_default();
        let category_ids = request.categories.unwrap_or_default();
        if lead_ids.is_empty() || category_ids.is_empty() {
            return Err(AppError::ValidationError(
                "leadIds and categories must be non-empty arrays".to_string(),
            ));
        }

        let wanted: BTreeSet<i64> = category_ids.iter().copied().collect();
        let found: BTreeSet<i64> = self
            .categories
            .find_by_ids(&category_ids)
            .await?
            .into_iter()
            .map(|category| category.id)
            .collect();
        let invalid: Vec<String> = wanted.difference(&found).map(i64::to_string).collect();
        if !invalid.is_empty() {
            return Err(AppError::ValidationError(format!(
                "Invalid category IDs: {}",
                invalid.join(", ")
            )));
        }

        let now = chrono::Utc::now().timestamp_millis();
        let (matched_count, modified_count) = self
            .leads
            .replace_categories(&lead_ids, &category_ids, now)
            .await?;
        if matched_count == 0 {
            return Err(AppError::NotFound(
                "No leads found for the provided IDs".to_string(),
            ));
        }

        Ok(BulkUpdateResult {
            message: "Lead categories updated successfully".to_string(),
            matched_count,
            modified_count,
        })
    }

    pub async fn dashboard(&self, query: DashboardQuery) -> Result<LeadDashboard> {
        if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
            if start > end {
                return Err(AppError::ValidationError(
                    "startDate must not be after endDate".to_string(),
                ));
            }
        }
        self.leads.dashboard(query.start_date, query.end_date).await
    }

    pub async fn import_leads(&self, rows: Vec<RawRow>, uploader: &User) -> Result<ImportReport> {
        let importer = LeadImporter {
            leads: &self.leads,
            counter: self.counter.as_ref(),
            mapper: LeadRowMapper::new(self.import, chrono::Local::now().date_naive()),
            uploader: uploader.id,
        };
        Ok(import_rows(&importer, rows).await)
    }

    /// Resolves category labels to ids, sorted. Unknown labels are rejected.
    async fn resolve_category_labels(&self, labels: &[String]) -> Result<Vec<i64>> {
        let labels: Vec<String> = labels
            .iter()
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .collect();
        let found = self.categories.find_by_labels(&labels).await?;

        let unknown: Vec<&str> = labels
            .iter()
            .filter(|label| {
                !found
                    .iter()
                    .any(|category| category.leadcategory.eq_ignore_ascii_case(label))
            })
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(AppError::ValidationError(format!(
                "Unknown lead categories: {}",
                unknown.join(", ")
            )));
        }

        let ids: BTreeSet<i64> = found.into_iter().map(|category| category.id).collect();
        Ok(ids.into_iter().collect())
    }
}

fn to_object<T: serde::Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Internal("Expected a JSON object".to_string())),
        Err(e) => Err(AppError::Internal(format!("Failed to serialize lead: {}", e))),
    }
}

fn change_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(change_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
