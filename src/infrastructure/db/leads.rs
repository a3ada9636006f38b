use super::{decode_date, decode_list, encode_date, encode_list, map_write_error, IN_LIST_CHUNK};
use crate::domain::error::{AppError, Result};
use crate::domain::lead::{
    DlStatus, EditHistoryEntry, Lead, LeadDashboard, LeadQuery, LeadSource, LeadStatus,
    ModelLeadCount, NewLead, PaymentPlan, PriorityLevel, StatusLeadCount,
};
use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::warn;

const LEAD_COLUMNS: &str = "id, lead_id, status, month, manager, dl_status, name, phone_number, email, \
    lead_source, interested_models, make, budget, credit_score, down_payment_amount, payment_plan, \
    last_follow_up, next_follow_up, trade_in_option, trade_in_vehicle_details, assigned_to, \
    priority_level, general_comments, budget_from, budget_to, is_active, created_by, created_date, \
    updated_date";

/// Number of models reported on the dashboard.
const TOP_MODELS_LIMIT: i64 = 7;

pub struct LeadRepository {
    pool: SqlitePool,
}

impl LeadRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_lead(&self, lead_id: &str, lead: &NewLead, now: i64) -> Result<Lead> {
        let mut tx = self.begin().await?;

        let result = sqlx::query(
            "INSERT INTO leads (lead_id, status, month, manager, dl_status, name, phone_number, email,
                lead_source, interested_models, make, budget, credit_score, down_payment_amount,
                payment_plan, last_follow_up, next_follow_up, trade_in_option, trade_in_vehicle_details,
                assigned_to, priority_level, general_comments, budget_from, budget_to, is_active,
                created_by, created_date, updated_date)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?)",
        )
        .bind(lead_id)
        .bind(lead.status.map(LeadStatus::label))
        .bind(lead.month.format("%Y-%m-%d").to_string())
        .bind(&lead.manager)
        .bind(lead.dl_status.map(DlStatus::label))
        .bind(&lead.name)
        .bind(&lead.phone_number)
        .bind(&lead.email)
        .bind(lead.lead_source.map(LeadSource::label))
        .bind(encode_list(&lead.interested_models))
        .bind(&lead.make)
        .bind(lead.budget)
        .bind(lead.credit_score)
        .bind(lead.down_payment_amount)
        .bind(lead.payment_plan.map(PaymentPlan::label))
        .bind(encode_date(lead.last_follow_up))
        .bind(encode_date(lead.next_follow_up))
        .bind(lead.trade_in_option)
        .bind(&lead.trade_in_vehicle_details)
        .bind(&lead.assigned_to)
        .bind(lead.priority_level.map(PriorityLevel::label))
        .bind(&lead.general_comments)
        .bind(lead.budget_from)
        .bind(lead.budget_to)
        .bind(lead.created_by)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error("Failed to insert lead", e))?;

        let id = result.last_insert_rowid();
        replace_links(&mut tx, id, &lead.category_ids).await?;
        self.commit(tx).await?;

        self.get_lead(id).await
    }

    pub async fn find_lead(&self, id: i64) -> Result<Option<Lead>> {
        let entity = sqlx::query_as::<_, LeadEntity>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch lead: {e}")))?;

        match entity {
            Some(entity) => Ok(self.hydrate(vec![entity]).await?.pop()),
            None => Ok(None),
        }
    }

    pub async fn get_lead(&self, id: i64) -> Result<Lead> {
        self.find_lead(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lead not found: {}", id)))
    }

    pub async fn list_leads(&self, query: &LeadQuery) -> Result<Vec<Lead>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {LEAD_COLUMNS} FROM leads WHERE is_active = "));
        builder.push_bind(query.is_active);

        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status.label());
        }
        if let Some(manager) = &query.manager {
            builder.push(" AND manager = ").push_bind(manager.clone());
        }
        if let Some(priority) = query.priority_level {
            builder.push(" AND priority_level = ").push_bind(priority.label());
        }
        if let Some(source) = query.lead_source {
            builder.push(" AND lead_source = ").push_bind(source.label());
        }
        if let Some(model) = &query.interested_model {
            builder
                .push(" AND EXISTS (SELECT 1 FROM json_each(leads.interested_models) WHERE value = ")
                .push_bind(model.clone())
                .push(")");
        }
        if let Some(search) = &query.search {
            let pattern = format!("%{}%", escape_like(search));
            builder.push(" AND (");
            for (i, column) in ["name", "email", "phone_number", "lead_id"].iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                builder
                    .push(*column)
                    .push(" LIKE ")
                    .push_bind(pattern.clone())
                    .push(" ESCAPE '\\'");
            }
            builder.push(")");
        }

        match query.sort {
            Some(sort) => {
                builder
                    .push(" ORDER BY ")
                    .push(sort.field.column())
                    .push(if sort.descending { " DESC" } else { " ASC" })
                    .push(", id ASC");
            }
            None => {
                builder.push(" ORDER BY id ASC");
            }
        }

        let entities = builder
            .build_query_as::<LeadEntity>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list leads: {e}")))?;

        self.hydrate(entities).await
    }

    /// Persists every mutable column of `lead`, replaces its category links
    /// and appends `edit` to the history, atomically.
    pub async fn save_lead(&self, lead: &Lead, edit: Option<&EditHistoryEntry>) -> Result<Lead> {
        let mut tx = self.begin().await?;

        let result = sqlx::query(
            "UPDATE leads SET status = ?, month = ?, manager = ?, dl_status = ?, name = ?,
                phone_number = ?, email = ?, lead_source = ?, interested_models = ?, make = ?,
                budget = ?, credit_score = ?, down_payment_amount = ?, payment_plan = ?,
                last_follow_up = ?, next_follow_up = ?, trade_in_option = ?,
                trade_in_vehicle_details = ?, assigned_to = ?, priority_level = ?,
                general_comments = ?, budget_from = ?, budget_to = ?, is_active = ?, updated_date = ?
             WHERE id = ?",
        )
        .bind(lead.status.map(LeadStatus::label))
        .bind(lead.month.format("%Y-%m-%d").to_string())
        .bind(&lead.manager)
        .bind(lead.dl_status.map(DlStatus::label))
        .bind(&lead.name)
        .bind(&lead.phone_number)
        .bind(&lead.email)
        .bind(lead.lead_source.map(LeadSource::label))
        .bind(encode_list(&lead.interested_models))
        .bind(&lead.make)
        .bind(lead.budget)
        .bind(lead.credit_score)
        .bind(lead.down_payment_amount)
        .bind(lead.payment_plan.map(PaymentPlan::label))
        .bind(encode_date(lead.last_follow_up))
        .bind(encode_date(lead.next_follow_up))
        .bind(lead.trade_in_option)
        .bind(&lead.trade_in_vehicle_details)
        .bind(&lead.assigned_to)
        .bind(lead.priority_level.map(PriorityLevel::label))
        .bind(&lead.general_comments)
        .bind(lead.budget_from)
        .bind(lead.budget_to)
        .bind(lead.is_active)
        .bind(lead.updated_date)
        .bind(lead.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error("Failed to update lead", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Lead not found: {}", lead.id)));
        }

        replace_links(&mut tx, lead.id, &lead.category_ids).await?;

        if let Some(edit) = edit {
            let changes = serde_json::to_string(&edit.changes).map_err(|e| {
                AppError::Internal(format!("Failed to serialize lead changes: {e}"))
            })?;
            sqlx::query(
                "INSERT INTO lead_edits (lead_id, edited_at, edited_by, changes) VALUES (?, ?, ?, ?)",
            )
            .bind(lead.id)
            .bind(edit.edited_at)
            .bind(&edit.edited_by)
            .bind(changes)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error("Failed to record lead edit", e))?;
        }

        self.commit(tx).await?;
        self.get_lead(lead.id).await
    }

    pub async fn set_active(&self, id: i64, is_active: bool, now: i64) -> Result<Lead> {
        let result = sqlx::query("UPDATE leads SET is_active = ?, updated_date = ? WHERE id = ?")
            .bind(is_active)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to update lead status: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Lead not found: {}", id)));
        }
        self.get_lead(id).await
    }

    /// Replaces the categories of every lead in `lead_ids`. Returns the number
    /// of leads found and the number whose category set actually changed.
    pub async fn replace_categories(
        &self,
        lead_ids: &[i64],
        category_ids: &[i64],
        now: i64,
    ) -> Result<(u64, u64)> {
        let wanted: BTreeSet<i64> = category_ids.iter().copied().collect();
        let wanted: Vec<i64> = wanted.into_iter().collect();
        let mut tx = self.begin().await?;

        let requested: BTreeSet<i64> = lead_ids.iter().copied().collect();
        let requested: Vec<i64> = requested.into_iter().collect();
        let mut matched: Vec<(i64,)> = Vec::new();
        for chunk in requested.chunks(IN_LIST_CHUNK) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("SELECT id FROM leads WHERE id IN (");
            let mut separated = builder.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            builder.push(")");
            matched.extend(
                builder
                    .build_query_as::<(i64,)>()
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(|e| AppError::DatabaseError(format!("Failed to match leads: {e}")))?,
            );
        }

        let mut modified = 0u64;
        for (lead_id,) in &matched {
            let current: Vec<(i64,)> = sqlx::query_as(
                "SELECT category_id FROM lead_category_links WHERE lead_id = ? ORDER BY category_id",
            )
            .bind(lead_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to read lead categories: {e}")))?;
            let current: Vec<i64> = current.into_iter().map(|(id,)| id).collect();
            if current == wanted {
                continue;
            }

            replace_links(&mut tx, *lead_id, &wanted).await?;
            sqlx::query("UPDATE leads SET updated_date = ? WHERE id = ?")
                .bind(now)
                .bind(lead_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_write_error("Failed to update lead", e))?;
            modified += 1;
        }

        self.commit(tx).await?;
        Ok((matched.len() as u64, modified))
    }

    pub async fn dashboard(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<LeadDashboard> {
        let start = encode_date(start);
        let end = encode_date(end);
        let range = "(?1 IS NULL OR month >= ?1) AND (?2 IS NULL OR month <= ?2)";

        let top: Vec<(String, i64)> = sqlx::query_as(&format!(
            "SELECT models.value AS model, COUNT(*) AS total_leads
             FROM leads, json_each(leads.interested_models) AS models
             WHERE {range}
             GROUP BY models.value
             ORDER BY total_leads DESC, model ASC
             LIMIT ?3"
        ))
        .bind(&start)
        .bind(&end)
        .bind(TOP_MODELS_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to aggregate models: {e}")))?;

        let by_status: Vec<(Option<String>, i64)> = sqlx::query_as(&format!(
            "SELECT status, COUNT(*) AS total_leads FROM leads
             WHERE {range}
             GROUP BY status
             ORDER BY total_leads DESC, status ASC"
        ))
        .bind(&start)
        .bind(&end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to aggregate statuses: {e}")))?;

        let (total,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM leads WHERE {range}"))
                .bind(&start)
                .bind(&end)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to count leads: {e}")))?;

        Ok(LeadDashboard {
            top_car_leads: top
                .into_iter()
                .map(|(model, total_leads)| ModelLeadCount { model, total_leads })
                .collect(),
            leads_by_status: by_status
                .into_iter()
                .map(|(status, total_leads)| StatusLeadCount { status, total_leads })
                .collect(),
            total_leads: total,
        })
    }

    /// Attaches category ids and edit history to freshly loaded rows.
    async fn hydrate(&self, entities: Vec<LeadEntity>) -> Result<Vec<Lead>> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = entities.iter().map(|entity| entity.id).collect();
        let mut categories_by_lead: HashMap<i64, Vec<i64>> = HashMap::new();
        let mut edits_by_lead: HashMap<i64, Vec<EditHistoryEntry>> = HashMap::new();

        // A lead falls in exactly one chunk, so per-lead ordering holds.
        for chunk in ids.chunks(IN_LIST_CHUNK) {
            let mut links_query: QueryBuilder<Sqlite> = QueryBuilder::new(
                "SELECT lead_id, category_id FROM lead_category_links WHERE lead_id IN (",
            );
            let mut separated = links_query.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            links_query.push(") ORDER BY category_id");
            let links: Vec<(i64, i64)> = links_query
                .build_query_as()
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to load lead categories: {e}"))
                })?;
            for (lead_id, category_id) in links {
                categories_by_lead.entry(lead_id).or_default().push(category_id);
            }

            let mut edits_query: QueryBuilder<Sqlite> = QueryBuilder::new(
                "SELECT lead_id, edited_at, edited_by, changes FROM lead_edits WHERE lead_id IN (",
            );
            let mut separated = edits_query.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            edits_query.push(") ORDER BY id");
            let edits: Vec<(i64, i64, String, String)> = edits_query
                .build_query_as()
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to load lead history: {e}")))?;
            for (lead_id, edited_at, edited_by, changes) in edits {
                edits_by_lead.entry(lead_id).or_default().push(EditHistoryEntry {
                    edited_at,
                    edited_by,
                    changes: decode_changes(lead_id, &changes),
                });
            }
        }

        Ok(entities
            .into_iter()
            .map(|entity| {
                let categories = categories_by_lead.remove(&entity.id).unwrap_or_default();
                let history = edits_by_lead.remove(&entity.id).unwrap_or_default();
                entity.into_lead(categories, history)
            })
            .collect())
    }

    async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {e}")))
    }

    async fn commit(&self, tx: Transaction<'static, Sqlite>) -> Result<()> {
        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit transaction: {e}")))
    }
}

async fn replace_links(
    tx: &mut Transaction<'static, Sqlite>,
    lead_id: i64,
    category_ids: &[i64],
) -> Result<()> {
    sqlx::query("DELETE FROM lead_category_links WHERE lead_id = ?")
        .bind(lead_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to clear lead categories: {e}")))?;

    for category_id in category_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO lead_category_links (lead_id, category_id) VALUES (?, ?)",
        )
        .bind(lead_id)
        .bind(category_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_write_error("Failed to link lead category", e))?;
    }
    Ok(())
}

fn decode_changes(lead_id: i64, raw: &str) -> BTreeMap<String, String> {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        warn!(lead_id, error = %err, "Unreadable edit history entry; showing no changes");
        BTreeMap::new()
    })
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(sqlx::FromRow)]
struct LeadEntity {
    id: i64,
    lead_id: String,
    status: Option<String>,
    month: String,
    manager: Option<String>,
    dl_status: Option<String>,
    name: String,
    phone_number: String,
    email: Option<String>,
    lead_source: Option<String>,
    interested_models: String,
    make: Option<String>,
    budget: Option<f64>,
    credit_score: Option<f64>,
    down_payment_amount: Option<f64>,
    payment_plan: Option<String>,
    last_follow_up: Option<String>,
    next_follow_up: Option<String>,
    trade_in_option: bool,
    trade_in_vehicle_details: Option<String>,
    assigned_to: Option<String>,
    priority_level: Option<String>,
    general_comments: Option<String>,
    budget_from: Option<f64>,
    budget_to: Option<f64>,
    is_active: bool,
    created_by: Option<i64>,
    created_date: i64,
    updated_date: i64,
}

impl LeadEntity {
    fn into_lead(self, category_ids: Vec<i64>, edit_history: Vec<EditHistoryEntry>) -> Lead {
        let month = decode_date(Some(self.month.as_str())).unwrap_or_else(|| {
            warn!(lead_id = %self.lead_id, month = %self.month, "Unreadable lead month");
            NaiveDate::default()
        });
        Lead {
            id: self.id,
            lead_id: self.lead_id,
            category_ids,
            status: self.status.as_deref().and_then(LeadStatus::from_label),
            month,
            manager: self.manager,
            dl_status: self.dl_status.as_deref().and_then(DlStatus::from_label),
            name: self.name,
            phone_number: self.phone_number,
            email: self.email,
            lead_source: self.lead_source.as_deref().and_then(LeadSource::from_label),
            interested_models: decode_list(&self.interested_models),
            make: self.make,
            budget: self.budget,
            credit_score: self.credit_score,
            down_payment_amount: self.down_payment_amount,
            payment_plan: self.payment_plan.as_deref().and_then(PaymentPlan::from_label),
            last_follow_up: decode_date(self.last_follow_up.as_deref()),
            next_follow_up: decode_date(self.next_follow_up.as_deref()),
            trade_in_option: self.trade_in_option,
            trade_in_vehicle_details: self.trade_in_vehicle_details,
            assigned_to: self.assigned_to,
            priority_level: self.priority_level.as_deref().and_then(PriorityLevel::from_label),
            general_comments: self.general_comments,
            budget_from: self.budget_from,
            budget_to: self.budget_to,
            edit_history,
            is_active: self.is_active,
            created_by: self.created_by,
            created_date: self.created_date,
            updated_date: self.updated_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lead::{LeadSort, LeadSortField};
    use crate::infrastructure::db::test_support::TestDb;

    fn new_lead(name: &str, phone: &str, owner: i64) -> NewLead {
        NewLead {
            category_ids: vec![],
            status: Some(LeadStatus::New),
            month: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            manager: None,
            dl_status: None,
            name: name.to_string(),
            phone_number: phone.to_string(),
            email: None,
            lead_source: None,
            interested_models: vec![],
            make: None,
            budget: None,
            credit_score: None,
            down_payment_amount: None,
            payment_plan: None,
            last_follow_up: None,
            next_follow_up: None,
            trade_in_option: false,
            trade_in_vehicle_details: None,
            assigned_to: None,
            priority_level: None,
            general_comments: None,
            budget_from: None,
            budget_to: None,
            created_by: owner,
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like(" 50%_off\\ "), "50\\%\\_off\\\\");
    }

    #[tokio::test]
    async fn test_search_and_sort() {
        let db = TestDb::new().await;
        let owner = db.seed_user("owner").await;
        let repo = LeadRepository::new(db.pool.clone());

        repo.insert_lead("LD0001", &new_lead("Alice Brown", "4035550001", owner), 1)
            .await
            .unwrap();
        repo.insert_lead("LD0002", &new_lead("Bob 100%", "4035550002", owner), 2)
            .await
            .unwrap();
        repo.insert_lead("LD0003", &new_lead("alina", "4035550003", owner), 3)
            .await
            .unwrap();

        let query = LeadQuery {
            is_active: true,
            search: Some("ALI".to_string()),
            sort: Some(LeadSort {
                field: LeadSortField::Name,
                descending: true,
            }),
            ..LeadQuery::default()
        };
        let found: Vec<String> = repo
            .list_leads(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|lead| lead.lead_id)
            .collect();
        assert_eq!(found, vec!["LD0003", "LD0001"]);

        let wildcard = LeadQuery {
            is_active: true,
            search: Some("%".to_string()),
            ..LeadQuery::default()
        };
        let found = repo.list_leads(&wildcard).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].lead_id, "LD0002");
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let db = TestDb::new().await;
        let owner = db.seed_user("owner").await;
        let repo = LeadRepository::new(db.pool.clone());

        let mut civic = new_lead("A", "1", owner);
        civic.interested_models = vec!["Civic".to_string(), "Accord".to_string()];
        repo.insert_lead("LD0001", &civic, 1).await.unwrap();

        let mut civic_hot = new_lead("B", "2", owner);
        civic_hot.status = Some(LeadStatus::Hot);
        civic_hot.interested_models = vec!["Civic".to_string()];
        repo.insert_lead("LD0002", &civic_hot, 1).await.unwrap();

        let mut old = new_lead("C", "3", owner);
        old.month = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        old.interested_models = vec!["Corolla".to_string()];
        repo.insert_lead("LD0003", &old, 1).await.unwrap();

        let dashboard = repo
            .dashboard(NaiveDate::from_ymd_opt(2024, 1, 1), None)
            .await
            .unwrap();
        assert_eq!(dashboard.total_leads, 2);
        assert_eq!(
            dashboard.top_car_leads[0],
            ModelLeadCount {
                model: "Civic".to_string(),
                total_leads: 2
            }
        );
        assert_eq!(dashboard.top_car_leads.len(), 2);
        assert_eq!(dashboard.leads_by_status.len(), 2);

        let everything = repo.dashboard(None, None).await.unwrap();
        assert_eq!(everything.total_leads, 3);
    }

    #[tokio::test]
    async fn test_large_result_sets_are_hydrated_in_chunks() {
        let db = TestDb::new().await;
        let owner = db.seed_user("owner").await;
        let repo = LeadRepository::new(db.pool.clone());
        let total = IN_LIST_CHUNK * 2 + 1;

        let mut tx = db.pool.begin().await.unwrap();
        for n in 1..=total {
            sqlx::query(
                "INSERT INTO leads (lead_id, month, name, phone_number, created_by, created_date, updated_date)
                 VALUES (?, '2024-09-01', 'Lead', '1', ?, 0, 0)",
            )
            .bind(format!("LD{:04}", n))
            .bind(owner)
            .execute(&mut *tx)
            .await
            .unwrap();
        }
        tx.commit().await.unwrap();

        let last = total as i64;
        let category: (i64,) = sqlx::query_as(
            "INSERT INTO lead_categories (leadcategory, created_at) VALUES ('Fleet', 0) RETURNING id",
        )
        .fetch_one(&db.pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO lead_category_links (lead_id, category_id) VALUES (?, ?)")
            .bind(last)
            .bind(category.0)
            .execute(&db.pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO lead_edits (lead_id, edited_at, edited_by, changes) VALUES (?, 1, 'sam', 'not json')",
        )
        .bind(last)
        .execute(&db.pool)
        .await
        .unwrap();
        sqlx::query("UPDATE leads SET month = 'someday' WHERE id = ?")
            .bind(last)
            .execute(&db.pool)
            .await
            .unwrap();

        let leads = repo
            .list_leads(&LeadQuery {
                is_active: true,
                ..LeadQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(leads.len(), total);
        let tail = leads.iter().find(|lead| lead.id == last).unwrap();
        assert_eq!(tail.category_ids, vec![category.0]);
        assert_eq!(tail.edit_history.len(), 1);
        assert!(tail.edit_history[0].changes.is_empty());
        assert_eq!(tail.month, NaiveDate::default());

        let all_ids: Vec<i64> = leads.iter().map(|lead| lead.id).collect();
        let (matched, modified) = repo
            .replace_categories(&all_ids, &[category.0], 5)
            .await
            .unwrap();
        assert_eq!(matched, total as u64);
        assert_eq!(modified, total as u64 - 1);
    }
}
