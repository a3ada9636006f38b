use crate::domain::error::Result;
use crate::domain::lead_category::{LeadCategory, LeadCategoryInput};
use crate::infrastructure::db::lead_categories::LeadCategoryRepository;
use std::sync::Arc;
use validator::Validate;

pub struct LeadCategoryUseCase {
    repository: Arc<LeadCategoryRepository>,
}

impl LeadCategoryUseCase {
    pub fn new(repository: Arc<LeadCategoryRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_category(&self, input: LeadCategoryInput) -> Result<LeadCategory> {
        let input = input.normalized();
        input.validate()?;
        let now = chrono::Utc::now().timestamp_millis();
        self.repository.create_category(&input, now).await
    }

    pub async fn list_categories(&self) -> Result<Vec<LeadCategory>> {
        self.repository.list_categories().await
    }

    pub async fn get_category(&self, id: i64) -> Result<LeadCategory> {
        self.repository.get_category(id).await
    }

    pub async fn update_category(&self, id: i64, input: LeadCategoryInput) -> Result<LeadCategory> {
        let input = input.normalized();
        input.validate()?;
        self.repository.update_category(id, &input).await
    }

    /// Removing a category also unlinks it from every lead.
    pub async fn delete_category(&self, id: i64) -> Result<()> {
        self.repository.delete_category(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;
    use crate::infrastructure::db::test_support::TestDb;

    #[tokio::test]
    async fn test_blank_label_rejected_after_trim() {
        let db = TestDb::new().await;
        let categories = LeadCategoryUseCase::new(Arc::new(LeadCategoryRepository::new(db.pool.clone())));

        let err = categories
            .create_category(LeadCategoryInput {
                leadcategory: "   ".to_string(),
                description: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let created = categories
            .create_category(LeadCategoryInput {
                leadcategory: "  Fleet ".to_string(),
                description: Some(" ".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(created.leadcategory, "Fleet");
        assert_eq!(created.description, None);
    }

    #[tokio::test]
    async fn test_delete_unlinks_leads() {
        let db = TestDb::new().await;
        let owner = db.seed_user("owner").await;
        let repository = Arc::new(LeadCategoryRepository::new(db.pool.clone()));
        let categories = LeadCategoryUseCase::new(repository.clone());
        let fleet = categories
            .create_category(LeadCategoryInput {
                leadcategory: "Fleet".to_string(),
                description: None,
            })
            .await
            .unwrap();

        sqlx::query(
            "INSERT INTO leads (lead_id, month, name, phone_number, created_by, created_date, updated_date)
             VALUES ('LD0001', '2024-09-01', 'A', '1', ?, 0, 0)",
        )
        .bind(owner)
        .execute(&db.pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO lead_category_links (lead_id, category_id) VALUES (1, ?)")
            .bind(fleet.id)
            .execute(&db.pool)
            .await
            .unwrap();

        categories.delete_category(fleet.id).await.unwrap();

        let (links,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM lead_category_links")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(links, 0);
    }
}
