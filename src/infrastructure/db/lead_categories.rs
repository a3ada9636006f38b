use super::{map_write_error, IN_LIST_CHUNK};
use crate::domain::error::{AppError, Result};
use crate::domain::lead_category::{LeadCategory, LeadCategoryInput};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub struct LeadCategoryRepository {
    pool: SqlitePool,
}

impl LeadCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_category(&self, input: &LeadCategoryInput, now: i64) -> Result<LeadCategory> {
        let result = sqlx::query(
            "INSERT INTO lead_categories (leadcategory, description, created_at) VALUES (?, ?, ?)",
        )
        .bind(&input.leadcategory)
        .bind(&input.description)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("Failed to create lead category", e))?;

        self.get_category(result.last_insert_rowid()).await
    }

    pub async fn list_categories(&self) -> Result<Vec<LeadCategory>> {
        let rows = sqlx::query_as::<_, CategoryEntity>(
            "SELECT id, leadcategory, description, created_at FROM lead_categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list lead categories: {e}")))?;
        Ok(rows.into_iter().map(LeadCategory::from).collect())
    }

    pub async fn get_category(&self, id: i64) -> Result<LeadCategory> {
        sqlx::query_as::<_, CategoryEntity>(
            "SELECT id, leadcategory, description, created_at FROM lead_categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch lead category: {e}")))?
        .map(LeadCategory::from)
        .ok_or_else(|| AppError::NotFound(format!("Lead category not found: {}", id)))
    }

    pub async fn update_category(&self, id: i64, input: &LeadCategoryInput) -> Result<LeadCategory> {
        let result =
            sqlx::query("UPDATE lead_categories SET leadcategory = ?, description = ? WHERE id = ?")
                .bind(&input.leadcategory)
                .bind(&input.description)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| map_write_error("Failed to update lead category", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Lead category not found: {}", id)));
        }
        self.get_category(id).await
    }

    pub async fn delete_category(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM lead_categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete lead category: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Lead category not found: {}", id)));
        }
        Ok(())
    }

    /// Categories whose label matches one of `labels`, ignoring case.
    pub async fn find_by_labels(&self, labels: &[String]) -> Result<Vec<LeadCategory>> {
        if labels.is_empty() {
            return Ok(Vec::new());
        }
        let mut rows = Vec::new();
        for chunk in labels.chunks(IN_LIST_CHUNK) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
                "SELECT id, leadcategory, description, created_at FROM lead_categories WHERE leadcategory IN (",
            );
            let mut separated = builder.separated(", ");
            for label in chunk {
                separated.push_bind(label.trim().to_string());
            }
            builder.push(")");

            rows.extend(
                builder
                    .build_query_as::<CategoryEntity>()
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| {
                        AppError::DatabaseError(format!("Failed to resolve lead categories: {e}"))
                    })?,
            );
        }
        rows.sort_by_key(|row| row.id);
        rows.dedup_by_key(|row| row.id);
        Ok(rows.into_iter().map(LeadCategory::from).collect())
    }

    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<LeadCategory>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut rows = Vec::new();
        for chunk in ids.chunks(IN_LIST_CHUNK) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
                "SELECT id, leadcategory, description, created_at FROM lead_categories WHERE id IN (",
            );
            let mut separated = builder.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            builder.push(")");

            rows.extend(
                builder
                    .build_query_as::<CategoryEntity>()
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| {
                        AppError::DatabaseError(format!("Failed to load lead categories: {e}"))
                    })?,
            );
        }
        rows.sort_by_key(|row| row.id);
        rows.dedup_by_key(|row| row.id);
        Ok(rows.into_iter().map(LeadCategory::from).collect())
    }
}

#[derive(sqlx::FromRow)]
struct CategoryEntity {
    id: i64,
    leadcategory: String,
    description: Option<String>,
    created_at: i64,
}

impl From<CategoryEntity> for LeadCategory {
    fn from(entity: CategoryEntity) -> Self {
        LeadCategory {
            id: entity.id,
            leadcategory: entity.leadcategory,
            description: entity.description,
            created_at: entity.created_at,
        }
    }
}
