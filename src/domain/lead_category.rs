use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadCategory {
    pub id: i64,
    pub leadcategory: String,
    pub description: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LeadCategoryInput {
    #[validate(length(min = 1, max = 100, message = "leadcategory must be 1-100 characters"))]
    pub leadcategory: String,
    pub description: Option<String>,
}

impl LeadCategoryInput {
    pub fn normalized(mut self) -> Self {
        self.leadcategory = self.leadcategory.trim().to_string();
        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self
    }
}
