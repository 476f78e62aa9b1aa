use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Industry {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub industry_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Qualification {
    pub id: i64,
    pub category: String,
    pub subcategory: Option<String>,
}

/// Job row returned when browsing by category
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CategoryJob {
    pub id: i64,
    pub title: String,
    pub location: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub employment_type: Option<String>,
    pub description: String,
    pub category: String,
}

/// `data-science` names the category "data science"
pub fn slug_to_name(slug: &str) -> String {
    slug.replace('-', " ")
}
