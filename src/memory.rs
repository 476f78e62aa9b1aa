use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use crate::catalog::models::{Category, Industry, Qualification, Subcategory};
use crate::companies::models::CompanyModel;
use crate::invites::models::InviteModel;
use crate::jobs::models::{ApplicationModel, ApplicationResponseModel, FormFieldModel, JobModel};
use crate::recruiters::models::RecruiterModel;
use crate::shared::AppError;
use crate::users::models::{UserEducation, UserExperience, UserLanguage, UserModel, UserProject};

/// Every table of the schema, held in process memory.
///
/// All `InMemory*Repository` types share one store so that operations spanning
/// several tables (invite acceptance, company registration) see a single
/// consistent state. Ids come from one counter, which keeps them unique across
/// tables; nothing relies on them being dense.
#[derive(Debug, Default)]
pub struct Tables {
    next_id: i64,
    pub users: BTreeMap<i64, UserModel>,
    pub user_languages: HashMap<i64, Vec<UserLanguage>>,
    pub user_projects: HashMap<i64, Vec<UserProject>>,
    pub user_education: HashMap<i64, Vec<UserEducation>>,
    pub user_experience: HashMap<i64, Vec<UserExperience>>,
    /// (user_id, job_id) pairs in the order they were saved
    pub saved_jobs: Vec<(i64, i64)>,
    pub blacklisted_tokens: HashMap<String, DateTime<Utc>>,
    pub recruiters: BTreeMap<i64, RecruiterModel>,
    pub companies: BTreeMap<i64, CompanyModel>,
    pub industries: BTreeMap<i64, Industry>,
    pub categories: BTreeMap<i64, Category>,
    pub subcategories: BTreeMap<i64, Subcategory>,
    pub qualifications: BTreeMap<i64, Qualification>,
    pub jobs: BTreeMap<i64, JobModel>,
    pub form_fields: BTreeMap<i64, FormFieldModel>,
    pub applications: BTreeMap<i64, ApplicationModel>,
    pub application_responses: BTreeMap<i64, ApplicationResponseModel>,
    pub invites: BTreeMap<i64, InviteModel>,
}

impl Tables {
    pub fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn seed_industry(&mut self, name: &str) -> i64 {
        let id = self.next_id();
        self.industries.insert(
            id,
            Industry {
                id,
                name: name.to_string(),
            },
        );
        id
    }

    pub fn seed_category(&mut self, industry_id: i64, name: &str) -> i64 {
        let id = self.next_id();
        self.categories.insert(
            id,
            Category {
                id,
                industry_id,
                name: name.to_string(),
            },
        );
        id
    }

    pub fn seed_subcategory(&mut self, category_id: i64, name: &str) -> i64 {
        let id = self.next_id();
        self.subcategories.insert(
            id,
            Subcategory {
                id,
                category_id,
                name: name.to_string(),
            },
        );
        id
    }

    pub fn seed_qualification(&mut self, category: &str, subcategory: Option<&str>) -> i64 {
        let id = self.next_id();
        self.qualifications.insert(
            id,
            Qualification {
                id,
                category: category.to_string(),
                subcategory: subcategory.map(str::to_string),
            },
        );
        id
    }
}

/// In-process database used for development and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with a small catalog so the browse endpoints return data
    pub fn with_sample_catalog() -> Self {
        let mut tables = Tables::default();

        let it = tables.seed_industry("Information Technology");
        let software = tables.seed_category(it, "Software Development");
        tables.seed_subcategory(software, "Backend");
        tables.seed_subcategory(software, "Frontend");
        let data = tables.seed_category(it, "Data Science");
        tables.seed_subcategory(data, "Machine Learning");

        let health = tables.seed_industry("Healthcare");
        let nursing = tables.seed_category(health, "Nursing");
        tables.seed_subcategory(nursing, "Critical Care");

        tables.seed_qualification("Graduate", None);
        tables.seed_qualification("Graduate", Some("B.Tech"));
        tables.seed_qualification("Graduate", Some("B.Sc"));
        tables.seed_qualification("Post Graduate", None);
        tables.seed_qualification("Post Graduate", Some("M.Tech"));

        Self {
            tables: Mutex::new(tables),
        }
    }

    /// Locks every table; the guard makes the caller's whole operation atomic
    pub fn tables(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("in-memory store lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_across_tables() {
        let store = MemoryStore::new();
        let mut tables = store.tables().unwrap();
        let industry = tables.seed_industry("Retail");
        let category = tables.seed_category(industry, "Store Operations");
        assert_ne!(industry, category);
        assert_eq!(tables.categories[&category].industry_id, industry);
    }

    #[test]
    fn test_sample_catalog_is_populated() {
        let store = MemoryStore::with_sample_catalog();
        let tables = store.tables().unwrap();
        assert_eq!(tables.industries.len(), 2);
        assert_eq!(tables.categories.len(), 3);
        assert!(tables
            .qualifications
            .values()
            .any(|q| q.subcategory.as_deref() == Some("B.Tech")));
    }
}
