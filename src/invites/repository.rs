use async_trait::async_trait;
use chrono::Utc;
use sqlx::MySqlPool;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::models::{InviteListing, NewInvite, OpenInvite};
use crate::memory::MemoryStore;
use crate::recruiters::models::NewRecruiter;
use crate::shared::AppError;

/// Repository trait for company invites.
///
/// Accepting an invite touches both `invites` and `recruiters`; each of those
/// operations is a single atomic call here. The `used` flag is only ever
/// flipped by a conditional update, so two concurrent acceptances of the same
/// token cannot both succeed.
#[async_trait]
pub trait InviteRepository {
    async fn create_invite(&self, invite: NewInvite) -> Result<i64, AppError>;
    async fn delete_invite(&self, id: i64) -> Result<(), AppError>;
    /// Looks up an unused, unexpired invite by token digest
    async fn find_open(&self, token_hash: &str) -> Result<Option<OpenInvite>, AppError>;
    /// Marks the invite used by `recruiter_id` and moves that recruiter into
    /// the invite's company with the invite's role. `false` if the invite was
    /// consumed in the meantime.
    async fn accept(&self, invite: &OpenInvite, recruiter_id: i64) -> Result<bool, AppError>;
    /// Inserts a verified recruiter for the invite and consumes the invite.
    /// `None` if the invite was consumed in the meantime.
    async fn register(
        &self,
        invite: &OpenInvite,
        recruiter: NewRecruiter,
    ) -> Result<Option<i64>, AppError>;
    async fn list_for_company(&self, company_id: i64) -> Result<Vec<InviteListing>, AppError>;
    /// Deletes the invite and every recruiter of the company registered with
    /// the invited email, except `keep_recruiter`. `false` when the invite is
    /// not in the company.
    async fn delete_with_recruiter(
        &self,
        invite_id: i64,
        company_id: i64,
        keep_recruiter: i64,
    ) -> Result<bool, AppError>;
}

pub struct InMemoryInviteRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryInviteRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl InviteRepository for InMemoryInviteRepository {
    #[instrument(skip(self, invite))]
    async fn create_invite(&self, invite: NewInvite) -> Result<i64, AppError> {
        let mut tables = self.store.tables()?;
        let id = tables.next_id();
        tables.invites.insert(id, invite.into_model(id));
        debug!(invite_id = id, "Invite stored in memory");
        Ok(id)
    }

    async fn delete_invite(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.store.tables()?;
        tables.invites.remove(&id);
        Ok(())
    }

    async fn find_open(&self, token_hash: &str) -> Result<Option<OpenInvite>, AppError> {
        let tables = self.store.tables()?;
        let now = Utc::now();
        Ok(tables
            .invites
            .values()
            .find(|i| i.token_hash == token_hash && i.is_open(now))
            .and_then(|invite| {
                let company = tables.companies.get(&invite.company_id)?;
                Some(OpenInvite {
                    id: invite.id,
                    company_id: invite.company_id,
                    company_name: company.name.clone(),
                    email: invite.email.clone(),
                    role: invite.role.clone(),
                })
            }))
    }

    async fn accept(&self, invite: &OpenInvite, recruiter_id: i64) -> Result<bool, AppError> {
        let mut tables = self.store.tables()?;
        if !tables.recruiters.contains_key(&recruiter_id) {
            return Err(AppError::NotFound("Recruiter not found".to_string()));
        }
        let now = Utc::now();
        match tables.invites.get_mut(&invite.id) {
            Some(stored) if stored.is_open(now) => {
                stored.used = true;
                stored.used_by = Some(recruiter_id);
                stored.used_at = Some(now);
            }
            _ => return Ok(false),
        }
        if let Some(recruiter) = tables.recruiters.get_mut(&recruiter_id) {
            recruiter.company_id = Some(invite.company_id);
            recruiter.role = invite.role.clone();
        }
        Ok(true)
    }

    #[instrument(skip(self, invite, recruiter))]
    async fn register(
        &self,
        invite: &OpenInvite,
        recruiter: NewRecruiter,
    ) -> Result<Option<i64>, AppError> {
        let mut tables = self.store.tables()?;
        let now = Utc::now();
        if !tables.invites.get(&invite.id).is_some_and(|i| i.is_open(now)) {
            return Ok(None);
        }
        if tables.recruiters.values().any(|r| r.email == recruiter.email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let recruiter_id = tables.next_id();
        tables
            .recruiters
            .insert(recruiter_id, recruiter.into_model(recruiter_id));
        if let Some(stored) = tables.invites.get_mut(&invite.id) {
            stored.used = true;
            stored.used_by = Some(recruiter_id);
            stored.used_at = Some(now);
        }
        Ok(Some(recruiter_id))
    }

    async fn list_for_company(&self, company_id: i64) -> Result<Vec<InviteListing>, AppError> {
        let tables = self.store.tables()?;
        let mut invites: Vec<InviteListing> = tables
            .invites
            .values()
            .filter(|i| i.company_id == company_id)
            .map(|i| InviteListing {
                id: i.id,
                email: i.email.clone(),
                role: i.role.clone(),
                created_at: i.created_at,
                used: i.used,
                invited_by_name: tables.recruiters.get(&i.created_by).map(|r| r.name.clone()),
            })
            .collect();
        invites.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(invites)
    }

    async fn delete_with_recruiter(
        &self,
        invite_id: i64,
        company_id: i64,
        keep_recruiter: i64,
    ) -> Result<bool, AppError> {
        let mut tables = self.store.tables()?;
        let email = match tables.invites.get(&invite_id) {
            Some(invite) if invite.company_id == company_id => invite.email.clone(),
            _ => return Ok(false),
        };
        tables.invites.remove(&invite_id);
        tables.recruiters.retain(|id, r| {
            *id == keep_recruiter || !(r.company_id == Some(company_id) && r.email == email)
        });
        Ok(true)
    }
}

/// MySQL implementation of InviteRepository
pub struct MySqlInviteRepository {
    pool: MySqlPool,
}

impl MySqlInviteRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InviteRepository for MySqlInviteRepository {
    #[instrument(skip(self, invite))]
    async fn create_invite(&self, invite: NewInvite) -> Result<i64, AppError> {
        let result = sqlx::query(
            "INSERT INTO invites (company_id, email, token_hash, role, expires_at, created_by)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(invite.company_id)
        .bind(&invite.email)
        .bind(&invite.token_hash)
        .bind(&invite.role)
        .bind(invite.expires_at)
        .bind(invite.created_by)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_id() as i64)
    }

    async fn delete_invite(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM invites WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_open(&self, token_hash: &str) -> Result<Option<OpenInvite>, AppError> {
        let invite = sqlx::query_as::<_, OpenInvite>(
            "SELECT i.id, i.company_id, c.name AS company_name, i.email, i.role
             FROM invites i
             JOIN companies c ON i.company_id = c.id
             WHERE i.token_hash = ? AND i.used = FALSE AND i.expires_at > NOW()",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(invite)
    }

    #[instrument(skip(self, invite))]
    async fn accept(&self, invite: &OpenInvite, recruiter_id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            "UPDATE invites SET used = TRUE, used_by = ?, used_at = NOW()
             WHERE id = ? AND used = FALSE AND expires_at > NOW()",
        )
        .bind(recruiter_id)
        .bind(invite.id)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            return Ok(false);
        }

        let moved = sqlx::query("UPDATE recruiters SET company_id = ?, role = ? WHERE id = ?")
            .bind(invite.company_id)
            .bind(&invite.role)
            .bind(recruiter_id)
            .execute(&mut *tx)
            .await?;
        if moved.rows_affected() == 0 {
            return Err(AppError::NotFound("Recruiter not found".to_string()));
        }

        tx.commit().await?;
        debug!(invite_id = invite.id, recruiter_id, "Invite accepted");
        Ok(true)
    }

    #[instrument(skip(self, invite, recruiter))]
    async fn register(
        &self,
        invite: &OpenInvite,
        recruiter: NewRecruiter,
    ) -> Result<Option<i64>, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO recruiters (name, email, password, designation, role, company_id, is_verified)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&recruiter.name)
        .bind(&recruiter.email)
        .bind(&recruiter.password_hash)
        .bind(&recruiter.designation)
        .bind(&recruiter.role)
        .bind(recruiter.company_id)
        .bind(recruiter.is_verified)
        .execute(&mut *tx)
        .await?;
        let recruiter_id = result.last_insert_id() as i64;

        let claimed = sqlx::query(
            "UPDATE invites SET used = TRUE, used_by = ?, used_at = NOW()
             WHERE id = ? AND used = FALSE AND expires_at > NOW()",
        )
        .bind(recruiter_id)
        .bind(invite.id)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            return Ok(None);
        }

        tx.commit().await?;
        debug!(invite_id = invite.id, recruiter_id, "Recruiter registered through invite");
        Ok(Some(recruiter_id))
    }

    async fn list_for_company(&self, company_id: i64) -> Result<Vec<InviteListing>, AppError> {
        let invites = sqlx::query_as::<_, InviteListing>(
            "SELECT i.id, i.email, i.role, i.created_at, i.used, r.name AS invited_by_name
             FROM invites i
             LEFT JOIN recruiters r ON i.created_by = r.id
             WHERE i.company_id = ?
             ORDER BY i.created_at DESC, i.id DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(invites)
    }

    #[instrument(skip(self))]
    async fn delete_with_recruiter(
        &self,
        invite_id: i64,
        company_id: i64,
        keep_recruiter: i64,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let invite: Option<(String,)> = sqlx::query_as(
            "SELECT email FROM invites WHERE id = ? AND company_id = ? FOR UPDATE",
        )
        .bind(invite_id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((email,)) = invite else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM invites WHERE id = ?")
            .bind(invite_id)
            .execute(&mut *tx)
            .await?;
        let removed = sqlx::query(
            "DELETE FROM recruiters WHERE email = ? AND company_id = ? AND id <> ?",
        )
        .bind(&email)
        .bind(company_id)
        .bind(keep_recruiter)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(invite_id, recruiters_removed = removed.rows_affected(), "Invite deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companies::models::{CompanyDraft, CompanyModel};
    use crate::memory::Tables;
    use crate::recruiters::models::RecruiterModel;
    use chrono::Duration;

    fn recruiter(tables: &mut Tables, email: &str, company_id: Option<i64>) -> i64 {
        let id = tables.next_id();
        let model: RecruiterModel = NewRecruiter {
            name: format!("Recruiter {}", id),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            designation: None,
            role: "recruiter".to_string(),
            company_id,
            is_verified: false,
        }
        .into_model(id);
        tables.recruiters.insert(id, model);
        id
    }

    /// Store with one company, its owner and an open invite; returns (store, company, owner)
    fn setup() -> (Arc<MemoryStore>, i64, i64) {
        let store = Arc::new(MemoryStore::new());
        let (company_id, owner) = {
            let mut tables = store.tables().unwrap();
            let owner = recruiter(&mut tables, "owner@acme.test", None);
            let company_id = tables.next_id();
            let draft = CompanyDraft {
                name: "Acme".to_string(),
                ..CompanyDraft::default()
            };
            tables
                .companies
                .insert(company_id, CompanyModel::from_draft(company_id, owner, draft));
            (company_id, owner)
        };
        (store, company_id, owner)
    }

    fn invite(company_id: i64, owner: i64, digest: &str, expires_in: Duration) -> NewInvite {
        NewInvite {
            company_id,
            email: "new@acme.test".to_string(),
            token_hash: digest.to_string(),
            role: "viewer".to_string(),
            expires_at: Utc::now() + expires_in,
            created_by: owner,
        }
    }

    #[tokio::test]
    async fn test_find_open_skips_expired() {
        let (store, company_id, owner) = setup();
        let repo = InMemoryInviteRepository::new(store);
        repo.create_invite(invite(company_id, owner, "stale", -Duration::hours(1)))
            .await
            .unwrap();
        repo.create_invite(invite(company_id, owner, "fresh", Duration::days(7)))
            .await
            .unwrap();

        assert!(repo.find_open("stale").await.unwrap().is_none());
        let open = repo.find_open("fresh").await.unwrap().unwrap();
        assert_eq!(open.company_name, "Acme");
        assert_eq!(open.role, "viewer");
    }

    #[tokio::test]
    async fn test_invite_is_consumed_once() {
        let (store, company_id, owner) = setup();
        let invitee = recruiter(&mut store.tables().unwrap(), "new@acme.test", None);
        let repo = InMemoryInviteRepository::new(store.clone());
        repo.create_invite(invite(company_id, owner, "digest", Duration::days(7)))
            .await
            .unwrap();
        let open = repo.find_open("digest").await.unwrap().unwrap();

        assert!(repo.accept(&open, invitee).await.unwrap());
        assert!(!repo.accept(&open, invitee).await.unwrap());
        assert!(repo.find_open("digest").await.unwrap().is_none());

        let tables = store.tables().unwrap();
        assert_eq!(tables.recruiters[&invitee].company_id, Some(company_id));
        assert_eq!(tables.recruiters[&invitee].role, "viewer");
        assert_eq!(tables.invites[&open.id].used_by, Some(invitee));
    }

    #[tokio::test]
    async fn test_delete_keeps_the_caller() {
        let (store, company_id, owner) = setup();
        let (invitee, colleague) = {
            let mut tables = store.tables().unwrap();
            let invitee = recruiter(&mut tables, "new@acme.test", Some(company_id));
            let other = recruiter(&mut tables, "other@acme.test", Some(company_id));
            (invitee, other)
        };
        let repo = InMemoryInviteRepository::new(store.clone());
        let id = repo
            .create_invite(invite(company_id, owner, "digest", Duration::days(7)))
            .await
            .unwrap();

        assert!(!repo.delete_with_recruiter(id, company_id + 100, owner).await.unwrap());
        assert!(repo.delete_with_recruiter(id, company_id, owner).await.unwrap());

        let tables = store.tables().unwrap();
        assert!(tables.invites.is_empty());
        assert!(!tables.recruiters.contains_key(&invitee));
        assert!(tables.recruiters.contains_key(&colleague));
        assert!(tables.recruiters.contains_key(&owner));
    }
}
