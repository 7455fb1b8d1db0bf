use crate::{
    auth::Principal,
    config::{AdminListScope, AppConfig, UpdateOwnership},
    error::ContactError,
    models::{Contact, ContactFilter, CreateContactRequest, UpdateContactRequest, WriteResult},
    policy::AccessPolicy,
    repository::RepositoryState,
};

/// ContactStore
///
/// CRUD orchestration over contacts with ownership enforcement. Holds no state of
/// its own beyond the shared repository handle and the two listing/ownership knobs.
/// Storage errors are propagated unmodified as `ContactError::Storage`.
#[derive(Clone)]
pub struct ContactStore {
    repo: RepositoryState,
    admin_list_scope: AdminListScope,
    update_ownership: UpdateOwnership,
}

impl ContactStore {
    pub fn new(
        repo: RepositoryState,
        admin_list_scope: AdminListScope,
        update_ownership: UpdateOwnership,
    ) -> Self {
        Self {
            repo,
            admin_list_scope,
            update_ownership,
        }
    }

    pub fn from_config(repo: RepositoryState, config: &AppConfig) -> Self {
        Self::new(repo, config.admin_list_scope, config.update_ownership)
    }

    /// create
    ///
    /// Inserts a contact owned by `principal`. No authorization check: the caller is the owner.
    pub async fn create(
        &self,
        payload: CreateContactRequest,
        principal: &Principal,
    ) -> Result<Contact, ContactError> {
        let contact = self
            .repo
            .save(payload.into_new_contact(&principal.email))
            .await?;
        tracing::debug!(id = contact.id, owner = %contact.user_email, "contact created");
        Ok(contact)
    }

    /// list_all
    ///
    /// Plain users always get their own active contacts. Admins get their own contacts
    /// under `AdminListScope::Own` and every active contact under `AdminListScope::All`.
    pub async fn list_all(&self, principal: &Principal) -> Result<Vec<Contact>, ContactError> {
        let filter = if principal.is_admin() && self.admin_list_scope == AdminListScope::All {
            ContactFilter::all()
        } else {
            ContactFilter::owned_by(principal.email.as_str())
        };
        Ok(self.repo.find(&filter).await?)
    }

    /// get_one
    ///
    /// `NotFound` for missing or soft-deleted ids, then `AccessPolicy::authorize`.
    pub async fn get_one(&self, id: i64, principal: &Principal) -> Result<Contact, ContactError> {
        let contact = self
            .repo
            .find_one_by_id(id)
            .await?
            .ok_or(ContactError::NotFound(id))?;

        AccessPolicy::authorize(&contact, principal).inspect_err(|_| {
            tracing::warn!(id, principal = %principal.email, "contact access denied");
        })?;

        Ok(contact)
    }

    /// update
    ///
    /// Runs `get_one` first, so a missing or foreign contact fails before any write.
    /// The owner column is re-stamped according to `UpdateOwnership`.
    pub async fn update(
        &self,
        id: i64,
        payload: UpdateContactRequest,
        principal: &Principal,
    ) -> Result<WriteResult, ContactError> {
        let existing = self.get_one(id, principal).await?;

        let owner = match self.update_ownership {
            UpdateOwnership::Restamp => principal.email.clone(),
            UpdateOwnership::Preserve => existing.user_email,
        };

        let affected = self.repo.update(id, payload.into_changes(owner)).await?;
        Ok(WriteResult { affected })
    }

    /// remove
    ///
    /// Runs `get_one` first, then soft-deletes. Active → deleted is one-way.
    pub async fn remove(&self, id: i64, principal: &Principal) -> Result<WriteResult, ContactError> {
        self.get_one(id, principal).await?;

        let affected = self.repo.soft_delete(id).await?;
        tracing::debug!(id, principal = %principal.email, "contact soft-deleted");
        Ok(WriteResult { affected })
    }
}
