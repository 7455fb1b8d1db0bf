use crate::{
    error::StorageError,
    models::{Contact, ContactChanges, ContactFilter, NewContact, User},
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::RwLock;

pub type RepoResult<T> = Result<T, StorageError>;

/// Repository Trait
///
/// The persistence contract the contact operations are written against. Every read
/// excludes soft-deleted rows; generated ids and uniqueness belong to the backend.
///
/// **Send + Sync + async_trait** keep `Arc<dyn Repository>` usable across Axum's
/// task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Contacts ---
    async fn save(&self, contact: NewContact) -> RepoResult<Contact>;
    async fn find(&self, filter: &ContactFilter) -> RepoResult<Vec<Contact>>;
    async fn find_one_by_id(&self, id: i64) -> RepoResult<Option<Contact>>;
    // Merges `changes` onto an active row; returns the number of rows written.
    async fn update(&self, id: i64, changes: ContactChanges) -> RepoResult<u64>;
    // Stamps `deleted_at`; returns the number of rows written.
    async fn soft_delete(&self, id: i64) -> RepoResult<u64>;

    // --- Users/Auth ---
    async fn get_user(&self, email: &str) -> RepoResult<Option<User>>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const CONTACT_COLUMNS: &str = "id, name, phone, nickname, is_favorite, user_email, deleted_at";

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// save
    ///
    /// Inserts a contact and returns the stored row with its generated id.
    async fn save(&self, contact: NewContact) -> RepoResult<Contact> {
        let query = format!(
            "INSERT INTO contacts (name, phone, nickname, is_favorite, user_email) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {CONTACT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Contact>(&query)
            .bind(contact.name)
            .bind(contact.phone)
            .bind(contact.nickname)
            .bind(contact.is_favorite)
            .bind(contact.user_email)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// find
    ///
    /// Lists active contacts, optionally restricted to one owner, in id order.
    async fn find(&self, filter: &ContactFilter) -> RepoResult<Vec<Contact>> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE deleted_at IS NULL"
        ));

        if let Some(owner) = &filter.owner {
            builder.push(" AND user_email = ");
            builder.push_bind(owner.clone());
        }

        builder.push(" ORDER BY id ASC");

        let rows = builder
            .build_query_as::<Contact>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_one_by_id(&self, id: i64) -> RepoResult<Option<Contact>> {
        let query =
            format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1 AND deleted_at IS NULL");
        let row = sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// update
    ///
    /// Uses `COALESCE` so only the `Some` fields of `changes` overwrite stored values.
    async fn update(&self, id: i64, changes: ContactChanges) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE contacts
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                nickname = COALESCE($4, nickname),
                is_favorite = COALESCE($5, is_favorite),
                user_email = $6
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.phone)
        .bind(changes.nickname)
        .bind(changes.is_favorite)
        .bind(changes.user_email)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn soft_delete(&self, id: i64) -> RepoResult<u64> {
        let result = sqlx::query(
            "UPDATE contacts SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// get_user
    ///
    /// Resolves an active account by email for the authentication layer.
    async fn get_user(&self, email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, imagen_url, role, deleted_at FROM users \
             WHERE email = $1 AND deleted_at IS NULL",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

// --- In-Memory Implementation (tests, local demos) ---

#[derive(Default)]
struct Tables {
    contacts: BTreeMap<i64, Contact>,
    users: Vec<User>,
    next_id: i64,
    writes: usize,
}

/// InMemoryRepository
///
/// A `Repository` kept entirely in process memory. Soft-deleted rows are retained
/// and hidden from reads, like the Postgres backend. `new_failing` builds an
/// instance whose every call returns `StorageError::Unavailable`.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
    should_fail: bool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                users,
                ..Tables::default()
            }),
            should_fail: false,
        }
    }

    /// Returns a stored contact even if it has been soft-deleted.
    pub async fn raw_contact(&self, id: i64) -> Option<Contact> {
        self.tables.read().await.contacts.get(&id).cloned()
    }

    /// Number of insert/update/soft-delete calls that reached the store.
    pub async fn write_count(&self) -> usize {
        self.tables.read().await.writes
    }

    fn check(&self) -> RepoResult<()> {
        if self.should_fail {
            return Err(StorageError::Unavailable("simulated failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn save(&self, contact: NewContact) -> RepoResult<Contact> {
        self.check()?;
        let mut tables = self.tables.write().await;
        tables.next_id += 1;
        tables.writes += 1;
        let stored = Contact {
            id: tables.next_id,
            name: contact.name,
            phone: contact.phone,
            nickname: contact.nickname,
            is_favorite: contact.is_favorite,
            user_email: contact.user_email,
            deleted_at: None,
        };
        tables.contacts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find(&self, filter: &ContactFilter) -> RepoResult<Vec<Contact>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .contacts
            .values()
            .filter(|c| c.deleted_at.is_none())
            .filter(|c| filter.owner.as_ref().is_none_or(|o| &c.user_email == o))
            .cloned()
            .collect())
    }

    async fn find_one_by_id(&self, id: i64) -> RepoResult<Option<Contact>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .contacts
            .get(&id)
            .filter(|c| c.deleted_at.is_none())
            .cloned())
    }

    async fn update(&self, id: i64, changes: ContactChanges) -> RepoResult<u64> {
        self.check()?;
        let mut tables = self.tables.write().await;
        tables.writes += 1;
        let Some(contact) = tables
            .contacts
            .get_mut(&id)
            .filter(|c| c.deleted_at.is_none())
        else {
            return Ok(0);
        };
        if let Some(name) = changes.name {
            contact.name = name;
        }
        if let Some(phone) = changes.phone {
            contact.phone = phone;
        }
        if let Some(nickname) = changes.nickname {
            contact.nickname = Some(nickname);
        }
        if let Some(is_favorite) = changes.is_favorite {
            contact.is_favorite = is_favorite;
        }
        contact.user_email = changes.user_email;
        Ok(1)
    }

    async fn soft_delete(&self, id: i64) -> RepoResult<u64> {
        self.check()?;
        let mut tables = self.tables.write().await;
        tables.writes += 1;
        match tables
            .contacts
            .get_mut(&id)
            .filter(|c| c.deleted_at.is_none())
        {
            Some(contact) => {
                contact.deleted_at = Some(Utc::now());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn get_user(&self, email: &str) -> RepoResult<Option<User>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }
}
