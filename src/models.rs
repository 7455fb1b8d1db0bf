use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ContactError;

// --- Identity ---

/// Role
///
/// The closed set of roles a principal can hold. Stored as the Postgres enum `user_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// User
///
/// Account record from the `users` table. The authentication layer resolves the
/// principal's current role from here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub imagen_url: Option<String>,
    pub role: Role,
    #[ts(type = "string | null")]
    pub deleted_at: Option<DateTime<Utc>>,
}

// --- Contacts ---

/// Contact
///
/// One entry of a user's address book, from the `contacts` table.
/// `user_email` is the owner; `deleted_at` is set once the contact is soft-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub nickname: Option<String>,
    pub is_favorite: bool,
    pub user_email: String,
    #[ts(type = "string | null")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// NewContact
///
/// Insert payload handed to the repository. The owner is always supplied by the
/// caller's principal, never by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContact {
    pub name: String,
    pub phone: String,
    pub nickname: Option<String>,
    pub is_favorite: bool,
    pub user_email: String,
}

/// ContactChanges
///
/// Partial update handed to the repository. `None` fields keep their stored value;
/// the owner column is always written.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContactChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub nickname: Option<String>,
    pub is_favorite: Option<bool>,
    pub user_email: String,
}

/// ContactFilter
///
/// Selection for `Repository::find`. An empty filter matches every active contact.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContactFilter {
    pub owner: Option<String>,
}

impl ContactFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn owned_by(email: impl Into<String>) -> Self {
        Self {
            owner: Some(email.into()),
        }
    }
}

// --- Request Payloads (Input Schemas) ---

/// CreateContactRequest
///
/// Input payload for POST /contacts. Any owner field sent by the client is dropped
/// during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateContactRequest {
    // Missing fields default to "" so `validate` reports them like blank ones.
    #[serde(default)]
    #[schema(example = "Ana")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "555-1")]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl CreateContactRequest {
    /// Rejects blank required fields.
    pub fn validate(&self) -> Result<(), ContactError> {
        require_text("name", Some(&self.name))?;
        require_text("phone", Some(&self.phone))
    }

    pub fn into_new_contact(self, owner: &str) -> NewContact {
        NewContact {
            name: self.name,
            phone: self.phone,
            nickname: self.nickname,
            is_favorite: self.is_favorite.unwrap_or(false),
            user_email: owner.to_string(),
        }
    }
}

/// UpdateContactRequest
///
/// Partial update payload for PATCH /contacts/{id}. Only provided fields are written.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateContactRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl UpdateContactRequest {
    /// Rejects provided-but-blank required fields. Absent fields are fine.
    pub fn validate(&self) -> Result<(), ContactError> {
        if self.name.is_some() {
            require_text("name", self.name.as_ref())?;
        }
        if self.phone.is_some() {
            require_text("phone", self.phone.as_ref())?;
        }
        Ok(())
    }

    pub fn into_changes(self, owner: String) -> ContactChanges {
        ContactChanges {
            name: self.name,
            phone: self.phone,
            nickname: self.nickname,
            is_favorite: self.is_favorite,
            user_email: owner,
        }
    }
}

fn require_text(field: &str, value: Option<&String>) -> Result<(), ContactError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(ContactError::Validation(format!("{field} must not be empty"))),
    }
}

// --- Output Schemas ---

/// WriteResult
///
/// Outcome of an update or soft delete: how many rows the storage layer touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct WriteResult {
    #[ts(type = "number")]
    pub affected: u64,
}
