use crate::{
    AppState,
    auth::Principal,
    error::ContactError,
    models::{Contact, CreateContactRequest, UpdateContactRequest, WriteResult},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

// --- Handlers ---

/// get_me
///
/// [Authenticated Route] Returns the resolved principal (email and current role).
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Current principal", body = Principal),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_me(principal: Principal) -> Json<Principal> {
    Json(principal)
}

/// create_contact
///
/// [Authenticated Route] Creates a contact owned by the caller. Any owner sent in the
/// body is ignored.
#[utoipa::path(
    post,
    path = "/contacts",
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Created", body = Contact),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_contact(
    principal: Principal,
    State(state): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<Contact>), ContactError> {
    payload.validate()?;
    let contact = state.contacts.create(payload, &principal).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// list_contacts
///
/// [Authenticated Route] Lists the caller's active contacts. Under
/// `ADMIN_LIST_SCOPE=all`, admins receive every active contact instead.
#[utoipa::path(
    get,
    path = "/contacts",
    responses((status = 200, description = "Caller's contacts (every active contact for admins when ADMIN_LIST_SCOPE=all)", body = [Contact]))
)]
pub async fn list_contacts(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<Vec<Contact>>, ContactError> {
    Ok(Json(state.contacts.list_all(&principal).await?))
}

/// get_contact
///
/// [Authenticated Route] Fetches one contact. Owner or admin only.
#[utoipa::path(
    get,
    path = "/contacts/{id}",
    params(("id" = i64, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Found", body = Contact),
        (status = 400, description = "Contact not found"),
        (status = 401, description = "Not owner")
    )
)]
pub async fn get_contact(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Contact>, ContactError> {
    Ok(Json(state.contacts.get_one(id, &principal).await?))
}

/// update_contact
///
/// [Authenticated Route] Partially updates a contact. Owner or admin only.
#[utoipa::path(
    patch,
    path = "/contacts/{id}",
    params(("id" = i64, Path, description = "Contact ID")),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Updated", body = WriteResult),
        (status = 400, description = "Contact not found or invalid payload"),
        (status = 401, description = "Not owner")
    )
)]
pub async fn update_contact(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateContactRequest>,
) -> Result<Json<WriteResult>, ContactError> {
    payload.validate()?;
    Ok(Json(state.contacts.update(id, payload, &principal).await?))
}

/// delete_contact
///
/// [Authenticated Route] Soft-deletes a contact. Owner or admin only.
#[utoipa::path(
    delete,
    path = "/contacts/{id}",
    params(("id" = i64, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Deleted", body = WriteResult),
        (status = 400, description = "Contact not found"),
        (status = 401, description = "Not owner")
    )
)]
pub async fn delete_contact(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<WriteResult>, ContactError> {
    Ok(Json(state.contacts.remove(id, &principal).await?))
}
