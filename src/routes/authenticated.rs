use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// Authenticated Router Module
///
/// Routes that require a resolved `Principal`. Ownership and the admin override are
/// enforced by `ContactStore`/`AccessPolicy`, not here.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        .route("/me", get(handlers::get_me))
        // GET/POST /contacts
        .route(
            "/contacts",
            get(handlers::list_contacts).post(handlers::create_contact),
        )
        // GET/PATCH/DELETE /contacts/{id}
        // Single-record access; owner or admin only.
        .route(
            "/contacts/{id}",
            get(handlers::get_contact)
                .patch(handlers::update_contact)
                .delete(handlers::delete_contact),
        )
}
