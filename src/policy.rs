use crate::{
    auth::Principal,
    error::ContactError,
    models::{Contact, Role},
};

/// AccessPolicy
///
/// The single authorization rule for contact records: admins may touch any contact,
/// everyone else only the contacts they own.
pub struct AccessPolicy;

impl AccessPolicy {
    /// authorize
    ///
    /// Pure predicate over `(contact, principal)`. Returns `ContactError::Unauthorized`
    /// when the principal is a plain user and `contact.user_email` is not theirs.
    pub fn authorize(contact: &Contact, principal: &Principal) -> Result<(), ContactError> {
        match principal.role {
            Role::Admin => Ok(()),
            Role::User if contact.user_email == principal.email => Ok(()),
            Role::User => Err(ContactError::Unauthorized),
        }
    }
}
