use contacts_api::{
    ContactError,
    models::{Contact, CreateContactRequest, Role, UpdateContactRequest, WriteResult},
};

#[test]
fn test_contact_json_uses_camel_case() {
    let contact = Contact {
        id: 1,
        name: "Ana".to_string(),
        phone: "555-1".to_string(),
        nickname: None,
        is_favorite: false,
        user_email: "a@x.com".to_string(),
        deleted_at: None,
    };

    let json = serde_json::to_value(&contact).unwrap();

    assert_eq!(json["isFavorite"], false);
    assert_eq!(json["userEmail"], "a@x.com");
    assert!(json["deletedAt"].is_null());
    assert!(json.get("user_email").is_none());
}

#[test]
fn test_create_request_drops_client_supplied_owner() {
    let req: CreateContactRequest = serde_json::from_str(
        r#"{"name":"Ana","phone":"555-1","userEmail":"mallory@x.com"}"#,
    )
    .unwrap();

    let new_contact = req.into_new_contact("a@x.com");
    assert_eq!(new_contact.user_email, "a@x.com");
    assert!(!new_contact.is_favorite);
}

#[test]
fn test_create_request_requires_name_and_phone() {
    let missing_phone = CreateContactRequest {
        name: "Ana".to_string(),
        phone: "   ".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        missing_phone.validate(),
        Err(ContactError::Validation(msg)) if msg.contains("phone")
    ));

    let missing_name = CreateContactRequest {
        phone: "555-1".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        missing_name.validate(),
        Err(ContactError::Validation(msg)) if msg.contains("name")
    ));

    let ok = CreateContactRequest {
        name: "Ana".to_string(),
        phone: "555-1".to_string(),
        ..Default::default()
    };
    assert!(ok.validate().is_ok());
}

#[test]
fn test_create_request_missing_fields_fail_validation() {
    let req: CreateContactRequest = serde_json::from_str(r#"{"name":"Ana"}"#).unwrap();
    assert_eq!(req.phone, "");
    assert!(matches!(
        req.validate(),
        Err(ContactError::Validation(msg)) if msg.contains("phone")
    ));
}

#[test]
fn test_write_result_serializes_as_plain_number() {
    let json = serde_json::to_string(&WriteResult { affected: 1 }).unwrap();
    assert_eq!(json, r#"{"affected":1}"#);
}

#[test]
fn test_update_request_optionality() {
    let partial: UpdateContactRequest = serde_json::from_str(r#"{"name":"Ana B"}"#).unwrap();
    assert!(partial.validate().is_ok());

    let json = serde_json::to_string(&partial).unwrap();
    assert!(json.contains(r#""name":"Ana B""#));
    assert!(!json.contains("phone"));

    let blank: UpdateContactRequest = serde_json::from_str(r#"{"phone":""}"#).unwrap();
    assert!(blank.validate().is_err());

    let empty = UpdateContactRequest::default();
    assert!(empty.validate().is_ok());
}

#[test]
fn test_role_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
    assert_eq!(serde_json::from_str::<Role>(r#""user""#).unwrap(), Role::User);
    assert_eq!(Role::default(), Role::User);
}
