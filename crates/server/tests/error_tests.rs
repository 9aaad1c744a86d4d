use alerts_settings::error::{MailError, SettingsError, StoreError};
use std::error::Error;

#[test]
fn test_store_error_transience() {
    let acquire = StoreError::from(sea_orm::DbErr::ConnectionAcquire(
        sea_orm::ConnAcquireErr::Timeout,
    ));
    assert!(acquire.to_string().starts_with("Database error:"));
    assert!(acquire.is_transient());

    let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let malformed = StoreError::Malformed {
        key: "ignored_events".to_string(),
        source: json_err,
    };
    assert!(
        malformed
            .to_string()
            .starts_with("Malformed stored value for ignored_events:")
    );
    assert!(!malformed.is_transient());
    assert!(malformed.source().is_some());

    let custom = StoreError::from(sea_orm::DbErr::Custom("boom".to_string()));
    assert!(matches!(custom, StoreError::Database(_)));
    assert!(!custom.is_transient());
}

#[test]
fn test_mail_error_wraps_store_error() {
    let store_err = StoreError::from(sea_orm::DbErr::Custom("down".to_string()));
    let mail_err: MailError = store_err.into();
    assert!(matches!(mail_err, MailError::Store(_)));
    assert!(mail_err.to_string().contains("down"));

    let address = MailError::Address {
        address: "nope".to_string(),
        reason: "missing domain".to_string(),
    };
    assert_eq!(address.to_string(), "Invalid address nope: missing domain");
}

#[test]
fn test_settings_error_from_store_error() {
    let err: SettingsError = StoreError::from(sea_orm::DbErr::Custom("down".to_string())).into();
    assert!(matches!(err, SettingsError::Store(_)));
    assert!(err.to_string().contains("down"));
}
