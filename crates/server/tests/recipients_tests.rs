//! Tests for the alert recipients section.

mod common;

use alerts_settings::events::EventLevel;
use alerts_settings::notices::Notices;
use alerts_settings::settings::recipients_section;
use common::{Harness, error_texts, form, notice_texts};

#[tokio::test]
async fn test_add_valid_recipient_appends_once() {
    let h = Harness::with_options([("notify_to", "a@x.com,b@x.com")]);
    let mut notices = Notices::new();
    let submission = form(&[("save_recipient", "1"), ("recipient", "c@x.com")]);

    let html = recipients_section(&h.resources, Some(&submission), &mut notices)
        .await
        .unwrap();

    assert_eq!(h.option("notify_to").as_deref(), Some("a@x.com,b@x.com,c@x.com"));
    assert_eq!(notice_texts(&notices), vec!["Alerts will be sent to: c@x.com"]);
    assert!(notices.errors().next().is_none());
    assert!(html.contains("c@x.com"));

    assert_eq!(
        h.events.reports(),
        vec![(EventLevel::Info, "Alerts will be sent to: c@x.com".to_string())]
    );
    assert_eq!(h.events.notifications()[0].0, "plugin_change");
}

#[tokio::test]
async fn test_add_invalid_recipient_is_rejected() {
    let h = Harness::with_options([("notify_to", "a@x.com")]);
    let mut notices = Notices::new();
    let submission = form(&[("save_recipient", "1"), ("recipient", "not-an-email")]);

    recipients_section(&h.resources, Some(&submission), &mut notices)
        .await
        .unwrap();

    assert_eq!(h.option("notify_to").as_deref(), Some("a@x.com"));
    assert_eq!(error_texts(&notices), vec!["Email format not supported."]);
    assert!(h.events.events().is_empty());
}

#[tokio::test]
async fn test_quoted_address_with_comma_is_rejected() {
    let h = Harness::with_options([("notify_to", "a@x.com")]);
    let mut notices = Notices::new();
    let submission = form(&[("save_recipient", "1"), ("recipient", r#""c,d"@x.com"#)]);

    let html = recipients_section(&h.resources, Some(&submission), &mut notices)
        .await
        .unwrap();

    assert_eq!(h.option("notify_to").as_deref(), Some("a@x.com"));
    assert_eq!(error_texts(&notices), vec!["Email format not supported."]);
    assert_eq!(html.matches(r#"name="recipients[]""#).count(), 1);
    assert!(h.events.events().is_empty());
}

#[tokio::test]
async fn test_duplicates_are_not_deduplicated() {
    let h = Harness::with_options([("notify_to", "a@x.com")]);
    let mut notices = Notices::new();
    let submission = form(&[("save_recipient", "1"), ("recipient", "a@x.com")]);

    recipients_section(&h.resources, Some(&submission), &mut notices)
        .await
        .unwrap();

    assert_eq!(h.option("notify_to").as_deref(), Some("a@x.com,a@x.com"));
}

#[tokio::test]
async fn test_remove_subset_preserves_order_of_survivors() {
    let h = Harness::with_options([("notify_to", "a@x.com,b@x.com,c@x.com,d@x.com")]);
    let mut notices = Notices::new();
    let submission = form(&[
        ("delete_recipients", "1"),
        ("recipients[]", "b@x.com"),
        ("recipients[]", "zzz@x.com"),
        ("recipients[]", "d@x.com"),
    ]);

    let html = recipients_section(&h.resources, Some(&submission), &mut notices)
        .await
        .unwrap();

    assert_eq!(h.option("notify_to").as_deref(), Some("a@x.com,c@x.com"));
    assert_eq!(
        notice_texts(&notices),
        vec!["Alerts will not be sent to: b@x.com, d@x.com"]
    );
    assert!(!html.contains("b@x.com"));
    assert!(html.find("a@x.com").unwrap() < html.find("c@x.com").unwrap());
}

#[tokio::test]
async fn test_remove_unknown_addresses_is_silent() {
    let h = Harness::with_options([("notify_to", "a@x.com")]);
    let mut notices = Notices::new();
    let submission = form(&[("delete_recipients", "1"), ("recipients[]", "z@x.com")]);

    recipients_section(&h.resources, Some(&submission), &mut notices)
        .await
        .unwrap();

    assert_eq!(h.option("notify_to").as_deref(), Some("a@x.com"));
    assert!(notices.is_empty());
    assert!(h.events.events().is_empty());
}

#[tokio::test]
async fn test_test_email_goes_to_every_recipient_even_when_throttled() {
    let now = time::OffsetDateTime::now_utc().unix_timestamp().to_string();
    let h = Harness::with_options([
        ("notify_to", "a@x.com,b@x.com".to_string()),
        ("emails_per_hour", "5".to_string()),
        ("emails_sent", "5".to_string()),
        ("last_email_at", now),
    ]);
    let mut notices = Notices::new();
    let submission = form(&[("debug_email", "1")]);

    recipients_section(&h.resources, Some(&submission), &mut notices)
        .await
        .unwrap();

    let messages = h.mailer.transport().messages().await;
    assert_eq!(messages.len(), 2);
    assert!(messages[0].1.contains("Subject: Test Email Alert"));
    assert!(messages[0].1.contains("Test email alert sent at"));
    assert_eq!(
        notice_texts(&notices),
        vec!["Test email alert sent, check your inbox."]
    );
}

#[tokio::test]
async fn test_default_recipient_is_site_admin() {
    let h = Harness::new();
    let mut notices = Notices::new();

    let html = recipients_section(&h.resources, None, &mut notices)
        .await
        .unwrap();

    assert!(html.contains("admin@example.org"));
    assert!(notices.is_empty());
}

#[tokio::test]
async fn test_unverified_submission_is_ignored() {
    let h = Harness::with_options([("notify_to", "a@x.com")]);
    let mut notices = Notices::new();

    // No submission is passed when the CSRF check failed.
    recipients_section(&h.resources, None, &mut notices)
        .await
        .unwrap();

    assert_eq!(h.option("notify_to").as_deref(), Some("a@x.com"));
    assert!(notices.is_empty());
}
