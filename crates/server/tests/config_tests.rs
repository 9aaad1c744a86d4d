use alerts_settings::config::{AlertsConfig, AppConfig, SmtpConfig};
use config::Config;

fn build(yaml: &str) -> Config {
    Config::builder()
        .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
        .build()
        .expect("Failed to build config")
}

#[test]
fn test_smtp_config_deserialization() {
    let yaml_content = r#"
server: "smtp.example.com"
port: 587
username: "user@example.com"
password: "secret123"
from: "alerts@example.com"
"#;

    let smtp_config: SmtpConfig = build(yaml_content)
        .try_deserialize()
        .expect("Failed to deserialize SMTP config");
    assert_eq!(smtp_config.server, "smtp.example.com");
    assert_eq!(smtp_config.port, 587);
    assert_eq!(smtp_config.username, "user@example.com");
    assert_eq!(smtp_config.password, "secret123");
    assert_eq!(smtp_config.from, "alerts@example.com");
}

#[test]
fn test_app_config_uses_default_alert_domains() {
    let yaml_content = r#"
database_url: "sqlite::memory:"
smtp:
  server: "smtp.example.com"
  port: 587
  username: "user@example.com"
  password: "secret123"
  from: "alerts@example.com"
site:
  domain: "example.com"
  admin_email: "admin@example.com"
"#;

    let app_config: AppConfig = build(yaml_content)
        .try_deserialize()
        .expect("Failed to deserialize app config");
    assert_eq!(app_config.database_url, "sqlite::memory:");
    assert_eq!(app_config.site.domain, "example.com");
    assert_eq!(app_config.site.hostname, "localhost");

    let defaults = AlertsConfig::default();
    assert_eq!(app_config.alerts.email_subjects, defaults.email_subjects);
    assert_eq!(app_config.alerts.emails_per_hour, defaults.emails_per_hour);
    assert_eq!(app_config.alerts.notify_options.len(), 18);
}

#[test]
fn test_alert_domains_can_be_overridden() {
    let yaml_content = r#"
database_url: "sqlite::memory:"
smtp:
  server: "smtp.example.com"
  port: 25
  username: "u"
  password: "p"
  from: "alerts@example.com"
site:
  domain: "example.com"
  hostname: "web1"
  admin_email: "admin@example.com"
alerts:
  emails_per_hour:
    - value: "1"
      label: "Maximum 1 per hour"
  post_types: ["news", "page"]
  notify_options:
    - name: "notify_post_publication"
      label: "New content"
      enabled_by_default: true
"#;

    let app_config: AppConfig = build(yaml_content)
        .try_deserialize()
        .expect("Failed to deserialize app config");
    let alerts = app_config.alerts;
    assert_eq!(alerts.emails_per_hour_label("1"), Some("Maximum 1 per hour"));
    assert_eq!(alerts.emails_per_hour_label("5"), None);
    assert_eq!(alerts.post_types, vec!["news", "page"]);
    assert!(
        alerts
            .notify_option("notify_post_publication")
            .is_some_and(|o| o.enabled_by_default)
    );
    // Untouched domains keep their defaults.
    assert_eq!(
        alerts.maximum_failed_logins,
        AlertsConfig::default().maximum_failed_logins
    );
}

#[test]
fn test_missing_site_fails() {
    let yaml_content = r#"
database_url: "sqlite::memory:"
smtp:
  server: "smtp.example.com"
  port: 587
  username: "u"
  password: "p"
  from: "alerts@example.com"
"#;

    let result: Result<AppConfig, _> = build(yaml_content).try_deserialize();
    assert!(result.is_err());
}
