use serde::Deserialize;
use thiserror::Error;

use crate::settings::subject::is_valid_custom_subject;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

/// Identity of the site the alerts are about. Used for option defaults and
/// for expanding subject pseudo-tags.
#[derive(Clone, Debug, Deserialize)]
pub struct SiteConfig {
    pub domain: String,
    #[serde(default = "default_hostname")]
    pub hostname: String,
    pub admin_email: String,
}

/// One entry of an enumerated select domain, e.g. `5 => "Maximum 5 per hour"`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

/// A notifiable event type. The label may carry a `user:`, `plugin:` or
/// `theme:` category prefix which is used to pick an icon.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct NotifyOption {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub enabled_by_default: bool,
}

/// Enumerated option domains for the alerts page.
#[derive(Clone, Debug, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_email_subjects")]
    pub email_subjects: Vec<String>,
    #[serde(default = "default_emails_per_hour")]
    pub emails_per_hour: Vec<ChoiceOption>,
    #[serde(default = "default_maximum_failed_logins")]
    pub maximum_failed_logins: Vec<ChoiceOption>,
    #[serde(default = "default_notify_options")]
    pub notify_options: Vec<NotifyOption>,
    /// Post-types registered by the site, in display order.
    #[serde(default = "default_post_types")]
    pub post_types: Vec<String>,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            email_subjects: default_email_subjects(),
            emails_per_hour: default_emails_per_hour(),
            maximum_failed_logins: default_maximum_failed_logins(),
            notify_options: default_notify_options(),
            post_types: default_post_types(),
        }
    }
}

impl AlertsConfig {
    pub fn emails_per_hour_label(&self, value: &str) -> Option<&str> {
        find_label(&self.emails_per_hour, value)
    }

    pub fn maximum_failed_logins_label(&self, value: &str) -> Option<&str> {
        find_label(&self.maximum_failed_logins, value)
    }

    pub fn notify_option(&self, name: &str) -> Option<&NotifyOption> {
        self.notify_options.iter().find(|o| o.name == name)
    }
}

fn find_label<'a>(choices: &'a [ChoiceOption], value: &str) -> Option<&'a str> {
    choices
        .iter()
        .find(|c| c.value == value)
        .map(|c| c.label.as_str())
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub smtp: SmtpConfig,
    pub site: SiteConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn choices(entries: &[(&str, &str)]) -> Vec<ChoiceOption> {
    entries
        .iter()
        .map(|(value, label)| ChoiceOption {
            value: value.to_string(),
            label: label.to_string(),
        })
        .collect()
}

fn default_email_subjects() -> Vec<String> {
    [
        "Security Alert, :domain, :event",
        "Security Alert, :domain, :event, :remoteaddr",
        "Security Alert, :domain, :event, :username",
        "Security Alert, :domain, :event, :email",
        "Security Alert, :event, :remoteaddr",
        "Security Alert, :event",
        "Security Alert, :event, :hostname",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_emails_per_hour() -> Vec<ChoiceOption> {
    choices(&[
        ("5", "Maximum 5 per hour"),
        ("10", "Maximum 10 per hour"),
        ("20", "Maximum 20 per hour"),
        ("40", "Maximum 40 per hour"),
        ("80", "Maximum 80 per hour"),
        ("160", "Maximum 160 per hour"),
        ("unlimited", "Unlimited alerts per hour"),
    ])
}

fn default_maximum_failed_logins() -> Vec<ChoiceOption> {
    choices(&[
        ("30", "30 failed logins per hour"),
        ("60", "60 failed logins per hour"),
        ("120", "120 failed logins per hour"),
        ("240", "240 failed logins per hour"),
        ("480", "480 failed logins per hour"),
    ])
}

fn default_notify_options() -> Vec<NotifyOption> {
    [
        ("notify_plugin_change", "Receive email alerts for changes in the settings of the security plugin", true),
        ("notify_user_registration", "user:Receive email alerts for new user registration", false),
        ("notify_success_login", "user:Receive email alerts for successful login attempts", true),
        ("notify_failed_login", "user:Receive email alerts for failed login attempts", false),
        ("notify_bruteforce_attack", "user:Receive email alerts for password guessing attacks", false),
        ("notify_post_publication", "Receive email alerts for changes in the post status", true),
        ("notify_website_updated", "Receive email alerts when the core is updated", true),
        ("notify_settings_updated", "Receive email alerts when the site settings are updated", true),
        ("notify_theme_editor", "theme:Receive email alerts when a file is modified with the editor", true),
        ("notify_plugin_installed", "plugin:Receive email alerts when a plugin is installed", false),
        ("notify_plugin_activated", "plugin:Receive email alerts when a plugin is activated", true),
        ("notify_plugin_deactivated", "plugin:Receive email alerts when a plugin is deactivated", false),
        ("notify_plugin_updated", "plugin:Receive email alerts when a plugin is updated", false),
        ("notify_plugin_deleted", "plugin:Receive email alerts when a plugin is deleted", false),
        ("notify_theme_installed", "theme:Receive email alerts when a theme is installed", false),
        ("notify_theme_activated", "theme:Receive email alerts when a theme is activated", true),
        ("notify_theme_updated", "theme:Receive email alerts when a theme is updated", false),
        ("notify_theme_deleted", "theme:Receive email alerts when a theme is deleted", false),
    ]
    .iter()
    .map(|(name, label, enabled)| NotifyOption {
        name: name.to_string(),
        label: label.to_string(),
        enabled_by_default: *enabled,
    })
    .collect()
}

fn default_post_types() -> Vec<String> {
    [
        "post",
        "page",
        "attachment",
        "revision",
        "nav_menu_item",
        "custom_css",
        "customize_changeset",
        "oembed_cache",
        "user_request",
        "wp_block",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn validate_alerts(alerts: &AlertsConfig) -> Result<(), ConfigError> {
    if alerts.email_subjects.is_empty() {
        return Err(ConfigError::Validation(
            "alerts.email_subjects must not be empty".into(),
        ));
    }
    if let Some(bad) = alerts
        .email_subjects
        .iter()
        .find(|s| !is_valid_custom_subject(s))
    {
        return Err(ConfigError::Validation(format!(
            "alerts.email_subjects contains unsupported characters: {bad}"
        )));
    }
    if alerts.emails_per_hour.is_empty() || alerts.maximum_failed_logins.is_empty() {
        return Err(ConfigError::Validation(
            "threshold domains must not be empty".into(),
        ));
    }
    if alerts.email_subjects.iter().any(|s| s == "custom") {
        return Err(ConfigError::Validation(
            "\"custom\" is reserved and cannot be a subject template".into(),
        ));
    }
    Ok(())
}

/// Load application configuration from `config.yaml` + environment overrides.
///
/// Any variable matching the key path separated by double underscores
/// (e.g. `SMTP__PORT`, `SITE__DOMAIN`) overrides the file value.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let cfg = Config::builder()
        .add_source(File::with_name("config.yaml"))
        .add_source(Environment::default().separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;

    if app.smtp.port == 0 {
        return Err(ConfigError::Validation("smtp.port must be > 0".into()));
    }
    if app.site.domain.is_empty() {
        return Err(ConfigError::Validation("site.domain must be set".into()));
    }
    validate_alerts(&app.alerts)?;

    Ok(app)
}

/// Convenience helper for binaries wanting the panic-on-error behaviour.
pub fn load_config_or_panic() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => panic!("Failed to load configuration: {e}"),
    }
}
