//! Option keys, their defaults and typed accessors on top of [`OptionStore`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use time::OffsetDateTime;

use crate::config::{AlertsConfig, SiteConfig};
use crate::error::StoreError;
use crate::store::OptionStore;

pub const NOTIFY_TO: &str = "notify_to";
pub const EMAIL_SUBJECT: &str = "email_subject";
pub const EMAILS_PER_HOUR: &str = "emails_per_hour";
pub const MAXIMUM_FAILED_LOGINS: &str = "maximum_failed_logins";
pub const NOTIFY_POST_PUBLICATION: &str = "notify_post_publication";
pub const IGNORED_EVENTS: &str = "ignored_events";
pub const EMAILS_SENT: &str = "emails_sent";
pub const LAST_EMAIL_AT: &str = "last_email_at";

pub const ENABLED: &str = "enabled";
pub const DISABLED: &str = "disabled";

static POST_TYPE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_]+$").expect("valid post-type pattern"));

/// Fallback values for keys that were never written.
#[derive(Clone, Debug)]
pub struct OptionDefaults {
    site: SiteConfig,
    alerts: AlertsConfig,
}

impl OptionDefaults {
    pub fn new(site: SiteConfig, alerts: AlertsConfig) -> Self {
        Self { site, alerts }
    }

    pub fn value(&self, key: &str) -> Option<String> {
        match key {
            NOTIFY_TO => Some(self.site.admin_email.clone()),
            EMAIL_SUBJECT => self.alerts.email_subjects.first().cloned(),
            EMAILS_PER_HOUR => Some("5".to_string()),
            MAXIMUM_FAILED_LOGINS => Some("30".to_string()),
            NOTIFY_POST_PUBLICATION => Some(ENABLED.to_string()),
            EMAILS_SENT => Some("0".to_string()),
            _ => self.alerts.notify_option(key).map(|o| {
                if o.enabled_by_default { ENABLED } else { DISABLED }.to_string()
            }),
        }
    }
}

/// Reads `key`, falling back to its default. Unknown unset keys read as "".
pub async fn read(
    store: &dyn OptionStore,
    defaults: &OptionDefaults,
    key: &str,
) -> Result<String, StoreError> {
    match store.get(key).await? {
        Some(v) => Ok(v),
        None => Ok(defaults.value(key).unwrap_or_default()),
    }
}

pub async fn is_enabled(
    store: &dyn OptionStore,
    defaults: &OptionDefaults,
    key: &str,
) -> Result<bool, StoreError> {
    Ok(read(store, defaults, key).await? == ENABLED)
}

/// Ordered list of alert recipients. Stored as a comma-joined string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecipientList(Vec<String>);

impl RecipientList {
    pub fn parse(raw: &str) -> Self {
        RecipientList(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect(),
        )
    }

    pub fn push(&mut self, address: impl Into<String>) {
        self.0.push(address.into());
    }

    /// Removes the first occurrence of `address`. Returns whether anything
    /// was removed.
    pub fn remove_first(&mut self, address: &str) -> bool {
        match self.0.iter().position(|a| a == address) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RecipientList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

pub async fn recipients(
    store: &dyn OptionStore,
    defaults: &OptionDefaults,
) -> Result<RecipientList, StoreError> {
    Ok(RecipientList::parse(&read(store, defaults, NOTIFY_TO).await?))
}

pub fn is_valid_post_type(name: &str) -> bool {
    POST_TYPE_PATTERN.is_match(name)
}

/// Ignored post-types with the unix timestamp they were ignored at.
pub async fn ignored_events(store: &dyn OptionStore) -> Result<BTreeMap<String, i64>, StoreError> {
    match store.get(IGNORED_EVENTS).await? {
        None => Ok(BTreeMap::new()),
        Some(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
        Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
            key: IGNORED_EVENTS.to_string(),
            source,
        }),
    }
}

async fn save_ignored_events(
    store: &dyn OptionStore,
    events: &BTreeMap<String, i64>,
) -> Result<bool, StoreError> {
    let raw = serde_json::to_string(events).map_err(|source| StoreError::Malformed {
        key: IGNORED_EVENTS.to_string(),
        source,
    })?;
    store.update(IGNORED_EVENTS, &raw).await
}

/// Starts ignoring `post_type`. Returns `Ok(false)` when the name is not a
/// valid post-type or it is already ignored.
#[tracing::instrument(skip(store))]
pub async fn add_ignored_event(store: &dyn OptionStore, post_type: &str) -> Result<bool, StoreError> {
    if !is_valid_post_type(post_type) {
        return Ok(false);
    }
    let mut events = ignored_events(store).await?;
    if events.contains_key(post_type) {
        return Ok(false);
    }
    events.insert(
        post_type.to_string(),
        OffsetDateTime::now_utc().unix_timestamp(),
    );
    save_ignored_events(store, &events).await
}

#[tracing::instrument(skip(store))]
pub async fn remove_ignored_event(store: &dyn OptionStore, post_type: &str) -> Result<(), StoreError> {
    let mut events = ignored_events(store).await?;
    if events.remove(post_type).is_some() {
        save_ignored_events(store, &events).await?;
    }
    Ok(())
}
