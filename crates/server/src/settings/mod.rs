//! Section handlers of the alerts settings page.
//!
//! Every handler has the same shape: read the current state, apply at most
//! one mutation from a verified submission (reporting the outcome as a
//! notice), then render its fragment. Handlers never call each other.

use askama::Template;
use std::collections::HashMap;

use crate::SettingsResources;
use crate::error::SettingsError;
use crate::notices::{Message, Notices};
use crate::templates::{AlertsPageTemplate, NoticesTemplate, SelectOption};

pub mod brute_force;
pub mod events;
pub mod ignore_posts;
pub mod per_hour;
pub mod recipients;
pub mod subject;
pub mod trusted_ips;

pub use brute_force::brute_force_section;
pub use events::events_section;
pub use ignore_posts::ignore_posts_section;
pub use per_hour::per_hour_section;
pub use recipients::recipients_section;
pub use subject::subject_section;
pub use trusted_ips::trusted_ips_section;

/// Event type used for alerts about changes to these settings.
pub const PLUGIN_CHANGE: &str = "plugin_change";

/// Fields of a POSTed form whose CSRF token was already verified.
///
/// Repeated fields keep every value; `name[]` is stored as `name`.
#[derive(Clone, Debug, Default)]
pub struct Submission {
    fields: HashMap<String, Vec<String>>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |form, (k, v)| form.with(k.as_ref(), v))
    }

    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        let name = field.strip_suffix("[]").unwrap_or(field);
        self.fields
            .entry(name.to_string())
            .or_default()
            .push(value.into());
        self
    }

    pub fn is_present(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Last submitted value of `field`.
    pub fn value(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|v| v.last())
            .map(String::as_str)
    }

    /// The value of `field` unless it is missing, empty or `"0"`.
    pub fn truthy(&self, field: &str) -> Option<&str> {
        self.value(field).filter(|v| !v.is_empty() && *v != "0")
    }

    pub fn values(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `Some(true)` for `"1"`, `Some(false)` for `"0"`, `None` otherwise.
    pub fn flag(&self, field: &str) -> Option<bool> {
        match self.value(field) {
            Some("1") => Some(true),
            Some("0") => Some(false),
            _ => None,
        }
    }

    /// The value of `field` if it is one of `allowed`.
    pub fn choice<'a>(&self, field: &str, allowed: &[&'a str]) -> Option<&'a str> {
        let value = self.value(field)?;
        allowed.iter().copied().find(|a| *a == value)
    }
}

/// Writes `value` under `key`, turning a store failure into an error notice.
pub(crate) async fn persist(
    res: &SettingsResources,
    notices: &mut Notices,
    key: &str,
    value: &str,
) -> bool {
    match res.options.update(key, value).await {
        Ok(_) => true,
        Err(e) => {
            tracing::error!(
                name = "settings.persist.failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                transient = e.is_transient(),
                key = %key,
                message = "Failed to save option"
            );
            notices.error(Message::with_code(
                "The setting ",
                key,
                " could not be saved.",
            ));
            false
        }
    }
}

/// Info notice, info audit event and a `plugin_change` alert for a change.
pub(crate) async fn announce(res: &SettingsResources, notices: &mut Notices, message: Message) {
    let text = message.to_string();
    res.events.report_info(&text).await;
    res.events.notify(PLUGIN_CHANGE, &text).await;
    notices.info(message);
}

/// `"new_user_registration"` -> `"New User Registration"`.
pub fn title_case(s: &str) -> String {
    s.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn select_options(
    choices: &[crate::config::ChoiceOption],
    current: &str,
) -> Vec<SelectOption> {
    choices
        .iter()
        .map(|c| SelectOption {
            value: c.value.clone(),
            label: c.label.clone(),
            selected: c.value == current,
        })
        .collect()
}

pub(crate) fn format_datetime(at: time::OffsetDateTime) -> String {
    let fmt = time::macros::format_description!("[year]/[month]/[day] [hour]:[minute]:[second]");
    at.format(fmt).unwrap_or_else(|_| at.unix_timestamp().to_string())
}

/// Renders every section in page order, preceded by the notices they raised.
#[tracing::instrument(skip_all, fields(submitted = form.is_some()))]
pub async fn render_alerts_page(
    res: &SettingsResources,
    form: Option<&Submission>,
) -> Result<String, SettingsError> {
    let mut notices = Notices::new();
    let sections = vec![
        recipients_section(res, form, &mut notices).await?,
        subject_section(res, form, &mut notices).await?,
        per_hour_section(res, form, &mut notices).await?,
        brute_force_section(res, form, &mut notices).await?,
        events_section(res, form, &mut notices).await?,
        ignore_posts_section(res, form, &mut notices).await?,
        trusted_ips_section(res, form, &mut notices).await?,
    ];

    let notices = NoticesTemplate {
        notices: notices.as_slice(),
    }
    .render()?;

    Ok(AlertsPageTemplate { notices, sections }.render()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_accessors() {
        let form = Submission::from_pairs([
            ("recipients[]", "a@x.com"),
            ("recipients[]", "b@x.com"),
            ("notify_x", "0"),
            ("notify_x", "1"),
            ("empty", ""),
            ("action", "remove"),
        ]);
        assert_eq!(form.values("recipients"), ["a@x.com", "b@x.com"]);
        assert_eq!(form.flag("notify_x"), Some(true));
        assert_eq!(form.truthy("empty"), None);
        assert!(form.is_present("empty"));
        assert_eq!(form.choice("action", &["add", "remove"]), Some("remove"));
        assert_eq!(form.choice("action", &["add"]), None);
        assert!(form.values("missing").is_empty());
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("nav_menu_item"), "Nav Menu Item");
        assert_eq!(title_case("plugin_change"), "Plugin Change");
        assert_eq!(title_case("page"), "Page");
    }

    #[test]
    fn datetime_format() {
        let at = time::macros::datetime!(2024-03-05 07:08:09 UTC);
        assert_eq!(format_datetime(at), "2024/03/05 07:08:09");
    }
}
