use askama::Template;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{Submission, announce};
use crate::SettingsResources;
use crate::error::SettingsError;
use crate::notices::{Message, Notices};
use crate::options::{self, DISABLED, ENABLED};
use crate::templates::{EventRow, EventsTemplate};

static LABEL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z]+:)?(.+)").expect("valid label pattern"));

/// Splits an optional `group:` prefix off an event label and maps the group
/// to an icon class.
pub fn label_icon(label: &str) -> (&'static str, &str) {
    let Some(caps) = LABEL_PATTERN.captures(label) else {
        return ("", label);
    };
    let text = caps.get(2).map_or(label, |m| m.as_str());
    let icon = match caps.get(1).map(|m| m.as_str().trim_end_matches(':')) {
        Some("user") => "dashicons-before dashicons-admin-users",
        Some("plugin") => "dashicons-before dashicons-admin-plugins",
        Some("theme") => "dashicons-before dashicons-admin-appearance",
        _ => "",
    };
    (icon, text)
}

/// Which event types trigger an alert email.
#[tracing::instrument(skip_all)]
pub async fn events_section(
    res: &SettingsResources,
    form: Option<&Submission>,
    notices: &mut Notices,
) -> Result<String, SettingsError> {
    if let Some(form) = form.filter(|f| f.is_present("save_alert_events")) {
        let mut changed = 0;

        for option in &res.config.notify_options {
            let Some(enabled) = form.flag(&option.name) else {
                continue;
            };
            let value = if enabled { ENABLED } else { DISABLED };
            let current = options::read(res.options.as_ref(), &res.defaults, &option.name).await?;
            if current == value {
                continue;
            }

            match res.options.update(&option.name, value).await {
                Ok(true) => changed += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        name = "settings.events.update_failed",
                        target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                        error = %e,
                        option = %option.name,
                        message = "Failed to save alert event toggle"
                    );
                }
            }
        }

        if changed > 0 {
            announce(
                res,
                notices,
                Message::from(format!("A total of {changed} alert events were changed")),
            )
            .await;
        }
    }

    let mut events = Vec::with_capacity(res.config.notify_options.len());
    for option in &res.config.notify_options {
        let checked = options::is_enabled(res.options.as_ref(), &res.defaults, &option.name).await?;
        let (icon, label) = label_icon(&option.label);
        events.push(EventRow {
            name: option.name.clone(),
            label: label.to_string(),
            icon,
            checked,
        });
    }

    Ok(EventsTemplate { events }.render()?)
}
