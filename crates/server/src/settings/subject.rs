use askama::Template;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{Submission, announce, persist};
use crate::SettingsResources;
use crate::error::SettingsError;
use crate::notices::{Message, Notices};
use crate::options::{self, EMAIL_SUBJECT};
use crate::templates::{SubjectRow, SubjectTemplate};

/// Form value selecting a free-text subject format.
pub const CUSTOM: &str = "custom";

static CUSTOM_SUBJECT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-zA-Z:,\s]+$").expect("valid subject pattern"));

pub fn is_valid_custom_subject(subject: &str) -> bool {
    CUSTOM_SUBJECT_PATTERN.is_match(subject)
}

/// Values substituted for the pseudo-tags of a subject format. Missing
/// values expand to `unknown`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubjectVars<'a> {
    pub domain: &'a str,
    pub event: &'a str,
    pub hostname: &'a str,
    pub remote_addr: Option<&'a str>,
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
}

pub fn expand_subject(format: &str, vars: &SubjectVars<'_>) -> String {
    let or_unknown = |v: Option<&str>| v.filter(|s| !s.is_empty()).unwrap_or("unknown").to_string();
    [
        (":domain", vars.domain.to_string()),
        (":event", vars.event.to_string()),
        (":hostname", vars.hostname.to_string()),
        (":remoteaddr", or_unknown(vars.remote_addr)),
        (":username", or_unknown(vars.username)),
        (":email", or_unknown(vars.email)),
    ]
    .iter()
    .fold(format.to_string(), |subject, (tag, value)| {
        subject.replace(tag, value)
    })
}

/// Subject format of the alert emails: one of the configured templates or a
/// custom pattern.
#[tracing::instrument(skip_all)]
pub async fn subject_section(
    res: &SettingsResources,
    form: Option<&Submission>,
    notices: &mut Notices,
) -> Result<String, SettingsError> {
    if let Some(chosen) = form.and_then(|f| f.truthy("email_subject").map(|v| (f, v))) {
        let (form, email_subject) = chosen;
        let current = options::read(res.options.as_ref(), &res.defaults, EMAIL_SUBJECT).await?;

        let new_subject = if email_subject == CUSTOM {
            match form.value("custom_email_subject") {
                Some(custom) if !custom.trim().is_empty() && is_valid_custom_subject(custom) => {
                    Some(custom.trim().to_string())
                }
                _ => {
                    notices.error("Invalid characters in the email subject.");
                    None
                }
            }
        } else if res.config.email_subjects.iter().any(|s| s == email_subject) {
            Some(email_subject.trim().to_string())
        } else {
            None
        };

        if let Some(new_subject) = new_subject.filter(|s| *s != current) {
            if persist(res, notices, EMAIL_SUBJECT, &new_subject).await {
                announce(
                    res,
                    notices,
                    Message::with_code("Email subject set to ", new_subject, ""),
                )
                .await;
            }
        }
    }

    let stored = options::read(res.options.as_ref(), &res.defaults, EMAIL_SUBJECT).await?;
    let subjects: Vec<SubjectRow> = res
        .config
        .email_subjects
        .iter()
        .map(|s| SubjectRow {
            value: s.clone(),
            checked: *s == stored,
        })
        .collect();
    let is_official = subjects.iter().any(|row| row.checked);

    Ok(SubjectTemplate {
        subjects,
        custom_checked: !is_official,
        custom_value: if is_official { String::new() } else { stored },
    }
    .render()?)
}
