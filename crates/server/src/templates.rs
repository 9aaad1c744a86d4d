//! HTML fragments for the alerts settings page (Askama).
//!
//! One template per section. Values are HTML-escaped by Askama; only the
//! page template embeds pre-rendered sections.

use askama::Template;

use crate::notices::Notice;

#[derive(Template)]
#[template(path = "notices.html")]
pub struct NoticesTemplate<'a> {
    pub notices: &'a [Notice],
}

#[derive(Template)]
#[template(path = "alerts_page.html")]
pub struct AlertsPageTemplate {
    pub notices: String,
    pub sections: Vec<String>,
}

#[derive(Template)]
#[template(path = "recipients.html")]
pub struct RecipientsTemplate {
    pub recipients: Vec<String>,
}

pub struct TrustedIpRow {
    pub cache_key: String,
    pub remote_addr: String,
    pub cidr_format: String,
    pub added_at: String,
}

#[derive(Template)]
#[template(path = "trusted_ips.html")]
pub struct TrustedIpsTemplate {
    pub rows: Vec<TrustedIpRow>,
    pub no_items_visibility: &'static str,
}

pub struct SubjectRow {
    pub value: String,
    pub checked: bool,
}

#[derive(Template)]
#[template(path = "subject.html")]
pub struct SubjectTemplate {
    pub subjects: Vec<SubjectRow>,
    pub custom_checked: bool,
    pub custom_value: String,
}

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "per_hour.html")]
pub struct PerHourTemplate {
    pub options: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "brute_force.html")]
pub struct BruteForceTemplate {
    pub options: Vec<SelectOption>,
}

pub struct EventRow {
    pub name: String,
    pub label: String,
    pub icon: &'static str,
    pub checked: bool,
}

#[derive(Template)]
#[template(path = "events.html")]
pub struct EventsTemplate {
    pub events: Vec<EventRow>,
}

pub struct PostTypeRow {
    pub title: String,
    pub post_type: String,
    pub is_ignored: &'static str,
    pub ignored_at: String,
    pub status_class: &'static str,
    pub action: &'static str,
    pub button_text: &'static str,
}

#[derive(Template)]
#[template(path = "ignore_posts.html")]
pub struct IgnorePostsTemplate {
    pub message_visibility: &'static str,
    pub rows: Vec<PostTypeRow>,
}
