use askama::Template;
use time::OffsetDateTime;

use super::{Submission, format_datetime, title_case};
use crate::SettingsResources;
use crate::error::SettingsError;
use crate::notices::{Message, Notices};
use crate::options::{self, NOTIFY_POST_PUBLICATION};
use crate::templates::{IgnorePostsTemplate, PostTypeRow};

async fn ignore_post_type(res: &SettingsResources, notices: &mut Notices, post_type: &str) {
    if !options::is_valid_post_type(post_type) {
        notices.error("Only lowercase letters and underscores are allowed.");
        return;
    }

    match options::add_ignored_event(res.options.as_ref(), post_type).await {
        Ok(true) => {
            notices.info("Post-type ignored successfully.");
            let message = Message::with_code("Changes in ", post_type, " post-type will be ignored");
            res.events.report_warning(&message.to_string()).await;
        }
        Ok(false) => notices.error("The post-type is invalid or it may be already ignored."),
        Err(e) => {
            tracing::error!(
                name = "settings.ignore_posts.add_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                post_type = %post_type,
                message = "Failed to save ignored post-type"
            );
            notices.error("The ignored post-types could not be saved.");
        }
    }
}

async fn unignore_post_type(res: &SettingsResources, notices: &mut Notices, post_type: &str) {
    if let Err(e) = options::remove_ignored_event(res.options.as_ref(), post_type).await {
        tracing::error!(
            name = "settings.ignore_posts.remove_failed",
            target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
            error = %e,
            post_type = %post_type,
            message = "Failed to remove ignored post-type"
        );
        notices.error("The ignored post-types could not be saved.");
        return;
    }

    notices.info("Post-type removed from the list successfully.");
    let message = Message::with_code("Changes in ", post_type, " post-type will not be ignored");
    res.events.report_notice(&message.to_string()).await;
}

/// Post-types excluded from new-content alerts. The list is only shown while
/// those alerts are enabled.
#[tracing::instrument(skip_all)]
pub async fn ignore_posts_section(
    res: &SettingsResources,
    form: Option<&Submission>,
    notices: &mut Notices,
) -> Result<String, SettingsError> {
    let notify_new_content =
        options::is_enabled(res.options.as_ref(), &res.defaults, NOTIFY_POST_PUBLICATION).await?;

    if let Some(form) = form {
        let rule = form.value("ignorerule").unwrap_or_default().trim();
        match form.choice("ignorerule_action", &["add", "remove"]) {
            Some("add") => ignore_post_type(res, notices, rule).await,
            Some("remove") => unignore_post_type(res, notices, rule).await,
            _ => {}
        }
    }

    if !notify_new_content {
        return Ok(IgnorePostsTemplate {
            message_visibility: "visible",
            rows: Vec::new(),
        }
        .render()?);
    }

    let ignored = options::ignored_events(res.options.as_ref()).await?;
    let mut post_types = res.config.post_types.clone();
    for name in ignored.keys() {
        if !post_types.contains(name) {
            post_types.push(name.clone());
        }
    }

    let rows = post_types
        .into_iter()
        .map(|post_type| match ignored.get(&post_type) {
            Some(&at) => PostTypeRow {
                title: title_case(&post_type),
                is_ignored: "YES",
                ignored_at: OffsetDateTime::from_unix_timestamp(at)
                    .map(format_datetime)
                    .unwrap_or_else(|_| at.to_string()),
                status_class: "danger",
                action: "remove",
                button_text: "Receive These Alerts",
                post_type,
            },
            None => PostTypeRow {
                title: title_case(&post_type),
                is_ignored: "NO",
                ignored_at: "--".to_string(),
                status_class: "success",
                action: "add",
                button_text: "Stop These Alerts",
                post_type,
            },
        })
        .collect();

    Ok(IgnorePostsTemplate {
        message_visibility: "hidden",
        rows,
    }
    .render()?)
}
