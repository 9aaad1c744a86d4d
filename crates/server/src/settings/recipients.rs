use askama::Template;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc2822;

use super::{Submission, announce, persist};
use crate::SettingsResources;
use crate::error::SettingsError;
use crate::mail::{MailOptions, MailOutcome};
use crate::notices::{Message, Notices};
use crate::options::{self, NOTIFY_TO, RecipientList};
use crate::templates::RecipientsTemplate;

/// The stored list is comma-joined, so quoted local parts with a comma are
/// refused even though they are valid addresses.
pub fn is_valid_email(address: &str) -> bool {
    !address.contains(',') && address.parse::<lettre::Address>().is_ok()
}

/// Recipients of the email alerts: add one, remove several, or send a test
/// alert to the stored list.
#[tracing::instrument(skip_all)]
pub async fn recipients_section(
    res: &SettingsResources,
    form: Option<&Submission>,
    notices: &mut Notices,
) -> Result<String, SettingsError> {
    let mut emails = options::recipients(res.options.as_ref(), &res.defaults).await?;

    if let Some(form) = form {
        if form.is_present("save_recipient") {
            add_recipient(res, form, notices, &mut emails).await;
        }
        if form.is_present("delete_recipients") {
            delete_recipients(res, form, notices, &mut emails).await;
        }
        if form.truthy("debug_email").is_some() {
            send_test_email(res, notices).await?;
        }
    }

    let html = RecipientsTemplate {
        recipients: emails.iter().map(ToString::to_string).collect(),
    }
    .render()?;
    Ok(html)
}

async fn add_recipient(
    res: &SettingsResources,
    form: &Submission,
    notices: &mut Notices,
    emails: &mut RecipientList,
) {
    let new_email = form.value("recipient").unwrap_or_default().trim();
    if !is_valid_email(new_email) {
        notices.error("Email format not supported.");
        return;
    }

    let mut updated = emails.clone();
    updated.push(new_email);
    if persist(res, notices, NOTIFY_TO, &updated.to_string()).await {
        *emails = updated;
        announce(
            res,
            notices,
            Message::with_code("Alerts will be sent to: ", new_email, ""),
        )
        .await;
    }
}

async fn delete_recipients(
    res: &SettingsResources,
    form: &Submission,
    notices: &mut Notices,
    emails: &mut RecipientList,
) {
    let mut updated = emails.clone();
    let deleted: Vec<&str> = form
        .values("recipients")
        .iter()
        .map(String::as_str)
        .filter(|address| updated.remove_first(address))
        .collect();

    if deleted.is_empty() {
        return;
    }

    if persist(res, notices, NOTIFY_TO, &updated.to_string()).await {
        *emails = updated;
        announce(
            res,
            notices,
            Message::with_code("Alerts will not be sent to: ", deleted.join(", "), ""),
        )
        .await;
    }
}

async fn send_test_email(res: &SettingsResources, notices: &mut Notices) -> Result<(), SettingsError> {
    let recipients = options::recipients(res.options.as_ref(), &res.defaults).await?;
    let now = OffsetDateTime::now_utc();
    let sent_at = now
        .format(&Rfc2822)
        .unwrap_or_else(|_| now.unix_timestamp().to_string());

    let result = res
        .mailer
        .send(
            &recipients,
            "Test Email Alert",
            &format!("Test email alert sent at {sent_at}"),
            MailOptions { force: true },
        )
        .await;

    match result {
        Ok(MailOutcome::NoRecipients) => notices.error("There are no recipients for the test alert."),
        Ok(_) => notices.info("Test email alert sent, check your inbox."),
        Err(e) => {
            tracing::error!(
                name = "settings.recipients.test_email_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Failed to send test email alert"
            );
            notices.error(Message::with_code("The test alert could not be sent: ", e.to_string(), ""));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("c@x.com"));
        assert!(is_valid_email("first.last+tag@example.co.uk"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("\"c,d\"@x.com"));
    }
}
