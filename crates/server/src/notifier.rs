use std::sync::Arc;

use crate::config::SiteConfig;
use crate::error::MailError;
use crate::mail::{MailOptions, MailOutcome, MailSender};
use crate::options::{self, EMAIL_SUBJECT, OptionDefaults};
use crate::settings::subject::{SubjectVars, expand_subject};
use crate::settings::title_case;
use crate::store::OptionStore;

/// Sends alert mail for an event when the matching `notify_<event>` option
/// is enabled.
#[derive(Clone)]
pub struct AlertNotifier {
    options: Arc<dyn OptionStore>,
    defaults: Arc<OptionDefaults>,
    mailer: Arc<dyn MailSender>,
    site: SiteConfig,
}

impl AlertNotifier {
    pub fn new(
        options: Arc<dyn OptionStore>,
        defaults: Arc<OptionDefaults>,
        mailer: Arc<dyn MailSender>,
        site: SiteConfig,
    ) -> Self {
        Self {
            options,
            defaults,
            mailer,
            site,
        }
    }

    /// Returns `Ok(None)` when alerts for `event` are disabled.
    #[tracing::instrument(skip(self, message))]
    pub async fn notify(&self, event: &str, message: &str) -> Result<Option<MailOutcome>, MailError> {
        let store = self.options.as_ref();
        let switch = format!("notify_{event}");
        if !options::is_enabled(store, &self.defaults, &switch).await? {
            return Ok(None);
        }

        let recipients = options::recipients(store, &self.defaults).await?;
        let format = options::read(store, &self.defaults, EMAIL_SUBJECT).await?;
        let event_title = title_case(event);
        let subject = expand_subject(
            &format,
            &SubjectVars {
                domain: &self.site.domain,
                hostname: &self.site.hostname,
                event: &event_title,
                ..SubjectVars::default()
            },
        );

        let outcome = self
            .mailer
            .send(&recipients, &subject, message, MailOptions::default())
            .await?;
        Ok(Some(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlertsConfig;
    use crate::mail::LettreMailer;
    use crate::store::MemoryOptionStore;
    use lettre::transport::stub::AsyncStubTransport;

    fn site() -> SiteConfig {
        SiteConfig {
            domain: "example.org".into(),
            hostname: "web1".into(),
            admin_email: "admin@example.org".into(),
        }
    }

    fn setup(store: MemoryOptionStore) -> (AlertNotifier, Arc<LettreMailer<AsyncStubTransport>>) {
        let defaults = Arc::new(OptionDefaults::new(site(), AlertsConfig::default()));
        let store: Arc<dyn OptionStore> = Arc::new(store);
        let mailer = Arc::new(
            LettreMailer::new(
                AsyncStubTransport::new_ok(),
                "alerts@example.org",
                store.clone(),
                defaults.clone(),
            )
            .unwrap(),
        );
        let notifier = AlertNotifier::new(store, defaults, mailer.clone(), site());
        (notifier, mailer)
    }

    #[tokio::test]
    async fn sends_with_expanded_subject_when_enabled() {
        let store = MemoryOptionStore::with_values([
            ("notify_to", "ops@example.org"),
            ("email_subject", "Alert :domain :event"),
        ]);
        let (notifier, mailer) = setup(store);

        let outcome = notifier.notify("plugin_change", "Settings changed").await.unwrap();
        assert_eq!(outcome, Some(MailOutcome::Sent(1)));

        let messages = mailer.transport().messages().await;
        assert_eq!(messages.len(), 1);
        assert!(messages[0].1.contains("Subject: Alert example.org Plugin Change"));
    }

    #[tokio::test]
    async fn skips_disabled_events() {
        let store = MemoryOptionStore::with_values([("notify_plugin_change", "disabled")]);
        let (notifier, mailer) = setup(store);

        let outcome = notifier.notify("plugin_change", "ignored").await.unwrap();
        assert_eq!(outcome, None);
        assert!(mailer.transport().messages().await.is_empty());
    }
}
