#![allow(dead_code)]

use alerts_settings::config::{AlertsConfig, SiteConfig};
use alerts_settings::events::MemoryEventSink;
use alerts_settings::mail::LettreMailer;
use alerts_settings::notices::Notices;
use alerts_settings::options::OptionDefaults;
use alerts_settings::store::{MemoryOptionStore, MemoryTrustedIpStore, OptionStore};
use alerts_settings::{SettingsResources, Submission};
use lettre::transport::stub::AsyncStubTransport;
use std::sync::Arc;

pub fn site() -> SiteConfig {
    SiteConfig {
        domain: "example.org".into(),
        hostname: "web1".into(),
        admin_email: "admin@example.org".into(),
    }
}

/// Settings resources wired to in-memory collaborators that tests can inspect.
pub struct Harness {
    pub options: MemoryOptionStore,
    pub trusted_ips: MemoryTrustedIpStore,
    pub events: Arc<MemoryEventSink>,
    pub mailer: Arc<LettreMailer<AsyncStubTransport>>,
    pub resources: SettingsResources,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(MemoryOptionStore::new(), AlertsConfig::default())
    }

    pub fn with_options<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::with_config(MemoryOptionStore::with_values(values), AlertsConfig::default())
    }

    pub fn with_config(options: MemoryOptionStore, config: AlertsConfig) -> Self {
        let store: Arc<dyn OptionStore> = Arc::new(options.clone());
        Self::with_store(options, store, config)
    }

    /// `store` is what the handlers use; `options` is the map behind it.
    pub fn with_store(
        options: MemoryOptionStore,
        store: Arc<dyn OptionStore>,
        config: AlertsConfig,
    ) -> Self {
        let trusted_ips = MemoryTrustedIpStore::new();
        let events = Arc::new(MemoryEventSink::new());
        let defaults = Arc::new(OptionDefaults::new(site(), config.clone()));
        let mailer = Arc::new(
            LettreMailer::new(
                AsyncStubTransport::new_ok(),
                "alerts@example.org",
                store.clone(),
                defaults.clone(),
            )
            .expect("valid sender address"),
        );

        let resources = SettingsResources {
            options: store,
            trusted_ips: Arc::new(trusted_ips.clone()),
            mailer: mailer.clone(),
            events: events.clone(),
            defaults,
            config: Arc::new(config),
        };

        Self {
            options,
            trusted_ips,
            events,
            mailer,
            resources,
        }
    }

    pub fn option(&self, key: &str) -> Option<String> {
        self.options.snapshot(key)
    }
}

pub fn form(pairs: &[(&str, &str)]) -> Submission {
    Submission::from_pairs(pairs.iter().copied())
}

pub fn notice_texts(notices: &Notices) -> Vec<String> {
    notices
        .as_slice()
        .iter()
        .map(|n| n.message.to_string())
        .collect()
}

pub fn error_texts(notices: &Notices) -> Vec<String> {
    notices.errors().map(|n| n.message.to_string()).collect()
}
