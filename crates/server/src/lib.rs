//! Settings forms for security alert delivery.
//!
//! Renders and processes the sections of an "Alerts" settings page:
//! recipients, trusted IPs, subject format, hourly throttle, brute-force
//! threshold, per-event toggles and ignored post-types.

use std::sync::Arc;

use crate::config::AlertsConfig;
use crate::events::EventSink;
use crate::mail::MailSender;
use crate::options::OptionDefaults;
use crate::store::{OptionStore, TrustedIpStore};

pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod mail;
pub mod network;
pub mod notices;
pub mod notifier;
pub mod options;
pub mod settings;
pub mod store;
pub mod templates;

pub use settings::{Submission, render_alerts_page};

/// `EnvFilter` directives used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "alerts_settings=info,sea_orm=info";

/// Collaborators shared by all section handlers.
#[derive(Clone)]
pub struct SettingsResources {
    pub options: Arc<dyn OptionStore>,
    pub trusted_ips: Arc<dyn TrustedIpStore>,
    pub mailer: Arc<dyn MailSender>,
    pub events: Arc<dyn EventSink>,
    pub defaults: Arc<OptionDefaults>,
    pub config: Arc<AlertsConfig>,
}
