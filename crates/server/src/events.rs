//! Audit trail for settings changes.
//!
//! Reporting never fails the request: sinks log their own errors.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection};
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

use crate::entity::audit_event;
use crate::notifier::AlertNotifier;

/// Log target of audit lines; covered by the crate's default filter.
pub const AUDIT_TARGET: &str = "alerts_settings::audit";

fn log_audit(level: EventLevel, message: &str) {
    tracing::info!(target: AUDIT_TARGET, audit_level = level.as_str(), "{}", message);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Notice,
    Warning,
}

impl EventLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventLevel::Info => "info",
            EventLevel::Notice => "notice",
            EventLevel::Warning => "warning",
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn report(&self, level: EventLevel, message: &str);

    /// Alert the recipients about an event of type `event` (e.g. `plugin_change`).
    async fn notify(&self, event: &str, message: &str);

    async fn report_info(&self, message: &str) {
        self.report(EventLevel::Info, message).await
    }

    async fn report_notice(&self, message: &str) {
        self.report(EventLevel::Notice, message).await
    }

    async fn report_warning(&self, message: &str) {
        self.report(EventLevel::Warning, message).await
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    Report { level: EventLevel, message: String },
    Notify { event: String, message: String },
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<RecordedEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn reports(&self) -> Vec<(EventLevel, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RecordedEvent::Report { level, message } => Some((level, message)),
                RecordedEvent::Notify { .. } => None,
            })
            .collect()
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RecordedEvent::Notify { event, message } => Some((event, message)),
                RecordedEvent::Report { .. } => None,
            })
            .collect()
    }

    fn push(&self, event: RecordedEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[async_trait]
impl EventSink for MemoryEventSink {
    async fn report(&self, level: EventLevel, message: &str) {
        tracing::debug!(audit_level = level.as_str(), audit_message = %message, "audit event");
        self.push(RecordedEvent::Report {
            level,
            message: message.to_string(),
        });
    }

    async fn notify(&self, event: &str, message: &str) {
        self.push(RecordedEvent::Notify {
            event: event.to_string(),
            message: message.to_string(),
        });
    }
}

/// Persists events to the `audit_event` table and forwards notifications to
/// the alert mailer.
pub struct AuditLog {
    db: Arc<DatabaseConnection>,
    notifier: Option<AlertNotifier>,
}

impl AuditLog {
    pub fn new(db: Arc<DatabaseConnection>, notifier: Option<AlertNotifier>) -> Self {
        Self { db, notifier }
    }
}

#[async_trait]
impl EventSink for AuditLog {
    #[tracing::instrument(skip(self))]
    async fn report(&self, level: EventLevel, message: &str) {
        log_audit(level, message);

        let row = audit_event::ActiveModel {
            id: ActiveValue::NotSet,
            level: ActiveValue::Set(level.as_str().to_string()),
            message: ActiveValue::Set(message.to_string()),
            created_at: ActiveValue::Set(OffsetDateTime::now_utc()),
        };
        if let Err(e) = row.insert(self.db.as_ref()).await {
            tracing::error!(
                name = "events.report.insert_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Failed to persist audit event"
            );
        }
    }

    #[tracing::instrument(skip(self, message))]
    async fn notify(&self, event: &str, message: &str) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        match notifier.notify(event, message).await {
            Ok(Some(outcome)) => {
                tracing::debug!(event, ?outcome, "alert notification handled");
            }
            Ok(None) => {
                tracing::debug!(event, "alerts for this event are disabled");
            }
            Err(e) => {
                tracing::error!(
                    name = "events.notify.failed",
                    target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                    error = %e,
                    event = %event,
                    message = "Failed to send alert notification"
                );
            }
        }
    }
}
