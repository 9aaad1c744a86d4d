//! Outbound alert mail with the hourly throttle.

use async_trait::async_trait;
use lettre::AsyncTransport;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use std::sync::Arc;
use time::OffsetDateTime;

use crate::error::{MailError, StoreError};
use crate::options::{self, EMAILS_PER_HOUR, EMAILS_SENT, LAST_EMAIL_AT, OptionDefaults, RecipientList};
use crate::store::OptionStore;

const THROTTLE_WINDOW_SECS: i64 = 3600;

#[derive(Clone, Copy, Debug, Default)]
pub struct MailOptions {
    /// Send even if the hourly limit was reached.
    pub force: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MailOutcome {
    Sent(usize),
    Throttled,
    NoRecipients,
}

#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(
        &self,
        to: &RecipientList,
        subject: &str,
        body: &str,
        options: MailOptions,
    ) -> Result<MailOutcome, MailError>;
}

/// [`MailSender`] on top of any lettre transport. The per-hour limit comes
/// from the `emails_per_hour` option; `unlimited` (or anything non-numeric)
/// disables it.
pub struct LettreMailer<T> {
    transport: T,
    from: Mailbox,
    options: Arc<dyn OptionStore>,
    defaults: Arc<OptionDefaults>,
}

impl<T> LettreMailer<T> {
    pub fn new(
        transport: T,
        from: &str,
        options: Arc<dyn OptionStore>,
        defaults: Arc<OptionDefaults>,
    ) -> Result<Self, MailError> {
        let from = from.parse::<Mailbox>().map_err(|e| MailError::Address {
            address: from.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            transport,
            from,
            options,
            defaults,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn read_number(&self, key: &str) -> Result<i64, StoreError> {
        let raw = options::read(self.options.as_ref(), &self.defaults, key).await?;
        Ok(raw.trim().parse().unwrap_or(0))
    }

    async fn is_throttled(&self, now: OffsetDateTime) -> Result<bool, StoreError> {
        let limit = options::read(self.options.as_ref(), &self.defaults, EMAILS_PER_HOUR).await?;
        let Ok(limit) = limit.trim().parse::<i64>() else {
            return Ok(false);
        };
        let window_start = self.read_number(LAST_EMAIL_AT).await?;
        if now.unix_timestamp() - window_start >= THROTTLE_WINDOW_SECS {
            return Ok(false);
        }
        Ok(self.read_number(EMAILS_SENT).await? >= limit)
    }

    async fn record_sent(&self, count: usize, now: OffsetDateTime) -> Result<(), StoreError> {
        let window_start = self.read_number(LAST_EMAIL_AT).await?;
        let count = count as i64;
        if now.unix_timestamp() - window_start >= THROTTLE_WINDOW_SECS {
            self.options
                .update(LAST_EMAIL_AT, &now.unix_timestamp().to_string())
                .await?;
            self.options.update(EMAILS_SENT, &count.to_string()).await?;
        } else {
            let sent = self.read_number(EMAILS_SENT).await? + count;
            self.options.update(EMAILS_SENT, &sent.to_string()).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<T> MailSender for LettreMailer<T>
where
    T: AsyncTransport + Send + Sync,
    T::Error: std::fmt::Display,
{
    #[tracing::instrument(skip(self, to, body), fields(recipients = to.len()))]
    async fn send(
        &self,
        to: &RecipientList,
        subject: &str,
        body: &str,
        options: MailOptions,
    ) -> Result<MailOutcome, MailError> {
        if to.is_empty() {
            return Ok(MailOutcome::NoRecipients);
        }

        let now = OffsetDateTime::now_utc();
        if !options.force && self.is_throttled(now).await? {
            tracing::info!(
                name = "mail.send.throttled",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                message = "Hourly alert limit reached, mail skipped",
            );
            return Ok(MailOutcome::Throttled);
        }

        let mut sent = 0;
        let mut failure = None;
        for address in to.iter() {
            let mailbox = match address.parse::<Mailbox>() {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(
                        name = "mail.send.bad_recipient",
                        target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                        error = %e,
                        address = %address,
                        message = "Skipping recipient with invalid address"
                    );
                    continue;
                }
            };

            let message = lettre::Message::builder()
                .from(self.from.clone())
                .to(mailbox)
                .subject(subject)
                .header(ContentType::TEXT_PLAIN)
                .body(body.to_string())
                .map_err(|e| MailError::Build(e.to_string()))?;

            if let Err(e) = self.transport.send(message).await {
                failure = Some(MailError::Transport(e.to_string()));
                break;
            }
            sent += 1;
        }

        // Count what went out even if a later recipient failed.
        self.record_sent(sent, now).await?;
        match failure {
            Some(e) => Err(e),
            None => Ok(MailOutcome::Sent(sent)),
        }
    }
}
