use alerts_settings::config::load_config_or_panic;
use alerts_settings::events::{AuditLog, EventSink};
use alerts_settings::mail::{LettreMailer, MailSender};
use alerts_settings::notifier::AlertNotifier;
use alerts_settings::options::OptionDefaults;
use alerts_settings::store::{DbOptionStore, DbTrustedIpStore, OptionStore};
use alerts_settings::{DEFAULT_LOG_FILTER, SettingsResources, Submission, render_alerts_page};
use lettre::{AsyncSmtpTransport, Tokio1Executor, transport::smtp::authentication::Credentials};
use sea_orm::Database;
use std::env;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_standard_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // stdout carries the rendered page
    let layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry().with(env_filter).with(layer).init();
}

/// `field=value` arguments form a verified submission; none means a plain render.
fn submission_from_args(args: impl Iterator<Item = String>) -> Option<Submission> {
    let pairs: Vec<(String, String)> = args
        .filter_map(|arg| {
            arg.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
        })
        .collect();
    if pairs.is_empty() {
        None
    } else {
        Some(Submission::from_pairs(pairs))
    }
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    initialize_standard_tracing();

    let config = load_config_or_panic();

    let db = Arc::new(Database::connect(&config.database_url).await?);
    let options: Arc<dyn OptionStore> = Arc::new(DbOptionStore::new(db.clone()));
    let defaults = Arc::new(OptionDefaults::new(
        config.site.clone(),
        config.alerts.clone(),
    ));

    let creds = Credentials::new(config.smtp.username.clone(), config.smtp.password.clone());
    let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp.server)?
        .port(config.smtp.port)
        .credentials(creds)
        .build();
    let mailer: Arc<dyn MailSender> = Arc::new(LettreMailer::new(
        transport,
        &config.smtp.from,
        options.clone(),
        defaults.clone(),
    )?);

    let notifier = AlertNotifier::new(
        options.clone(),
        defaults.clone(),
        mailer.clone(),
        config.site.clone(),
    );
    let events: Arc<dyn EventSink> = Arc::new(AuditLog::new(db.clone(), Some(notifier)));

    let resources = SettingsResources {
        options,
        trusted_ips: Arc::new(DbTrustedIpStore::new(db)),
        mailer,
        events,
        defaults,
        config: Arc::new(config.alerts),
    };

    let form = submission_from_args(env::args().skip(1));
    tracing::info!(submitted = form.is_some(), "rendering alerts settings page");

    let html = render_alerts_page(&resources, form.as_ref()).await?;
    println!("{html}");
    Ok(())
}
