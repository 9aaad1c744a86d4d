use askama::Template;
use time::OffsetDateTime;

use super::{Submission, format_datetime};
use crate::SettingsResources;
use crate::error::SettingsError;
use crate::network::IpNet;
use crate::notices::{Message, Notices};
use crate::store::TrustedIp;
use crate::templates::{TrustedIpRow, TrustedIpsTemplate};

/// Addresses and networks whose changes are not reported.
#[tracing::instrument(skip_all)]
pub async fn trusted_ips_section(
    res: &SettingsResources,
    form: Option<&Submission>,
    notices: &mut Notices,
) -> Result<String, SettingsError> {
    if let Some(form) = form {
        if let Some(input) = form.truthy("trust_ip") {
            trust_address(res, notices, input).await;
        }

        let keys = form.values("del_trust_ip");
        if !keys.is_empty() {
            for key in keys {
                if let Err(e) = res.trusted_ips.delete(key).await {
                    tracing::warn!(
                        name = "settings.trusted_ips.delete_failed",
                        target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                        error = %e,
                        cache_key = %key,
                        message = "Failed to delete trusted IP"
                    );
                }
            }
            notices.info("The IP addresses selected were deleted successfully.");
        }
    }

    let entries = res.trusted_ips.get_all().await?;
    let no_items_visibility = if entries.is_empty() { "visible" } else { "hidden" };
    let rows = entries
        .into_iter()
        .map(|(cache_key, entry)| TrustedIpRow {
            cidr_format: if entry.is_host_only() {
                "n/a".to_string()
            } else {
                entry.cidr_format.clone()
            },
            remote_addr: entry.remote_addr,
            added_at: format_datetime(entry.added_at),
            cache_key,
        })
        .collect();

    Ok(TrustedIpsTemplate {
        rows,
        no_items_visibility,
    }
    .render()?)
}

async fn trust_address(res: &SettingsResources, notices: &mut Notices, input: &str) {
    let Ok(net) = input.parse::<IpNet>() else {
        tracing::debug!(input, "ignoring value that is neither an IP nor a CIDR block");
        return;
    };

    let entry = TrustedIp::from_net(&net, OffsetDateTime::now_utc());
    let key = entry.cache_key();

    match res.trusted_ips.exists(&key).await {
        Ok(true) => {
            notices.error("The IP address specified was already trusted.");
            return;
        }
        Ok(false) => {}
        Err(e) => {
            tracing::error!(
                name = "settings.trusted_ips.lookup_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Failed to check trusted IP datastore"
            );
            notices.error("The new entry was not saved in the datastore.");
            return;
        }
    }

    match res.trusted_ips.add(&key, &entry).await {
        Ok(true) => {
            let message = Message::with_code("Changes from ", input, " will be ignored");
            res.events.report_warning(&message.to_string()).await;
            notices.info(message);
        }
        Ok(false) => notices.error("The new entry was not saved in the datastore."),
        Err(e) => {
            tracing::error!(
                name = "settings.trusted_ips.add_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                remote_addr = %entry.remote_addr,
                message = "Failed to save trusted IP"
            );
            notices.error("The new entry was not saved in the datastore.");
        }
    }
}
