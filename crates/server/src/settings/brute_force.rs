use askama::Template;

use super::{Submission, announce, persist, select_options};
use crate::SettingsResources;
use crate::error::SettingsError;
use crate::notices::{Message, Notices};
use crate::options::{self, MAXIMUM_FAILED_LOGINS};
use crate::templates::BruteForceTemplate;

/// Failed logins per hour after which the activity counts as brute force.
#[tracing::instrument(skip_all)]
pub async fn brute_force_section(
    res: &SettingsResources,
    form: Option<&Submission>,
    notices: &mut Notices,
) -> Result<String, SettingsError> {
    if let Some(maximum) = form.and_then(|f| f.truthy("maximum_failed_logins")) {
        if res.config.maximum_failed_logins_label(maximum).is_some() {
            if persist(res, notices, MAXIMUM_FAILED_LOGINS, maximum).await {
                announce(
                    res,
                    notices,
                    Message::with_code(
                        "Consider brute-force attack after ",
                        maximum,
                        " failed logins per hour",
                    ),
                )
                .await;
            }
        } else {
            notices.error("Invalid value for the brute-force alerts.");
        }
    }

    let current = options::read(res.options.as_ref(), &res.defaults, MAXIMUM_FAILED_LOGINS).await?;
    Ok(BruteForceTemplate {
        options: select_options(&res.config.maximum_failed_logins, &current),
    }
    .render()?)
}
