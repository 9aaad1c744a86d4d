use askama::Template;

use super::{Submission, announce, persist, select_options};
use crate::SettingsResources;
use crate::error::SettingsError;
use crate::notices::{Message, Notices};
use crate::options::{self, EMAILS_PER_HOUR};
use crate::templates::PerHourTemplate;

/// Maximum number of alert emails sent per hour.
#[tracing::instrument(skip_all)]
pub async fn per_hour_section(
    res: &SettingsResources,
    form: Option<&Submission>,
    notices: &mut Notices,
) -> Result<String, SettingsError> {
    if let Some(per_hour) = form.and_then(|f| f.truthy("emails_per_hour")) {
        match res.config.emails_per_hour_label(per_hour) {
            Some(label) => {
                if persist(res, notices, EMAILS_PER_HOUR, per_hour).await {
                    announce(
                        res,
                        notices,
                        Message::with_code(
                            "Maximum alerts per hour set to ",
                            label.to_lowercase(),
                            "",
                        ),
                    )
                    .await;
                }
            }
            None => notices.error("Invalid value for the maximum emails per hour."),
        }
    }

    let current = options::read(res.options.as_ref(), &res.defaults, EMAILS_PER_HOUR).await?;
    Ok(PerHourTemplate {
        options: select_options(&res.config.emails_per_hour, &current),
    }
    .render()?)
}
