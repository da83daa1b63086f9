use color_eyre::eyre::eyre;
use db::bugs::BugReport;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    mailer::{Email, Mailer},
    AppState,
};

use super::Job;

/// Tells the admin a new bug report came in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyBugReported {
    pub bug_report_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BugUpdate {
    StatusChanged,
    Commented { comment: String },
}

/// Tells the reporter their bug report changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyBugUpdated {
    pub bug_report_id: Uuid,
    pub update: BugUpdate,
}

#[async_trait::async_trait]
impl Job for NotifyBugReported {
    const NAME: &'static str = "NotifyBugReported";

    async fn run(&self, app_state: AppState) -> color_eyre::Result<()> {
        let Some(mailer_config) = &app_state.mailer else {
            tracing::info!(bug_report_id = %self.bug_report_id, "Mailer not configured, skipping admin notification");
            return Ok(());
        };
        let Some(admin_email) = &mailer_config.admin_email else {
            tracing::info!(bug_report_id = %self.bug_report_id, "ADMIN_EMAIL not set, skipping admin notification");
            return Ok(());
        };

        let bug = BugReport::get_by_id(app_state.db(), self.bug_report_id)
            .await?
            .ok_or_else(|| eyre!("Bug report {} not found", self.bug_report_id))?;

        let link = app_state
            .app
            .app_url(&format!("/bugs/{}", bug.bug_report_id));
        let email = new_bug_email(&bug, admin_email, &link);

        Mailer::new(&app_state.http, mailer_config)
            .send(&email)
            .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl Job for NotifyBugUpdated {
    const NAME: &'static str = "NotifyBugUpdated";

    async fn run(&self, app_state: AppState) -> color_eyre::Result<()> {
        let Some(mailer_config) = &app_state.mailer else {
            tracing::info!(bug_report_id = %self.bug_report_id, "Mailer not configured, skipping reporter notification");
            return Ok(());
        };

        let bug = BugReport::get_by_id(app_state.db(), self.bug_report_id)
            .await?
            .ok_or_else(|| eyre!("Bug report {} not found", self.bug_report_id))?;

        if bug.reporter_email.trim().is_empty() {
            tracing::info!(bug_report_id = %bug.bug_report_id, "Reporter left no email, nothing to send");
            return Ok(());
        }

        let link = app_state
            .app
            .app_url(&format!("/bugs/{}", bug.bug_report_id));
        let email = bug_updated_email(&bug, &self.update, &link);

        Mailer::new(&app_state.http, mailer_config)
            .send(&email)
            .await?;

        Ok(())
    }
}

fn summary(bug: &BugReport) -> String {
    format!(
        "Title: {}\nType: {}\nPriority: {}\nStatus: {}",
        bug.title, bug.bug_type, bug.priority, bug.status
    )
}

pub(crate) fn new_bug_email(bug: &BugReport, to: &str, link: &str) -> Email {
    let reporter = match (bug.reporter_name.trim(), bug.reporter_email.trim()) {
        ("", "") => "anonymous".to_string(),
        (name, "") => name.to_string(),
        ("", email) => email.to_string(),
        (name, email) => format!("{name} <{email}>"),
    };

    let mut text = format!(
        "A new bug report was submitted.\n\n{}\nReported by: {reporter}\n\n{}\n",
        summary(bug),
        bug.description
    );

    for (label, value) in [
        ("Steps to reproduce", &bug.steps_to_reproduce),
        ("Expected behavior", &bug.expected_behavior),
        ("Actual behavior", &bug.actual_behavior),
        ("Environment", &bug.environment),
        ("Browser", &bug.browser_info),
        ("Device", &bug.device_info),
    ] {
        if !value.trim().is_empty() {
            text.push_str(&format!("\n{label}:\n{value}\n"));
        }
    }

    text.push_str(&format!("\n{link}\n"));

    Email {
        to: to.to_string(),
        subject: format!("[{}] New bug report: {}", bug.priority, bug.title),
        text,
    }
}

pub(crate) fn bug_updated_email(bug: &BugReport, update: &BugUpdate, link: &str) -> Email {
    let (subject, intro) = match update {
        BugUpdate::StatusChanged => (
            format!("Your bug report is now {}: {}", bug.status, bug.title),
            format!("The status of your bug report changed to {}.", bug.status),
        ),
        BugUpdate::Commented { comment } => (
            format!("New comment on your bug report: {}", bug.title),
            format!("The team left a comment on your bug report:\n\n{comment}"),
        ),
    };

    Email {
        to: bug.reporter_email.clone(),
        subject,
        text: format!("{intro}\n\n{}\n\n{link}\n", summary(bug)),
    }
}
