//! Email composer commands

use anyhow::Context;
use colored::Colorize;
use gala_common::Registration;
use gala_mail::{PredefinedRecipient, RecipientFields, RecipientList, RecipientResult, RecipientSet};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::Tabled;

use super::ApiClient;
use crate::output::OutputFormat;
use crate::{ComposeArgs, EmailCommands};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkOutcome {
    total: usize,
    success_count: usize,
    skipped_count: usize,
    fail_count: usize,
    results: Vec<RecipientResult>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Preview {
    subject: String,
    html: String,
    text: String,
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Recipient")]
    email: String,
    #[tabled(rename = "Outcome")]
    outcome: &'static str,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&RecipientResult> for ResultRow {
    fn from(r: &RecipientResult) -> Self {
        let outcome = match (r.success, r.skipped) {
            (true, _) => "sent",
            (false, Some(true)) => "skipped",
            (false, _) => "failed",
        };
        Self { email: r.email.clone(), outcome, detail: r.error.clone().unwrap_or_default() }
    }
}

/// One To/Cc/Bcc line from comma-separated role names and addresses
fn recipient_line(values: &[String]) -> anyhow::Result<RecipientSet> {
    let mut list = RecipientList::new();
    for token in values.iter().flat_map(|v| v.split(',')).map(str::trim).filter(|t| !t.is_empty()) {
        match PredefinedRecipient::parse(token) {
            Some(recipient) => {
                list.add_predefined(recipient);
            }
            None => {
                list.add_custom(token)?;
            }
        }
    }
    Ok(list.flatten())
}

impl ComposeArgs {
    fn recipient_fields(&self) -> anyhow::Result<RecipientFields> {
        Ok(RecipientFields {
            to: recipient_line(&self.to).context("--to")?,
            cc: recipient_line(&self.cc).context("--cc")?,
            bcc: recipient_line(&self.bcc).context("--bcc")?,
        })
    }

    async fn body(&self) -> anyhow::Result<String> {
        match (&self.body, &self.body_file) {
            (Some(body), _) => Ok(body.clone()),
            (None, Some(path)) => {
                tokio::fs::read_to_string(path).await.with_context(|| format!("reading {}", path.display()))
            }
            (None, None) => anyhow::bail!("--body or --body-file is required"),
        }
    }

    async fn payload(&self) -> anyhow::Result<serde_json::Value> {
        Ok(json!({
            "heading": self.heading,
            "subject": self.subject,
            "body": self.body().await?,
            "headerImageUrl": self.header_image,
            "recipientFields": self.recipient_fields()?,
        }))
    }
}

pub async fn handle(action: EmailCommands, client: &ApiClient, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        EmailCommands::Preview { registration_id, compose, html } => {
            let mut payload = compose.payload().await?;
            payload["registrationId"] = json!(registration_id);
            let preview: Preview = serde_json::from_value(client.post("/api/email-preview", &payload).await?)?;
            if format != OutputFormat::Table {
                return format.print(&preview);
            }
            println!("{} {}", "Subject:".bold(), preview.subject);
            println!();
            println!("{}", if html { &preview.html } else { &preview.text });
        }
        EmailCommands::Send { ids, all, search, compose } => {
            let ids = if all {
                let registrations: Vec<Registration> = match search.as_deref() {
                    Some(query) => client.get_data_query("/api/registrations", &[("search", query)]).await?,
                    None => client.get_data("/api/registrations").await?,
                };
                registrations.iter().map(|r| r.id.to_string()).collect()
            } else {
                ids
            };
            if ids.is_empty() {
                anyhow::bail!("No registrations selected");
            }

            let mut payload = compose.payload().await?;
            payload["registrationIds"] = json!(ids);
            let outcome: BulkOutcome = serde_json::from_value(client.post("/api/send-bulk-email", &payload).await?)?;

            format.print_rows(outcome.results.iter().map(ResultRow::from).collect(), &outcome)?;
            if format == OutputFormat::Table {
                println!(
                    "{} sent, {} skipped, {} failed of {}",
                    outcome.success_count.to_string().green(),
                    outcome.skipped_count.to_string().yellow(),
                    outcome.fail_count.to_string().red(),
                    outcome.total
                );
            }
        }
    }
    Ok(())
}
