//! Sent-mail log commands

use colored::Colorize;
use gala_mail::{DeliveryStatus, SentEmail, SentEmailSummary};
use serde::Deserialize;
use tabled::Tabled;

use super::ApiClient;
use crate::output::{short_id, OutputFormat};
use crate::SentCommands;

#[derive(Debug, Deserialize)]
struct SentList {
    emails: Vec<SentEmailSummary>,
}

#[derive(Debug, Deserialize)]
struct SentDetail {
    email: SentEmail,
}

#[derive(Tabled)]
struct SentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Sent")]
    sent_at: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

impl From<&SentEmailSummary> for SentRow {
    fn from(email: &SentEmailSummary) -> Self {
        Self {
            id: short_id(&email.id),
            sent_at: email.sent_at.format("%Y-%m-%d %H:%M").to_string(),
            to: email.to.join(", "),
            subject: email.subject.clone(),
            status: match email.status {
                DeliveryStatus::Sent => "sent",
                DeliveryStatus::Failed => "failed",
            },
        }
    }
}

pub async fn handle(action: SentCommands, client: &ApiClient, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        SentCommands::List => {
            let list: SentList = serde_json::from_value(client.get("/api/sent-emails").await?)?;
            format.print_rows(list.emails.iter().map(SentRow::from).collect(), &list.emails)?;
        }
        SentCommands::Show { id, html } => {
            let detail: SentDetail = serde_json::from_value(client.get(&format!("/api/sent-emails/{id}")).await?)?;
            let email = detail.email;
            if format != OutputFormat::Table {
                return format.print(&email);
            }
            println!("{} {}", "Subject:".bold(), email.subject);
            println!("{} {}", "To:".bold(), email.to.join(", "));
            if !email.cc.is_empty() {
                println!("{} {}", "Cc:".bold(), email.cc.join(", "));
            }
            if !email.bcc.is_empty() {
                println!("{} {}", "Bcc:".bold(), email.bcc.join(", "));
            }
            match (&email.status, &email.error) {
                (DeliveryStatus::Failed, Some(error)) => println!("{} {}", "Failed:".red(), error),
                (DeliveryStatus::Failed, None) => println!("{}", "Failed".red()),
                (DeliveryStatus::Sent, _) => println!("{} {}", "Sent:".green(), email.sent_at.to_rfc3339()),
            }
            println!();
            println!("{}", if html { &email.html } else { &email.text });
        }
    }
    Ok(())
}
