//! Registration commands

use anyhow::{anyhow, bail, Context};
use colored::Colorize;
use gala_common::codec::{export_filename, AdminFormState, EditView};
use gala_common::fields::field_spec;
use gala_common::keys::{to_camel_case, to_snake_case};
use gala_common::{FieldValue, Registration, ValueKind};
use std::path::PathBuf;
use tabled::Tabled;

use super::ApiClient;
use crate::output::{short_id, OutputFormat};
use crate::RegistrationCommands;

#[derive(Tabled)]
struct RegistrationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Submitted")]
    submitted: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Company")]
    company: String,
}

impl From<&Registration> for RegistrationRow {
    fn from(r: &Registration) -> Self {
        Self {
            id: short_id(&r.id),
            submitted: r.created_at.format("%Y-%m-%d").to_string(),
            name: r.full_name(),
            email: r.email.clone(),
            company: r.company.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn field_rows(state: &AdminFormState) -> Vec<FieldRow> {
    state
        .iter()
        .map(|(key, value)| FieldRow {
            key: key.clone(),
            value: match value {
                FieldValue::Text(s) => s.clone(),
                FieldValue::List(items) => items.join(", "),
                FieldValue::Flag(b) => if *b { "yes" } else { "no" }.to_string(),
            },
        })
        .collect()
}

/// `field=value` → camelCase key and a value shaped for that field
fn parse_assignment(raw: &str) -> anyhow::Result<(String, FieldValue)> {
    let (key, value) = raw.split_once('=').ok_or_else(|| anyhow!("expected field=value, got {raw:?}"))?;
    let snake = to_snake_case(key.trim());
    let spec = field_spec(&snake).ok_or_else(|| anyhow!("Unknown field: {}", key.trim()))?;
    let value = match spec.kind {
        ValueKind::List(_) => FieldValue::list(value.split(',').map(str::trim).filter(|s| !s.is_empty())),
        ValueKind::Flag => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => FieldValue::Flag(true),
            "false" | "no" | "0" | "" => FieldValue::Flag(false),
            other => bail!("{} expects yes or no, got {other:?}", spec.key),
        },
        ValueKind::Text | ValueKind::Code(_) => FieldValue::text(value.trim()),
    };
    Ok((to_camel_case(&snake), value))
}

/// Full id, or a unique prefix as shown by `list`
async fn find(client: &ApiClient, id: &str) -> anyhow::Result<Registration> {
    let all: Vec<Registration> = client.get_data("/api/registrations").await?;
    let mut matches = all.into_iter().filter(|r| r.id.to_string().starts_with(id));
    match (matches.next(), matches.next()) {
        (Some(r), None) => Ok(r),
        (Some(_), Some(_)) => bail!("ID prefix {id} matches more than one registration"),
        (None, _) => bail!("Registration not found: {id}"),
    }
}

pub async fn handle(action: RegistrationCommands, client: &ApiClient, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        RegistrationCommands::List { search } => {
            let registrations: Vec<Registration> = match search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                Some(query) => client.get_data_query("/api/registrations", &[("search", query)]).await?,
                None => client.get_data("/api/registrations").await?,
            };
            format.print_rows(registrations.iter().map(RegistrationRow::from).collect(), &registrations)?;
            if format == OutputFormat::Table {
                println!("{} registration(s)", registrations.len());
            }
        }
        RegistrationCommands::Show { id } => {
            let registration = find(client, &id).await?;
            let state = AdminFormState::from_registration(&registration);
            if format == OutputFormat::Table {
                println!("{} {}", registration.full_name().bold(), registration.id.to_string().dimmed());
            }
            format.print_rows(field_rows(&state), &registration)?;
        }
        RegistrationCommands::Export { output } => {
            let download = client.download("/api/registrations/export").await?;
            let path = output.unwrap_or_else(|| {
                PathBuf::from(
                    download
                        .filename
                        .clone()
                        .unwrap_or_else(|| export_filename(chrono::Utc::now().date_naive())),
                )
            });
            let rows = download.body.lines().count().saturating_sub(1);
            tokio::fs::write(&path, &download.body)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Exported {} registration(s) to {}", rows, path.display().to_string().green());
        }
        RegistrationCommands::Edit { id, assignments, admin } => {
            let registration = find(client, &id).await?;
            let mut state = AdminFormState::from_registration(&registration);
            for raw in &assignments {
                let (key, value) = parse_assignment(raw)?;
                state.set(key, value);
            }
            let view = if admin { EditView::Admin } else { EditView::Registrant };
            let updated = state.apply_to(&registration, view)?;

            let mut path = format!("/api/registration/{}", registration.id);
            if admin {
                path.push_str("?view=admin");
            }
            let saved: Registration = client.patch_data(&path, &updated).await?;
            println!("Updated registration {}", saved.id.to_string().green());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment_by_kind() {
        let (key, value) = parse_assignment("company=Acme Corp").unwrap();
        assert_eq!(key, "company");
        assert_eq!(value, FieldValue::text("Acme Corp"));

        let (key, value) = parse_assignment("first_name= Ada ").unwrap();
        assert_eq!(key, "firstName");
        assert_eq!(value, FieldValue::text("Ada"));

        let (key, value) = parse_assignment("photoConsent=yes").unwrap();
        assert_eq!(key, "photoConsent");
        assert_eq!(value, FieldValue::Flag(true));
    }

    #[test]
    fn test_parse_assignment_list_field() {
        let (key, value) = parse_assignment("accommodations=night1, night2,").unwrap();
        assert_eq!(key, "accommodations");
        assert_eq!(value.as_list(), ["night1", "night2"]);
    }

    #[test]
    fn test_parse_assignment_errors() {
        assert!(parse_assignment("company").is_err());
        assert!(parse_assignment("shoe_size=42").is_err());
        assert!(parse_assignment("photo_consent=maybe").is_err());
    }

    #[test]
    fn test_field_rows_format_values() {
        let mut r = Registration::new("ada@example.com", "Ada", "Lovelace");
        r.accommodations = vec!["night1".into(), "night2".into()];
        r.photo_consent = true;
        let rows = field_rows(&AdminFormState::from_registration(&r));

        let value = |key: &str| rows.iter().find(|row| row.key == key).map(|row| row.value.clone());
        assert_eq!(value("accommodations").as_deref(), Some("night1, night2"));
        assert_eq!(value("photoConsent").as_deref(), Some("yes"));
        assert_eq!(value("firstName").as_deref(), Some("Ada"));
    }
}
