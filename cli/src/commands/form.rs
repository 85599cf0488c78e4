//! Form commands

use colored::Colorize;
use gala_forms::FormConfig;
use tabled::Tabled;

use super::ApiClient;
use crate::{output::OutputFormat, FormCommands};

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Step")]
    step: usize,
    #[tabled(rename = "Section")]
    section: String,
    #[tabled(rename = "Field")]
    name: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Required")]
    required: bool,
    #[tabled(rename = "Hidden")]
    hidden: bool,
}

fn field_rows(form: &FormConfig) -> Vec<FieldRow> {
    let mut rows = Vec::new();
    for (index, step) in form.steps.iter().enumerate() {
        for group in &step.groups {
            for field in &group.fields {
                rows.push(FieldRow {
                    step: index + 1,
                    section: group.group_title.clone().unwrap_or_else(|| group.key.section_name().to_string()),
                    name: field.name.clone(),
                    label: field.label.clone(),
                    kind: field.kind.type_name(),
                    required: field.required,
                    hidden: field.hidden || group.hidden,
                });
            }
        }
    }
    rows
}

pub async fn handle(action: FormCommands, client: &ApiClient, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        FormCommands::Show => {
            let form: FormConfig = client.get_data("/api/form-config").await?;
            if format == OutputFormat::Table {
                println!("{}", form.chrome.title.bold());
                if !form.chrome.subtitle.is_empty() {
                    println!("{}", form.chrome.subtitle);
                }
                for (index, step) in form.steps.iter().enumerate() {
                    println!("  {}. {}", index + 1, step.title);
                }
                println!();
            }
            format.print_rows(field_rows(&form), &form)?;
        }
    }
    Ok(())
}
