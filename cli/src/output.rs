//! Output formatting

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Print `rows` as a table, or `records` as JSON/YAML
    pub fn print_rows<R: Tabled, T: Serialize + ?Sized>(&self, rows: Vec<R>, records: &T) -> anyhow::Result<()> {
        match self {
            OutputFormat::Table => println!("{}", table(rows)),
            _ => self.print(records)?,
        }
        Ok(())
    }

    pub fn print<T: Serialize + ?Sized>(&self, data: &T) -> anyhow::Result<()> {
        match self {
            OutputFormat::Json | OutputFormat::Table => println!("{}", serde_json::to_string_pretty(data)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(data)?),
        }
        Ok(())
    }
}

pub fn table<R: Tabled>(rows: Vec<R>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// First eight characters of an id, enough to tell rows apart
pub fn short_id(id: &impl ToString) -> String {
    id.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Tabled)]
    struct Row {
        name: String,
    }

    #[test]
    fn test_table_has_header_and_rows() {
        let rendered = table(vec![Row { name: "Ada".into() }, Row { name: "Grace".into() }]);
        assert!(rendered.contains("name"));
        assert!(rendered.contains("Ada"));
        assert!(rendered.contains("Grace"));
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id(&"0123456789abcdef"), "01234567");
        assert_eq!(short_id(&"abc"), "abc");
    }
}
