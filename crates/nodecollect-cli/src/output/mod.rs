//! Output formatting for different formats.

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use nodecollect::NodeRecord;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;
use tabled::{settings::Style, Table, Tabled};

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML output
    Yaml,
    /// Table with colored headers
    Table,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "table" | "pretty" => Ok(Self::Table),
            _ => anyhow::bail!(
                "Unknown output format: {}\n\
                 Valid formats: json, yaml, table",
                s
            ),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
            Self::Table => write!(f, "table"),
        }
    }
}

#[derive(Tabled)]
struct ValueRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Values")]
    values: String,
}

/// Write one record in `format`
pub fn write_record<W: Write>(out: &mut W, record: &NodeRecord, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(record)?)?;
        }
        OutputFormat::Yaml => {
            write!(out, "{}", serde_yaml::to_string(record)?)?;
        }
        OutputFormat::Table => {
            writeln!(out, "{} {}", "Kind:".bold(), record.kind)?;
            writeln!(out, "{} {}", "Type:".bold(), record.node_role)?;
            for (name, value) in &record.metadata {
                writeln!(out, "{} {}", format!("{name}:").bold(), value)?;
            }

            if record.info.is_empty() {
                writeln!(out, "{}", "No values collected".dimmed())?;
                return Ok(());
            }

            let rows: Vec<ValueRow> = record
                .info
                .iter()
                .map(|(key, info)| ValueRow {
                    key: key.clone(),
                    values: info
                        .values
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                })
                .collect();

            let table = Table::new(&rows).with(Style::rounded()).to_string();
            writeln!(out, "{table}")?;
        }
    }
    Ok(())
}

/// Write every record, YAML documents separated by `---`
pub fn write_records<W: Write>(out: &mut W, records: &[NodeRecord], format: OutputFormat) -> Result<()> {
    for (i, record) in records.iter().enumerate() {
        if i > 0 && format == OutputFormat::Yaml {
            writeln!(out, "---")?;
        }
        write_record(out, record, format)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodecollect::{Info, NodeRole, Scalar, ValueSet};

    fn record() -> NodeRecord {
        let mut info = ValueSet::new();
        info.insert("kubeletAnonymousAuthArgumentSet", Info::new(vec![Scalar::from("false")]));
        info.insert("kubeletReadOnlyPortArgumentSet", Info::new(vec![Scalar::from(0_i64)]));
        let now = "2024-03-01T10:00:00Z".parse().unwrap();
        NodeRecord::assemble(NodeRole::Worker, info, Some("node-1"), now)
    }

    fn render(format: OutputFormat) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        write_records(&mut out, &[record(), record()], format).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_json_output() {
        let text = render(OutputFormat::Json);
        assert!(text.contains(r#""apiVersion": "v1""#));
        assert!(text.contains(r#""type": "worker""#));
        assert!(text.contains(r#""creationTimestamp": "2024-03-01T10:00:00Z""#));
    }

    #[test]
    fn test_yaml_documents_separated() {
        let text = render(OutputFormat::Yaml);
        assert_eq!(text.matches("---").count(), 1);
        assert_eq!(text.matches("kind: NodeInfo").count(), 2);
    }

    #[test]
    fn test_table_output() {
        let text = render(OutputFormat::Table);
        assert!(text.contains("kubeletReadOnlyPortArgumentSet"));
        assert!(text.contains("nodeName: node-1"));
    }
}
