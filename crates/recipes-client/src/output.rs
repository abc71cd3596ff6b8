//! Output formatting

use clap::ValueEnum;
use colored::Colorize;
use recipes_forms::{DraftSnapshot, Entry};
use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn print<T: Serialize>(&self, data: &T) {
        match self {
            OutputFormat::Yaml => {
                println!("{}", serde_yaml::to_string(data).unwrap_or_default());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Table => match serde_json::to_value(data) {
                Ok(Value::Object(map)) => {
                    let rows: Vec<PropertyRow> = map
                        .into_iter()
                        .map(|(key, value)| PropertyRow {
                            key,
                            value: match value {
                                Value::String(s) => s,
                                other => other.to_string(),
                            },
                        })
                        .collect();
                    println!("{}", Table::new(rows));
                }
                _ => println!("{}", serde_json::to_string_pretty(data).unwrap_or_default()),
            },
        }
    }
}

#[derive(Tabled)]
struct PropertyRow {
    key: String,
    value: String,
}

#[derive(Tabled)]
struct FieldErrorRow {
    field: String,
    error: String,
}

/// Print every field error of a draft, one row per field or entry
pub fn print_field_errors(snapshot: &DraftSnapshot) {
    let mut rows = Vec::new();
    for (field, entry) in snapshot.field_errors.iter() {
        match entry {
            Entry::One(Some(error)) => rows.push(FieldErrorRow {
                field: field.to_string(),
                error: error.clone(),
            }),
            Entry::Many(errors) => {
                for (i, error) in errors.iter().enumerate() {
                    if let Some(error) = error {
                        rows.push(FieldErrorRow {
                            field: format!("{}[{}]", field, i),
                            error: error.clone(),
                        });
                    }
                }
            }
            Entry::One(None) => {}
        }
    }

    if rows.is_empty() {
        return;
    }
    eprintln!("{}", "The form has errors:".yellow().bold());
    eprintln!("{}", Table::new(rows));
}
