//! `hmv schema` command - Inspect the form schema and stage layout

use clap::Subcommand;
use console::style;
use miette::Result;
use serde_json::Value;

use crate::cli::helpers::load_config;
use crate::cli::GlobalOpts;
use crate::schema::{Field, SchemaRegistry};

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// Show the application fields and their types
    Show(ShowArgs),

    /// Show which stage owns which fields
    Stages,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show raw JSON schema instead of formatted summary
    #[arg(long)]
    pub raw: bool,
}

pub fn run(cmd: SchemaCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SchemaCommands::Show(args) => show_schema(args),
        SchemaCommands::Stages => show_stages(global),
    }
}

fn show_schema(args: ShowArgs) -> Result<()> {
    if args.raw {
        let content = SchemaRegistry::form_record().map_err(|e| miette::miette!("{}", e))?;
        println!("{}", content);
        return Ok(());
    }

    let schema = SchemaRegistry::form_record_json().map_err(|e| miette::miette!("{}", e))?;

    let title = schema["title"].as_str().unwrap_or("Application");
    let desc = schema["description"].as_str().unwrap_or("");
    println!("{}", title);
    println!("{}", "=".repeat(title.chars().count()));
    if !desc.is_empty() {
        println!("{}\n", desc);
    }

    let required: Vec<&str> = schema["required"]
        .as_array()
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    println!("Fields:");
    println!(
        "{:<24} {:<10} {:<5} {}",
        "NAME", "TYPE", "REQ", "DESCRIPTION"
    );
    println!("{}", "-".repeat(80));

    // Declaration order rather than the schema's map order
    for field in Field::all() {
        let prop = &schema["properties"][field.as_str()];
        let is_required = if required.contains(&field.as_str()) {
            "yes"
        } else {
            ""
        };
        println!(
            "{:<24} {:<10} {:<5} {}",
            field.as_str(),
            type_str(prop),
            is_required,
            prop["description"].as_str().unwrap_or("")
        );
    }

    println!("\nUse --raw for full JSON schema");
    Ok(())
}

fn show_stages(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?.wizard_config();
    let success = config.success_index();

    for (idx, stage) in config.stages().iter().enumerate() {
        let marker = if idx == success { "(terminal)" } else { "" };
        println!(
            "{} {} {}",
            style(format!("{}.", idx + 1)).dim(),
            style(&stage.name).bold(),
            style(marker).dim()
        );
        for field in &stage.fields {
            let options = config.choices().for_field(*field);
            if options.is_empty() {
                println!("     {:<24} {}", field.as_str(), field.label());
            } else {
                println!(
                    "     {:<24} {} [{}]",
                    field.as_str(),
                    field.label(),
                    options.join(", ")
                );
            }
        }
    }

    println!(
        "\nThe success screen returns to the first stage after {} seconds",
        config.reset_delay().as_secs()
    );
    Ok(())
}

fn type_str(prop: &Value) -> String {
    match &prop["type"] {
        Value::String(t) => t.clone(),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .filter(|t| *t != "null")
            .collect::<Vec<_>>()
            .join("|"),
        _ => "any".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_str_skips_null() {
        assert_eq!(type_str(&json!({"type": ["string", "null"]})), "string");
        assert_eq!(type_str(&json!({"type": "boolean"})), "boolean");
        assert_eq!(type_str(&json!({})), "any");
    }
}
