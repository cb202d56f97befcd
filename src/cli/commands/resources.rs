use serde_json::Value;

use crate::cli::OutputFormat;
use crate::resource::ResourceRegistry;

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let registry = ResourceRegistry::builtin();

    match output_format {
        OutputFormat::Json => {
            let schemas: Vec<Value> = registry.iter().map(|s| s.describe()).collect();
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }
        OutputFormat::Text => {
            println!("{:<12} {:<14} {:<8} {}", "RESOURCE", "TABLE", "FIELDS", "STATUS");
            for schema in registry.iter() {
                println!(
                    "{:<12} {:<14} {:<8} {}",
                    schema.name,
                    schema.table,
                    schema.fields.len(),
                    schema.status_field.unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}
