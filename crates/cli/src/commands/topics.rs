//! `coursebot topics` — Show what a question would load, without calling the API.

use std::path::Path;

use coursebot_agent::ContextBuilder;
use coursebot_config::AppConfig;

pub async fn run(config_path: Option<&Path>, question: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config =
        AppConfig::load(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    let builder = ContextBuilder::new(
        config.keyword_index()?,
        config.instruction_source(),
        config.document_store(),
        config.context_assembler(),
    );

    let question = question.to_string();
    let (selection, context) =
        tokio::task::spawn_blocking(move || builder.build(&question)).await?;

    if selection.is_fallback() {
        println!("📚 Chapters: {selection} (no keyword matched, using default)");
    } else {
        println!("📚 Chapters: {selection}");
    }

    println!();
    println!("   Included ({}):", context.included.len());
    for name in &context.included {
        println!("     + {name}");
    }
    if !context.skipped.is_empty() {
        println!("   Unreadable ({}):", context.skipped.len());
        for name in &context.skipped {
            println!("     - {name}");
        }
    }
    println!();
    println!("   Context size: ~{} tokens", context.estimated_tokens());

    Ok(())
}
