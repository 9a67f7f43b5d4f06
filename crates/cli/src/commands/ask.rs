//! `coursebot ask` — One-shot question from the terminal.

use std::path::Path;

use coursebot_agent::ChatOrchestrator;
use coursebot_config::AppConfig;
use tracing::{debug, warn};

pub async fn run(config_path: Option<&Path>, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config =
        AppConfig::load(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set the environment variable:");
        eprintln!("    export ANTHROPIC_API_KEY='sk-ant-...'");
        eprintln!();
        eprintln!("  Or add `api_key` to your config file.");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let orchestrator = ChatOrchestrator::from_config(&config)?;
    debug!(
        model = %config.model,
        knowledge_base = %config.course.knowledge_base_dir.display(),
        "Asking one question"
    );

    eprint!("  Thinking...");
    let result = orchestrator.chat(message, Vec::new()).await;
    eprint!("\r              \r");
    let reply = result.inspect_err(|e| warn!(error = %e, "Question failed"))?;

    println!("{}", reply.response);
    eprintln!();
    eprintln!("  Chapters:  {}", reply.selection);
    eprintln!("  Documents: {}", reply.documents.len());
    if let Some(usage) = reply.usage {
        eprintln!(
            "  Tokens:    {} in / {} out",
            usage.input_tokens, usage.output_tokens
        );
    }

    Ok(())
}
