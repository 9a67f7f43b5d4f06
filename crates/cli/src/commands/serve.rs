//! `coursebot serve` — Start the HTTP API server.

use std::path::Path;

use coursebot_config::AppConfig;
use tracing::info;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config =
        AppConfig::load(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        info!(port, "Port overridden from the command line");
        config.gateway.port = port;
    }

    println!("🦷 Coursebot Gateway");
    println!("   Listening:      {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:          {}", config.model);
    println!(
        "   Knowledge base: {}",
        config.course.knowledge_base_dir.display()
    );
    println!("   Context mode:   {:?}", config.course.context_mode);
    if !config.has_api_key() {
        println!("   ⚠️  ANTHROPIC_API_KEY not set; /chat will return errors");
    }

    coursebot_gateway::start(config).await?;

    Ok(())
}
