//! `coursebot config` — Print a default configuration file.

use coursebot_config::AppConfig;

pub fn run() {
    println!("# Coursebot configuration");
    println!("# Save as coursebot.toml, or pass with --config.");
    println!("# The API key is best supplied via ANTHROPIC_API_KEY.");
    println!();
    print!("{}", AppConfig::default_toml());
}
