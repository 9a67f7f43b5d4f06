//! `coursebot doctor` — Diagnose setup.

use std::path::Path;
use std::time::Duration;

use coursebot_config::AppConfig;

const API_KEY_PREFIX: &str = "sk-ant-";
const SHOWN_FILES: usize = 5;
const PREVIEW_CHARS: usize = 100;

pub async fn run(config_path: Option<&Path>, url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Coursebot Doctor — Setup Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;

    let config = match AppConfig::load(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            return Err("1 issue(s) found".into());
        }
    };

    // API key
    match config.api_key() {
        None => {
            println!("  ❌ ANTHROPIC_API_KEY not set");
            println!("     Set it with: export ANTHROPIC_API_KEY='your-key'");
            issues += 1;
        }
        Some(key) if !key.starts_with(API_KEY_PREFIX) => {
            println!("  ❌ API key format looks incorrect (should start with '{API_KEY_PREFIX}')");
            issues += 1;
        }
        Some(_) => println!("  ✅ API key is set"),
    }

    // Knowledge base
    let store = config.document_store();
    if !store.exists() {
        println!("  ❌ Knowledge base {} not found", store.root().display());
        issues += 1;
    } else {
        let entries = store.entries();
        if entries.is_empty() {
            println!("  ⚠️  No course files in {}", store.root().display());
            println!("     Add your course materials (.txt, .md, .csv, .pdf) there");
            issues += 1;
        } else {
            println!(
                "  ✅ Found {} files in {}",
                entries.len(),
                store.root().display()
            );
            for entry in entries.iter().take(SHOWN_FILES) {
                println!("     - {}", entry.name);
            }
            if entries.len() > SHOWN_FILES {
                println!("     ... and {} more", entries.len() - SHOWN_FILES);
            }
        }
    }

    // Instructions
    let instructions = config.instruction_source();
    match instructions.path() {
        Some(path) if path.is_file() => println!("  ✅ Instructions file {}", path.display()),
        Some(path) => println!(
            "  ⚠️  Instructions file {} not found, using the built-in default",
            path.display()
        ),
        None => println!("  ✅ Using built-in instructions"),
    }

    if let Some(url) = url {
        issues += probe_server(url.trim_end_matches('/')).await;
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
        Ok(())
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
        Err(format!("{issues} issue(s) found").into())
    }
}

/// Check a running server. Returns the number of failed checks.
async fn probe_server(base: &str) -> usize {
    let client = reqwest::Client::new();
    let mut issues = 0;

    match client
        .get(format!("{base}/health"))
        .timeout(Duration::from_secs(2))
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => println!("  ✅ Server is running at {base}"),
        Ok(resp) => {
            println!("  ⚠️  Server returned status {}", resp.status());
            issues += 1;
        }
        Err(e) => {
            println!("  ❌ Server not reachable at {base}: {e}");
            println!("     Start it with: coursebot serve");
            return issues + 1;
        }
    }

    let body = serde_json::json!({
        "message": "Hello, can you help me with this course?",
        "history": [],
    });
    match client
        .post(format!("{base}/chat"))
        .json(&body)
        .timeout(Duration::from_secs(30))
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => {
            let reply = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v["response"].as_str().map(str::to_string))
                .unwrap_or_default();
            let preview: String = reply.chars().take(PREVIEW_CHARS).collect();
            println!("  ✅ Chat endpoint working");
            println!("     Response preview: {preview}...");
        }
        Ok(resp) => {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            println!("  ❌ Chat returned error: {status}");
            println!("     {text}");
            issues += 1;
        }
        Err(e) => {
            println!("  ❌ Error testing chat: {e}");
            issues += 1;
        }
    }

    issues
}
