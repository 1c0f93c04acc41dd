//! The `meetquiz init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("meetquiz.toml").exists() {
        println!("meetquiz.toml already exists, skipping.");
    } else {
        std::fs::write("meetquiz.toml", SAMPLE_CONFIG)?;
        println!("Created meetquiz.toml");
    }

    println!("\nNext steps:");
    println!("  1. Export OPENROUTER_API_KEY (or edit meetquiz.toml)");
    println!("  2. Run: meetquiz seed");
    println!("  3. Run: meetquiz quiz 1 --type outro");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# meetquiz configuration

default_provider = "openrouter"
default_model = "openai/gpt-oss-20b:free"
temperature = 0.7
max_tokens = 4096
timeout_secs = 60
state_path = "meetquiz-state.json"

[providers.openrouter]
type = "openrouter"
api_key = "${OPENROUTER_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

# Canned offline answers, useful for demos:
# default_provider = "offline"
[providers.offline]
type = "mock"
"#;
