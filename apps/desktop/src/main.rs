use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use coach_core::{
    gemini::{load_settings, GeminiProvider},
    CoachClient,
};
use shared::domain::BehaviorCategory;

/// One-shot advice request from the terminal, using the same provider
/// configuration as the desktop app.
#[derive(Parser, Debug)]
#[command(name = "tutor-ally-cli")]
struct Args {
    /// Behavior category (defiance, disengagement, distraction, frustration,
    /// impulsivity).
    #[arg(long)]
    category: String,
    /// What happened in the session.
    #[arg(long)]
    scenario: String,
    /// Override the configured model name.
    #[arg(long)]
    model: Option<String>,
}

fn parse_category(raw: &str) -> Result<BehaviorCategory> {
    for category in BehaviorCategory::ALL {
        if raw.eq_ignore_ascii_case(category.label()) {
            return Ok(category);
        }
    }
    bail!("unknown behavior category: {raw}")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let category = parse_category(&args.category)?;

    let mut settings = load_settings();
    if let Some(model) = args.model {
        settings.model = model;
    }
    let provider = Arc::new(GeminiProvider::new(settings)?);
    let client = CoachClient::new(provider);

    let advice = client.request_advice(&args.scenario, category).await?;
    println!("{advice}");
    Ok(())
}
