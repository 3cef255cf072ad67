//! Rewrites a persona catalog so every keyword is in lemma form.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use persona_api::persona::analyzer::RuleBasedAnalyzer;
use persona_api::persona::catalog::{lemmatize_catalog, load_personas, save_personas};

/// Normalize persona keywords and negative keywords to lemma form
#[derive(Parser, Debug)]
#[command(name = "lemmatize-catalog", version, about, long_about = None)]
struct Args {
    /// Catalog to read
    input: PathBuf,

    /// Where to write the lemmatized catalog
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut personas = load_personas(&args.input)
        .with_context(|| format!("Failed to load catalog {}", args.input.display()))?;

    let analyzer = RuleBasedAnalyzer::new();
    lemmatize_catalog(&mut personas, &analyzer);

    for persona in &personas {
        info!(
            "{}: keywords={:?} negative_keywords={:?}",
            persona.persona_name, persona.keywords, persona.negative_keywords
        );
    }

    save_personas(&args.output, &personas)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!(
        "Lemmatization complete. Output saved to {}",
        args.output.display()
    );
    Ok(())
}
