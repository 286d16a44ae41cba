//! content-seed: copies the remote Quran and Hadith corpora into the MongoDB
//! mirror. Each selected domain is cleared and repopulated; a run that fails
//! part way exits non-zero and should simply be re-run.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{error, info};

use islamic_content_gateway::bootstrap::build_seeders;
use islamic_content_gateway::observability::init_logging;
use islamic_content_gateway::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "content-seed", version, about = "Populate the local content mirror", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(long, env = "CONTENT_API_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Which corpus to copy
    #[arg(long, value_enum, default_value_t = Target::All)]
    target: Target,

    /// Quran edition to copy (repeatable; replaces the configured list)
    #[arg(long = "edition")]
    editions: Vec<String>,

    /// Hadith collection slug to copy (repeatable; replaces the configured list)
    #[arg(long = "collection")]
    collections: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Target {
    Quran,
    Hadith,
    All,
}

impl Target {
    fn quran(self) -> bool {
        matches!(self, Target::Quran | Target::All)
    }

    fn hadith(self) -> bool {
        matches!(self, Target::Hadith | Target::All)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path).await,
        None => AppConfig::load().await,
    }
    .context("failed to load configuration")?;

    if !cli.editions.is_empty() {
        config.seeding.quran_editions = cli.editions.clone();
    }
    if !cli.collections.is_empty() {
        config.seeding.hadith_collections = cli.collections.clone();
    }

    init_logging(&config.logging).context("failed to initialize logging")?;
    info!(target_corpus = ?cli.target, database = %config.mirror.database, "🌱 Starting mirror seeding");

    let (quran, hadith) = build_seeders(&config).context("failed to prepare seeding")?;

    if cli.target.quran() {
        let report = quran.run().await.map_err(|e| {
            error!(error = %e, "Quran seeding failed");
            e
        })?;
        report.log();
        println!("{}", report);
    }

    if cli.target.hadith() {
        let report = hadith.run().await.map_err(|e| {
            error!(error = %e, "Hadith seeding failed");
            e
        })?;
        report.log();
        println!("{}", report);
    }

    info!("✅ Seeding complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_repeatable_filters() {
        let cli = Cli::try_parse_from([
            "content-seed",
            "--target",
            "quran",
            "--edition",
            "en.asad",
            "--edition",
            "quran-uthmani",
        ])
        .unwrap();

        assert_eq!(cli.target, Target::Quran);
        assert!(cli.target.quran() && !cli.target.hadith());
        assert_eq!(cli.editions, vec!["en.asad", "quran-uthmani"]);
        assert!(cli.collections.is_empty());
    }

    #[test]
    fn test_defaults_to_everything() {
        let cli = Cli::try_parse_from(["content-seed"]).unwrap();
        assert_eq!(cli.target, Target::All);
    }
}
