//! AgentFICO command line.
//!
//! Scores an agent address against the mock or no-data sources and prints
//! the resulting record as JSON, or backtests the configured weights.

use std::path::PathBuf;
use std::sync::Arc;

use anti_gaming::{AntiGamingChain, CoefficientStore};
use anyhow::{Context, Result};
use backtester::{default_weight_variations, generate_report, sample_agents, BacktestRunner};
use clap::{Parser, Subcommand, ValueEnum};
use data_sources::mock::DEFAULT_SEED;
use data_sources::{MockActivitySource, NoDataActivitySource};
use fico_core::config::{ScoringConfig, MAX_ANALYSIS_DAYS};
use score_engine::{risk_tier, ScoreCalculator, ScoreSources};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "agent-fico", version, about = "Credit scores for on-chain agents")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score an agent address
    Score {
        address: String,

        /// Analysis window in days (defaults to AGENTFICO_ANALYSIS_DAYS)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_ANALYSIS_DAYS as i64))]
        days: Option<u32>,

        #[arg(long, value_enum, default_value_t = SourceKind::Mock)]
        source: SourceKind,

        /// Seed for the mock sources
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Directory containing `coefficients/*.json`
        #[arg(long)]
        config_dir: Option<PathBuf>,
    },
    /// Overall score and tier from three sub-scores
    Subscores {
        tx_success: u32,
        x402: u32,
        erc8004: u32,
    },
    /// Backtest the configured weights against the sample agents
    Backtest {
        /// Print a markdown report instead of JSON
        #[arg(long)]
        report: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    Mock,
    Nodata,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "agent_fico=info,score_engine=info,anti_gaming=info".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = ScoringConfig::from_env().context("Invalid scoring configuration")?;

    match cli.command {
        Command::Score {
            address,
            days,
            source,
            seed,
            config_dir,
        } => {
            let days = days.unwrap_or(config.analysis_days);
            let dir = config_dir.or_else(|| config.resolve_config_dir());
            info!(config_dir = ?dir, "Loading anti-gaming coefficients");

            let store = Arc::new(CoefficientStore::load(dir));
            let chain = Arc::new(AntiGamingChain::new(store));

            let calculator = match source {
                SourceKind::Mock => ScoreCalculator::new(ScoreSources::mock(seed), config.weights)
                    .with_adjustments(chain, Arc::new(MockActivitySource::new(seed))),
                SourceKind::Nodata => ScoreCalculator::new(ScoreSources::no_data(), config.weights)
                    .with_adjustments(chain, Arc::new(NoDataActivitySource)),
            };

            let record = calculator.calculate_score(&address, days).await;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Subscores {
            tx_success,
            x402,
            erc8004,
        } => {
            let calculator = ScoreCalculator::new(ScoreSources::no_data(), config.weights);
            let overall = calculator.calculate_from_subscores(tx_success, x402, erc8004);
            let tier = risk_tier(overall);
            let summary = serde_json::json!({
                "overall": overall,
                "riskLevel": tier,
                "riskLevelName": tier.name(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Backtest { report } => {
            let runner = BacktestRunner::new(config.weights);
            let agents = sample_agents();

            if report {
                println!("{}", generate_report(&runner, &agents)?);
            } else {
                let summary = runner.run_backtest(&agents);
                let sensitivity =
                    runner.analyze_weight_sensitivity(&agents, &default_weight_variations()?)?;
                let output = serde_json::json!({
                    "summary": summary,
                    "weightAnalysis": sensitivity,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
    }

    Ok(())
}
