use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use shellsim::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shellsim")]
#[command(about = "Order book replay and fill simulation for trading competition strategies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //replay one or more days against a strategy
    Run {
        //prices csv, repeat for several days
        #[arg(long, required = true)]
        prices: Vec<PathBuf>,

        //trades csv matching each prices file, in the same order
        #[arg(long, required = true)]
        trades: Vec<PathBuf>,

        //json configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        //strategy type (fair_value, market_maker), overrides the config
        #[arg(long)]
        strategy: Option<String>,

        //results directory for pnl and position series, overrides the config
        #[arg(long)]
        results_dir: Option<PathBuf>,

        //skip writing series files
        #[arg(long)]
        no_artifacts: bool,

        //replay the buy side with the competition's original remainder formula
        #[arg(long)]
        legacy_fills: bool,
    },

    //write the default configuration to a file
    InitConfig {
        #[arg(long, default_value = "shellsim.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            prices,
            trades,
            config,
            strategy,
            results_dir,
            no_artifacts,
            legacy_fills,
        } => {
            let mut configuration = match config {
                Some(path) => ReplayConfiguration::from_json_file(&path)?,
                None => ReplayConfiguration::default(),
            };

            if let Some(name) = strategy {
                configuration.strategy_type = StrategyType::parse(&name)
                    .ok_or_else(|| anyhow::anyhow!("Unknown strategy: {}", name))?;
            }
            if let Some(dir) = results_dir {
                configuration.results_dir = Some(dir);
            }
            if no_artifacts {
                configuration.results_dir = None;
            }
            if legacy_fills {
                configuration.remainder_rule = RemainderRule::Legacy;
            }
            configuration.validate()?;

            run_replays(&prices, &trades, &configuration)?;
        }
        Commands::InitConfig { output } => {
            ReplayConfiguration::default().to_json_file(&output)?;
            println!("Default configuration written to {:?}", output);
        }
    }

    Ok(())
}

fn run_replays(
    prices: &[PathBuf],
    trades: &[PathBuf],
    configuration: &ReplayConfiguration,
) -> Result<()> {
    println!("Shellsim Order Book Replay");
    println!("==========================\n");

    let days = pair_paths(prices, trades)?;
    println!(
        "Replaying {} day(s) with strategy {:?} ({:?} fills)\n",
        days.len(),
        configuration.strategy_type,
        configuration.remainder_rule
    );

    //days are independent, each gets its own session and strategy
    let results: Vec<ReplayResult> = days
        .par_iter()
        .map(|(prices_path, trades_path)| replay_day(prices_path, trades_path, configuration))
        .collect::<Result<_>>()?;

    let mut grand_total = 0.0;
    for result in &results {
        println!("Day {} ({} ticks)", result.dataset, result.ticks);
        ReplaySummary::from_result(result).pretty_print_table();

        if let Some(root) = &configuration.results_dir {
            let files = ArtifactWriter::new(root).write(result)?;
            println!("{} series written to {:?}", files.len(), root);
        }

        println!("Total profit: {}\n", result.total_pnl);
        grand_total += result.total_pnl;
    }

    if results.len() > 1 {
        println!("Total profit across all days: {}", grand_total);
    }

    Ok(())
}

fn replay_day(
    prices_path: &Path,
    trades_path: &Path,
    configuration: &ReplayConfiguration,
) -> Result<ReplayResult> {
    let data = MarketData::load(prices_path, trades_path, configuration.delimiter_byte())
        .context(format!("Failed to load data for {:?}", prices_path))?;

    let mut strategy = build_strategy(configuration);
    let mut session = ReplaySession::new(data, configuration.session_config());
    let result = session.run(strategy.as_mut())?;
    Ok(result)
}
