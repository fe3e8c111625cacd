//! Matched betting hedge calculator entry point.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use matched_betting::betting::HedgeRequest;
use matched_betting::config::Config;
use matched_betting::error::HedgeError;
use matched_betting::hedge::{
    hedge_2way, hedge_3way, is_arbitrage, lay_stake, MarketBranch, MasterCalculator,
};
use matched_betting::market::{BetType, MarketOdds};

/// Matched betting hedge calculator.
#[derive(Parser, Debug)]
#[command(name = "matched-betting")]
#[command(about = "Hedge-stake calculator for qualifying bets, freebets and risk-free bets")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hedge a single bookmaker bet with the closed-form formulas.
    Hedge {
        /// Bet type: "Qualifying bet", "Freebet" or "Risk-free bet".
        #[arg(short, long, value_parser = BetType::parse_label)]
        bet_type: BetType,

        /// Stake of the placed bet.
        #[arg(short, long)]
        stake: f64,

        /// Odds of the placed bet.
        #[arg(short, long)]
        odds: f64,

        /// Odds on the remaining outcome(s): one for 2-way, two for 3-way.
        #[arg(long, num_args = 1..=2, required = true)]
        other: Vec<f64>,
    },

    /// Stake to lay on a betting exchange.
    Lay {
        /// Bet type: "Qualifying bet", "Freebet" or "Risk-free bet".
        #[arg(short, long, value_parser = BetType::parse_label)]
        bet_type: BetType,

        /// Stake of the back bet.
        #[arg(short, long)]
        stake: f64,

        /// Odds of the back bet.
        #[arg(short, long)]
        odds: f64,

        /// Exchange lay odds.
        #[arg(long)]
        lay_odds: f64,

        /// Exchange commission (defaults to EXCHANGE_FEE).
        #[arg(long)]
        fee: Option<f64>,
    },

    /// Return-to-player of a set of market odds.
    Rtp {
        /// Odds per outcome in order 1, [X,] 2.
        #[arg(num_args = 2..=3, required = true)]
        odds: Vec<f64>,
    },

    /// Run the master calculator on a JSON position file.
    Master {
        /// Path to a JSON file with `market_odds`, `bets` and `refund_as_freebet`.
        file: PathBuf,

        /// Treat risk-free refunds as freebet credit regardless of the file.
        /// Otherwise the file's flag applies, then REFUND_AS_FREEBET.
        #[arg(long)]
        refund_as_freebet: bool,

        /// Print the full recommendation as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check configuration validity.
    CheckConfig,
}

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Logging settings come from the environment even if the rest of the
    // configuration is invalid; commands validate it themselves.
    let env_config = Config::load().unwrap_or_default();

    // Initialize logging
    let filter = if args.verbose || env_config.verbose {
        EnvFilter::new("matched_betting=debug,info")
    } else {
        EnvFilter::try_new(&env_config.rust_log).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match args.command {
        Command::Hedge {
            bet_type,
            stake,
            odds,
            other,
        } => cmd_hedge(bet_type, stake, odds, &other),
        Command::Lay {
            bet_type,
            stake,
            odds,
            lay_odds,
            fee,
        } => cmd_lay(bet_type, stake, odds, lay_odds, fee),
        Command::Rtp { odds } => cmd_rtp(&odds),
        Command::Master {
            file,
            refund_as_freebet,
            json,
        } => cmd_master(&file, refund_as_freebet, json),
        Command::CheckConfig => cmd_check_config(),
    }
}

/// Load and validate configuration.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(HedgeError::from)?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    debug!(?config, "configuration loaded");
    Ok(config)
}

/// Hedge a single bet.
fn cmd_hedge(bet_type: BetType, stake: f64, odds: f64, other: &[f64]) -> anyhow::Result<()> {
    if stake < 0.0 || odds <= 1.0 || other.iter().any(|o| *o <= 1.0) {
        anyhow::bail!("stake must be non-negative and all odds greater than 1.0");
    }

    let stakes = match *other {
        [odds_other] => vec![hedge_2way(bet_type, stake, odds, odds_other)],
        [odds_other_1, odds_other_2] => {
            hedge_3way(bet_type, stake, odds, odds_other_1, odds_other_2).to_vec()
        }
        _ => anyhow::bail!("expected one or two opposing odds, got {}", other.len()),
    };

    println!("{} {} @ {}", bet_type, stake, odds);
    for (odds_other, hedge) in other.iter().zip(&stakes) {
        println!("  Hedge @ {:<8} {:.2}", odds_other, hedge);
    }

    Ok(())
}

/// Exchange lay stake.
fn cmd_lay(
    bet_type: BetType,
    stake: f64,
    odds: f64,
    lay_odds: f64,
    fee: Option<f64>,
) -> anyhow::Result<()> {
    let fee = match fee {
        Some(fee) => fee,
        None => load_config()?.exchange_fee,
    };

    let lay = lay_stake(bet_type, stake, odds, lay_odds, fee)?;
    println!("{} {} @ {}", bet_type, stake, odds);
    println!("  Lay @ {} (fee {}): {}", lay_odds, fee, lay);

    Ok(())
}

/// Return-to-player.
fn cmd_rtp(odds: &[f64]) -> anyhow::Result<()> {
    let market_odds = MarketOdds::from_slice(odds)?;
    market_odds.validate()?;

    let rtp = market_odds.return_to_player();
    println!("RTP: {:.4} ({:.2}%)", rtp, rtp * 100.0);
    if is_arbitrage(market_odds.as_slice()) {
        println!("  Odds admit an arbitrage");
    }

    Ok(())
}

/// Master calculation over a position file.
fn cmd_master(file: &Path, refund_as_freebet: bool, json: bool) -> anyhow::Result<()> {
    let config = load_config()?;

    let raw = fs::read_to_string(file)
        .map_err(HedgeError::from)
        .with_context(|| format!("reading {}", file.display()))?;
    let mut request: HedgeRequest = serde_json::from_str(&raw).map_err(HedgeError::from)?;
    if refund_as_freebet {
        request.refund_as_freebet = Some(true);
    }

    let position = request.into_position_or(config.refund_as_freebet)?;
    position.validate()?;
    info!(kind = %position.kind(), "running master calculation");

    let recommendation = MasterCalculator::new((&config).into())
        .solve(&position)
        .map_err(HedgeError::from)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
        return Ok(());
    }

    println!("======================================================================");
    println!("MATCHED BETTING - MASTER CALCULATION");
    println!("======================================================================");
    println!("  Market: {}", recommendation.kind);
    println!("  RTP: {:.4}", recommendation.return_to_player);
    match recommendation.branch {
        MarketBranch::Normal => println!("  Branch: normal"),
        MarketBranch::Arbitrage { dominant } => {
            println!("  Branch: arbitrage (no hedge on {})", dominant)
        }
    }
    println!("----------------------------------------------------------------------");
    for ((outcome, stake), odds) in recommendation
        .kind
        .outcomes()
        .iter()
        .zip(recommendation.stakes.as_slice())
        .zip(position.market_odds().as_slice())
    {
        println!("  Outcome {:<2} @ {:<8} stake {}", outcome, odds, stake);
    }
    println!("----------------------------------------------------------------------");
    println!("  Guaranteed payoff: {:.2}", recommendation.guaranteed_payoff());
    println!("======================================================================");

    Ok(())
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("MATCHED BETTING - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    // Show configuration summary
    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Max Iterations: {}", config.hedge_max_iterations);
    println!("  Tolerance: {:e}", config.hedge_tolerance);
    println!("  Exchange Fee: {}", config.exchange_fee);
    println!(
        "  Risk-free Refund: {}",
        if config.refund_as_freebet { "Freebet credit" } else { "Cash" }
    );
    println!("  Log Level: {}", config.rust_log);
    println!("  Verbose: {}", config.verbose);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}
