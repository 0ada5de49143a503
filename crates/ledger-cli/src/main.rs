use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::{Args, Parser, Subcommand};
use ledger_core::{
    clock::{Clock, SystemClock},
    constants::DEFAULT_DIFFICULTY_BITS,
    Block, BlockTemplate, Chain, MiningConfig, ProofOfWork, SearchStrategy,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "Mine and check blocks of a proof-of-work ledger")]
struct Cli {
    #[command(flatten)]
    mining: MiningArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct MiningArgs {
    /// Leading zero bits required in every block hash
    #[arg(long, global = true, default_value_t = DEFAULT_DIFFICULTY_BITS)]
    difficulty: u32,

    /// Search nonces on a rayon pool instead of the calling thread
    #[arg(long, global = true)]
    parallel: bool,

    /// Shards per batch with --parallel (0 = one per pool thread)
    #[arg(long, global = true, default_value_t = 0)]
    workers: usize,

    /// Largest nonce tried before mining gives up
    #[arg(long, global = true, default_value_t = u64::MAX)]
    max_nonce: u64,
}

impl MiningArgs {
    fn config(&self) -> MiningConfig {
        let strategy = if self.parallel {
            SearchStrategy::Parallel {
                workers: self.workers,
            }
        } else {
            SearchStrategy::Sequential
        };
        MiningConfig::default()
            .with_difficulty(self.difficulty)
            .with_max_nonce(self.max_nonce)
            .with_strategy(strategy)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a chain from the given payloads and print every block
    Demo {
        /// Payloads appended after genesis
        #[arg(default_values = ["Send 0.1 BTC to jon", "Send 0.2 BTC to mike"])]
        payloads: Vec<String>,
        /// Print blocks as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mine a single block and print it as JSON
    Mine {
        #[arg(long)]
        payload: String,
        /// Hex predecessor hash; empty for a genesis block
        #[arg(long, default_value = "")]
        prev: String,
        /// Seconds since the UNIX epoch (defaults to now)
        #[arg(long, allow_negative_numbers = true)]
        timestamp: Option<i64>,
    },
    /// Check a claimed nonce and hash against the difficulty target
    Validate {
        #[arg(long)]
        payload: String,
        #[arg(long, default_value = "")]
        prev: String,
        #[arg(long, allow_negative_numbers = true)]
        timestamp: i64,
        #[arg(long)]
        nonce: u64,
        /// Hex block hash
        #[arg(long)]
        hash: String,
    },
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.mining.config();
    match cli.cmd {
        Command::Demo { payloads, json } => demo(config, &payloads, json),
        Command::Mine {
            payload,
            prev,
            timestamp,
        } => {
            let pow = ProofOfWork::from_config(&config)?;
            let prev = hex::decode(&prev).context("--prev is not valid hex")?;
            let timestamp = timestamp.unwrap_or_else(|| SystemClock.now());
            let block = Block::mine(payload, &prev, timestamp, &pow)?;
            println!("{}", serde_json::to_string_pretty(&block)?);
            Ok(())
        }
        Command::Validate {
            payload,
            prev,
            timestamp,
            nonce,
            hash,
        } => {
            let pow = ProofOfWork::from_config(&config)?;
            let prev = hex::decode(&prev).context("--prev is not valid hex")?;
            let claimed: [u8; 32] = hex::decode(&hash)
                .context("--hash is not valid hex")?
                .try_into()
                .map_err(|v: Vec<u8>| anyhow::anyhow!("--hash must be 32 bytes, got {}", v.len()))?;
            let template = BlockTemplate {
                timestamp,
                payload: payload.as_bytes(),
                prev_hash: &prev,
            };
            if !pow.validate(&template, nonce, &claimed) {
                bail!("proof of work is invalid");
            }
            println!("valid");
            Ok(())
        }
    }
}

fn demo(config: MiningConfig, payloads: &[String], json: bool) -> Result<()> {
    let mut chain = Chain::with_config(config, SystemClock)?;
    for payload in payloads {
        chain.append(payload.as_str())?;
    }
    info!("mined {} blocks", chain.blocks().len());

    for block in &chain {
        if json {
            println!("{}", serde_json::to_string(block)?);
        } else {
            print_block(block);
        }
    }

    match chain.verify() {
        Ok(()) => println!("chain valid: true"),
        Err(violation) => bail!("chain valid: false ({violation})"),
    }
    Ok(())
}

fn print_block(block: &Block) {
    let timestamp = DateTime::<Utc>::from_timestamp(block.timestamp(), 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| block.timestamp().to_string());
    println!("Prev. hash: {}", hex::encode(block.prev_hash()));
    println!("Data: {}", String::from_utf8_lossy(block.payload()));
    println!("Hash: {}", hex::encode(block.hash()));
    println!("Nonce: {}", block.nonce());
    println!("Timestamp: {timestamp}");
    println!();
}
