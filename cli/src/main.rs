//! ChainConnex CLI: offline tooling around the ChainConnex façade.
//!
//! # Commands
//! ```text
//! chainconnex check            <value>
//! chainconnex encode-topics    --event <json> [--args <json>] [--address <addr>]
//! chainconnex decode-log       --event <json> --topics <...> --data <hex>
//! chainconnex validate-clauses --file <path.json>
//! chainconnex simulate         --blocks <N> --interval-ms <M>
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod cmd_simulate;
mod config;

use config::ConnexConfig;

#[derive(Parser)]
#[command(
    name = "chainconnex",
    about = "ChainConnex CLI: validate inputs, encode and decode event logs, simulate a chain",
    version
)]
struct Cli {
    /// Enable debug logging for all ChainConnex crates
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file (missing file means defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a value as address or bytes32 and print its canonical form
    Check {
        value: String,
    },

    /// Encode indexed event arguments into filter criteria
    #[command(name = "encode-topics")]
    EncodeTopics {
        /// ABI event JSON, inline or @path
        #[arg(long)]
        event: String,
        /// JSON object of indexed arguments, e.g. '{"from":"0x..."}'
        #[arg(long, default_value = "{}")]
        args: String,
        /// Contract address to pin the criteria to
        #[arg(long)]
        address: Option<String>,
    },

    /// Decode an event log from raw topics + data
    #[command(name = "decode-log")]
    DecodeLog {
        /// ABI event JSON, inline or @path
        #[arg(long)]
        event: String,
        /// topics[0] = event selector (unless anonymous), topics[1..] = indexed params
        #[arg(long, num_args = 1..)]
        topics: Vec<String>,
        /// Non-indexed params (hex, 0x-prefixed)
        #[arg(long, default_value = "0x")]
        data: String,
    },

    /// Normalise and validate a JSON array of transaction clauses
    #[command(name = "validate-clauses")]
    ValidateClauses {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Run the façade against a simulated, continuously mining chain
    Simulate {
        /// Number of blocks to mine before exiting
        #[arg(long, default_value_t = 5)]
        blocks: u32,
        /// Pause between mined blocks
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConnexConfig::load(cli.config.as_deref())?;
    if cli.verbose {
        config.log = config.log.verbose();
    }
    // A subscriber installed by an embedding process wins.
    let _ = chainconnex_observability::init_tracing(&config.log);

    match cli.command {
        Commands::Check { value } => cmd_check(&value),
        Commands::EncodeTopics { event, args, address } => {
            cmd_encode_topics(&event, &args, address.as_deref())
        }
        Commands::DecodeLog { event, topics, data } => cmd_decode_log(&event, &topics, &data),
        Commands::ValidateClauses { file } => cmd_validate_clauses(&file),
        Commands::Simulate { blocks, interval_ms } => {
            cmd_simulate::run(&config, blocks, interval_ms).await
        }
    }
}

// ─── Command implementations ─────────────────────────────────────────────────

fn cmd_check(value: &str) -> Result<()> {
    use chainconnex_core::validator::{canonical, is_address, is_bytes32};

    if is_address(value) {
        println!("address  {}", canonical(value));
    } else if is_bytes32(value) {
        println!("bytes32  {}", canonical(value));
    } else {
        anyhow::bail!("'{value}' is neither an address nor bytes32");
    }
    Ok(())
}

/// Inline JSON, or `@path` to read it from a file.
fn read_json_arg(arg: &str) -> Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("read '{path}'")),
        None => Ok(arg.to_string()),
    }
}

fn load_coder(event: &str) -> Result<chainconnex_evm::AbiEventCoder> {
    let json = read_json_arg(event)?;
    Ok(chainconnex_evm::AbiEventCoder::from_event_json(&json)?)
}

fn cmd_encode_topics(event: &str, args: &str, address: Option<&str>) -> Result<()> {
    use chainconnex_core::validator::{ensure, is_address};
    use chainconnex_core::{EventCoder, EventCriteria, IndexedArgs};

    let coder = load_coder(event)?;
    let indexed: IndexedArgs = serde_json::from_str(args).context("parse args JSON object")?;
    let topics = coder.encode(&indexed)?;

    let mut criteria = EventCriteria::default();
    if let Some(addr) = address {
        ensure(is_address(addr), "arg0 expected address")?;
        criteria.address = Some(addr.to_lowercase());
    }
    for (slot, topic) in criteria.topics_mut().into_iter().zip(topics) {
        *slot = topic;
    }

    tracing::debug!(signature = %coder.signature(), "Encoded topics");
    println!("{}", serde_json::to_string_pretty(&criteria)?);
    Ok(())
}

fn cmd_decode_log(event: &str, topics: &[String], data: &str) -> Result<()> {
    use chainconnex_core::EventCoder;

    let coder = load_coder(event)?;
    let decoded = coder.decode(data, topics)?;
    println!("Event:  {}", coder.signature());
    println!("{}", serde_json::to_string_pretty(&decoded)?);
    Ok(())
}

fn cmd_validate_clauses(path: &std::path::Path) -> Result<()> {
    use chainconnex_core::clause::clauses_from_json;

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read clauses file '{}'", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw).context("parse clauses JSON")?;
    match clauses_from_json(&value) {
        Ok(clauses) => {
            println!("✓ {} clause(s) valid", clauses.len());
            println!("{}", serde_json::to_string_pretty(&clauses)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ {e}");
            std::process::exit(1);
        }
    }
}
