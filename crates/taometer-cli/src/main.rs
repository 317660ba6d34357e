// crates/taometer-cli/src/main.rs
//
// CLI entrypoint for taometer.
//
// Computes APY and effective take for a validator hotkey: subnet mode for
// netuid > 0, root-network mode for netuid 0. All numbers are "as of" a
// fixed block height, defaulting to the current chain head.

mod output;

use clap::{Parser, ValueEnum};

use output::ApyRow;
use taometer_chain::{
    effective_take, root_apy, subnet_apy, ChainClient, FlowStrategy, HttpChainClient, RunOptions,
};
use taometer_core::{CalcConfig, Interval};

/// taometer — validator APY and effective-take calculator.
#[derive(Parser, Debug)]
#[command(
    name = "taometer",
    version = "0.1.0",
    about = "Computes annualized yield and effective take for a validator hotkey"
)]
struct Cli {
    /// Subnet to measure; 0 selects the root network.
    netuid: u16,

    /// Validator hotkey (SS58).
    hotkey: String,

    /// Interval to measure: 1h, 24h, 7d, 30d, year, or all.
    interval: String,

    /// Block height to measure at; defaults to the current chain head.
    block: Option<u64>,

    /// Node HTTP endpoint.
    #[arg(long, env = "TAOMETER_NODE", default_value = "http://localhost:9944")]
    node: String,

    /// Number of remote lookups in flight at once.
    #[arg(long, env = "TAOMETER_BATCH_SIZE", default_value_t = 100)]
    batch_size: usize,

    /// Evaluate the combined-stake filter against delegation-inherited
    /// stake as well as raw stake.
    #[arg(long, env = "TAOMETER_INHERITED")]
    inherited: bool,

    /// Disable all eligibility filtering.
    #[arg(long, env = "TAOMETER_NO_FILTERS")]
    no_filters: bool,

    /// Input strategy for the effective-take blend.
    #[arg(long, value_enum, default_value_t = TakeStrategy::Dividends)]
    take_strategy: TakeStrategy,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TakeStrategy {
    /// Blend per-subnet dividend flows.
    Dividends,
    /// Blend validating-emission flows.
    Emission,
}

impl From<TakeStrategy> for FlowStrategy {
    fn from(strategy: TakeStrategy) -> Self {
        match strategy {
            TakeStrategy::Dividends => FlowStrategy::Dividends,
            TakeStrategy::Emission => FlowStrategy::ValidatingEmission,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let intervals: Vec<Interval> = if cli.interval == "all" {
        Interval::all().to_vec()
    } else {
        vec![cli.interval.parse()?]
    };

    let client = HttpChainClient::new(cli.node.clone());
    let cfg = CalcConfig::default();
    let opts = RunOptions {
        batch_size: cli.batch_size,
        inherited: cli.inherited,
        no_filters: cli.no_filters,
    };

    let block = match cli.block {
        Some(block) => block,
        None => client.chain_head().await?,
    };
    tracing::info!(netuid = cli.netuid, block, hotkey = %cli.hotkey, "starting run");

    let mut rows = Vec::new();
    for interval in intervals {
        let outcome = if cli.netuid == 0 {
            root_apy(&client, &cfg, &cli.hotkey, interval, block, &opts).await?
        } else {
            subnet_apy(&client, &cfg, cli.netuid, &cli.hotkey, interval, block, &opts).await?
        };
        rows.push(ApyRow::new(interval, &outcome));
    }

    println!("{}", output::render_table(&rows));

    let take_netuids: Vec<u16> = if cli.netuid == 0 {
        let subnets = client.all_subnets(block).await?;
        subnets.iter().map(|s| s.netuid).filter(|&n| n != 0).collect()
    } else {
        vec![cli.netuid]
    };
    let take = effective_take(
        &client,
        &cfg,
        &cli.hotkey,
        &take_netuids,
        block,
        cli.take_strategy.into(),
    )
    .await?;
    println!("{}", output::render_effective_take(take));

    Ok(())
}
