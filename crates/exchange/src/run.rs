use {
    crate::infra::{
        self,
        Scenario,
        cli::{self, Command},
        config,
    },
    alloy_primitives::B256,
    anyhow::{Context, Result},
    clap::Parser,
    model::order::{Order, OrderKey},
    serde::Serialize,
    std::path::Path,
};

pub fn main() -> Result<()> {
    run(std::env::args())
}

/// Runs the command given by `args`, the first argument being the binary
/// name.
pub fn run(args: impl Iterator<Item = String>) -> Result<()> {
    let args = cli::Args::parse_from(args);
    observe::tracing::initialize(&observe::Config::new(
        &args.log_filter,
        args.stderr_threshold,
        observe::Format::json(args.use_json_logs),
    ));
    tracing::info!("running exchange with {args:#?}");

    let config = match &args.config {
        Some(path) => config::file::load(path)?,
        None => infra::Config::default(),
    };
    let output = match &args.command {
        Command::Settle { scenario } => settle(&config, scenario)?,
        Command::Hash { order } => hash(&config, order)?,
    };
    println!("{output}");
    Ok(())
}

fn settle(config: &infra::Config, path: &Path) -> Result<String> {
    let scenario = Scenario::load(path)?;
    let (_, result) = scenario.settle(config);
    let receipt = result.context("settlement failed")?;
    Ok(serde_json::to_string_pretty(&receipt)?)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Hashes {
    key: OrderKey,
    struct_hash: B256,
    signing_hash: B256,
}

fn hash(config: &infra::Config, path: &Path) -> Result<String> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    let order: Order =
        serde_json::from_str(&data).with_context(|| format!("invalid order in {path:?}"))?;
    Ok(serde_json::to_string_pretty(&Hashes {
        key: order.key(),
        struct_hash: order.hash_struct(),
        signing_hash: order.signing_hash(&config.domain),
    })?)
}
