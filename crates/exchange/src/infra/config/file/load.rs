use {
    crate::{
        domain::{fees::FeeConfig, validator::Checks},
        infra::{self, config::file},
    },
    anyhow::{Context, Result, ensure},
    model::{DomainSeparator, asset::AssetClass},
    number::BASIS_POINTS,
    std::path::Path,
};

/// Load the exchange configuration from a TOML file.
pub fn load(path: &Path) -> Result<infra::Config> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    parse(&data).with_context(|| format!("invalid configuration in {path:?}"))
}

/// Parse the exchange configuration from TOML.
pub fn parse(data: &str) -> Result<infra::Config> {
    let config: file::Config = toml::de::from_str(data).context("TOML syntax error")?;

    for (name, bps) in [
        ("protocol-fee-primary-bps", config.fees.protocol_fee_primary_bps),
        (
            "protocol-fee-secondary-bps",
            config.fees.protocol_fee_secondary_bps,
        ),
        ("royalties-ceiling-bps", config.royalties_ceiling_bps),
    ] {
        ensure!(
            u64::from(bps) <= BASIS_POINTS,
            "{name} of {bps} exceeds {BASIS_POINTS}"
        );
    }

    let matchers = config
        .matchers
        .into_iter()
        .map(|matcher| {
            ensure!(
                !matcher.class.is_builtin() || matcher.class == AssetClass::COLLECTION,
                "{} is a built-in asset class and cannot have a custom matcher",
                matcher.class
            );
            Ok(infra::config::CustomMatcher {
                class: matcher.class,
                kind: match matcher.kind {
                    file::MatcherKind::Collection => infra::config::MatcherKind::Collection,
                    file::MatcherKind::Exact => infra::config::MatcherKind::Exact,
                },
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(infra::Config {
        domain: DomainSeparator::new(config.chain_id, config.verifying_contract),
        fees: FeeConfig {
            protocol_fee_primary_bps: config.fees.protocol_fee_primary_bps,
            protocol_fee_secondary_bps: config.fees.protocol_fee_secondary_bps,
            fee_receiver: config.fees.fee_receiver,
        },
        royalties_ceiling_bps: config.royalties_ceiling_bps,
        checks: Checks {
            native_signatures: config.validation.native_signatures,
            contract_signatures: config.validation.contract_signatures,
            sender_bypass: config.validation.sender_bypass,
        },
        matchers,
    })
}
