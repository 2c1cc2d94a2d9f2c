use std::env;

use alloy_network::{EthereumWallet, Network};
use alloy_primitives::{Address, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::Transport;
use clap::Parser;
use eyre::{bail, OptionExt, Result};
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};
use url::Url;

use salvage_encoder::{truncate_error, WithdrawalEncoder, WithdrawalSubmitter, ERROR_DISPLAY_LIMIT};
use salvage_entities::{
    format_token_amount, get_token_meta, PeripheryAddress, ResolvedPosition, TokenAddressAvalanche, TokenMeta,
};
use salvage_resolver::{MulticallBatchReader, PositionResolver, ResolvedPositions};

use crate::cli::{Cli, Command};

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,alloy_rpc_client=off,alloy_transport_http=off,hyper_util=off".into());
    let fmt_layer = fmt::Layer::default().with_file(false).with_line_number(false).with_filter(env_filter);
    tracing_subscriber::registry().with(fmt_layer).init();

    let cli = Cli::parse();

    let rpc_url = match cli.rpc_url {
        Some(url) => url,
        None => env::var("AVALANCHE_HTTP")?,
    };
    let rpc_url = Url::parse(rpc_url.as_str())?;
    let position_manager = cli.position_manager.unwrap_or(PeripheryAddress::POSITION_MANAGER);

    match cli.command {
        Command::List { owner } => {
            let client = ProviderBuilder::new().on_http(rpc_url);
            let block = client.get_block_number().await?;
            info!("Block : {}", block);

            let resolved = resolve_positions(client, position_manager, owner).await?;
            print_positions(&resolved);
        }
        Command::Remove { token_id, percent, unwrap, force } => {
            let (wallet, recipient) = env_signer()?;
            let client = ProviderBuilder::new().wallet(wallet).on_http(rpc_url);
            remove_liquidity(client, position_manager, recipient, token_id, percent, unwrap, force).await?;
        }
        Command::Collect { token_id, unwrap } => {
            let (wallet, recipient) = env_signer()?;
            let client = ProviderBuilder::new().wallet(wallet).on_http(rpc_url);
            collect_fees(client, position_manager, recipient, token_id, unwrap).await?;
        }
        Command::Claim { token_id } => {
            let (wallet, recipient) = env_signer()?;
            let client = ProviderBuilder::new().wallet(wallet).on_http(rpc_url);

            let submitter = WithdrawalSubmitter::new(client, position_manager);
            match submitter.submit_claim(token_id, recipient).await {
                Ok(tx_hash) => info!(%tx_hash, "reward claim confirmed"),
                Err(error) => return Err(report_submission_error(error)),
            }
        }
    }

    Ok(())
}

fn env_signer() -> Result<(EthereumWallet, Address)> {
    let signer: PrivateKeySigner = env::var("PRIVATE_KEY")?.parse()?;
    let address = signer.address();
    Ok((EthereumWallet::from(signer), address))
}

async fn resolve_positions<P, T, N>(client: P, position_manager: Address, owner: Address) -> Result<ResolvedPositions>
where
    T: Transport + Clone,
    N: Network,
    P: Provider<T, N> + Send + Sync + Clone + 'static,
{
    let reader = MulticallBatchReader::new(client, PeripheryAddress::MULTICALL3);
    let mut resolver = PositionResolver::new(reader, position_manager);
    resolver.resolve(Some(owner)).await
}

fn print_positions(resolved: &ResolvedPositions) {
    let reward_meta = get_token_meta(&TokenAddressAvalanche::PNG).unwrap_or_else(TokenMeta::unknown);

    info!("{} position(s) found", resolved.position_count);
    for entry in &resolved.positions {
        let position = &entry.position;
        println!(
            "#{} {} fee {}% ticks [{}, {}] liquidity {}",
            position.token_id,
            entry.pair_label(),
            position.fee_as_percent(),
            position.tick_lower,
            position.tick_upper,
            position.liquidity,
        );
        println!(
            "    owed   : {} {} / {} {}",
            format_token_amount(U256::from(position.tokens_owed0), entry.token0_meta.decimals),
            entry.token0_meta.symbol,
            format_token_amount(U256::from(position.tokens_owed1), entry.token1_meta.decimals),
            entry.token1_meta.symbol,
        );
        println!(
            "    reward : {} {}",
            format_token_amount(position.reward_owed, reward_meta.decimals),
            reward_meta.symbol,
        );
    }
}

async fn remove_liquidity<P, T, N>(
    client: P,
    position_manager: Address,
    recipient: Address,
    token_id: U256,
    percent: u8,
    unwrap: bool,
    force: bool,
) -> Result<()>
where
    T: Transport + Clone,
    N: Network,
    P: Provider<T, N> + Send + Sync + Clone + 'static,
{
    let entry = find_position(client.clone(), position_manager, recipient, token_id).await?;
    let position = &entry.position;

    if position.liquidity == 0 {
        bail!("position {} has no liquidity to remove", token_id);
    }
    let to_remove = (U256::from(position.liquidity) * U256::from(percent) / U256::from(100)).to::<u128>();
    if to_remove == 0 {
        bail!("{}% of liquidity {} floors to zero, nothing to remove", percent, position.liquidity);
    }
    if position.has_reward() {
        if !force {
            bail!("position {} has an unclaimed reward that removal can forfeit; claim it first or pass --force", token_id);
        }
        warn!(token_id = %token_id, "removing with an unclaimed reward, it may be forfeited");
    }
    let unwrap = effective_unwrap(unwrap, position.token0, position.token1);

    let encoder = WithdrawalEncoder::new(position_manager, TokenAddressAvalanche::WAVAX);
    let plan = encoder.encode_removal(token_id, position.liquidity, percent, recipient, unwrap, position.token0, position.token1)?;

    let submitter = WithdrawalSubmitter::new(client, position_manager);
    match submitter.submit_plan(&plan).await {
        Ok(tx_hash) => info!(%tx_hash, "withdrawal confirmed"),
        Err(error) => return Err(report_submission_error(error)),
    }
    Ok(())
}

async fn collect_fees<P, T, N>(client: P, position_manager: Address, recipient: Address, token_id: U256, unwrap: bool) -> Result<()>
where
    T: Transport + Clone,
    N: Network,
    P: Provider<T, N> + Send + Sync + Clone + 'static,
{
    let entry = find_position(client.clone(), position_manager, recipient, token_id).await?;
    let position = &entry.position;
    let unwrap = effective_unwrap(unwrap, position.token0, position.token1);

    let encoder = WithdrawalEncoder::new(position_manager, TokenAddressAvalanche::WAVAX);
    let plan = encoder.encode_collect_only(token_id, recipient, unwrap, position.token0, position.token1)?;

    let submitter = WithdrawalSubmitter::new(client, position_manager);
    match submitter.submit_plan(&plan).await {
        Ok(tx_hash) => info!(%tx_hash, "collect confirmed"),
        Err(error) => return Err(report_submission_error(error)),
    }
    Ok(())
}

async fn find_position<P, T, N>(client: P, position_manager: Address, owner: Address, token_id: U256) -> Result<ResolvedPosition>
where
    T: Transport + Clone,
    N: Network,
    P: Provider<T, N> + Send + Sync + Clone + 'static,
{
    let resolved = resolve_positions(client, position_manager, owner).await?;
    resolved
        .positions
        .into_iter()
        .find(|entry| entry.position.token_id == token_id)
        .ok_or_eyre(format!("position {token_id} not held by {owner}"))
}

/// Unwrapping only applies when the pair actually contains WAVAX. Otherwise
/// the batch would park collected funds on the manager with no unwrap step
/// able to release them, so the flag is dropped for WAVAX-less pairs.
fn effective_unwrap(requested: bool, token0: Address, token1: Address) -> bool {
    let contains_wavax = TokenAddressAvalanche::is_wavax(&token0) || TokenAddressAvalanche::is_wavax(&token1);
    if requested && !contains_wavax {
        warn!("pair has no WAVAX side, ignoring --unwrap");
    }
    requested && contains_wavax
}

fn report_submission_error(error: eyre::Report) -> eyre::Report {
    error!("{}", truncate_error(&format!("{error:#}"), ERROR_DISPLAY_LIMIT));
    error
}
