use std::marker::PhantomData;

use alloy_network::{Network, ReceiptResponse};
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::Provider;
use alloy_transport::Transport;
use eyre::{eyre, Result};
use tracing::info;

use salvage_abi::IPositionManager;

use crate::plan::WithdrawalPlan;

/// Bound on user-facing error text; reports pass through verbatim otherwise.
pub const ERROR_DISPLAY_LIMIT: usize = 200;

/// Submits withdrawal plans and reward claims as single transactions and
/// waits for finalization. No retries: a failed submission or a reverted
/// receipt surfaces to the caller and the flow is re-invoked from scratch.
#[derive(Clone)]
pub struct WithdrawalSubmitter<P, T, N> {
    client: P,
    position_manager: Address,
    _t: PhantomData<T>,
    _n: PhantomData<N>,
}

impl<P, T, N> WithdrawalSubmitter<P, T, N>
where
    T: Transport + Clone,
    N: Network,
    P: Provider<T, N> + Send + Sync + Clone + 'static,
{
    pub fn new(client: P, position_manager: Address) -> Self {
        Self { client, position_manager, _t: PhantomData, _n: PhantomData }
    }

    /// Submit a plan's ordered sub-operations as one all-or-nothing call.
    pub async fn submit_plan(&self, plan: &WithdrawalPlan) -> Result<TxHash> {
        let manager = IPositionManager::new(self.position_manager, self.client.clone());

        let call = manager.multicall(plan.calls.clone());
        let pending = call.send().await?;
        let tx_hash = *pending.tx_hash();
        info!(%tx_hash, token_id = %plan.token_id, ops = plan.calls.len(), "withdrawal batch submitted");

        let receipt = pending.get_receipt().await?;
        if !receipt.status() {
            return Err(eyre!("withdrawal batch reverted: {:?}", tx_hash));
        }
        Ok(tx_hash)
    }

    /// Submit a standalone reward claim.
    pub async fn submit_claim(&self, token_id: U256, to: Address) -> Result<TxHash> {
        let manager = IPositionManager::new(self.position_manager, self.client.clone());

        let call = manager.claimReward(token_id, to);
        let pending = call.send().await?;
        let tx_hash = *pending.tx_hash();
        info!(%tx_hash, %token_id, "reward claim submitted");

        let receipt = pending.get_receipt().await?;
        if !receipt.status() {
            return Err(eyre!("reward claim reverted: {:?}", tx_hash));
        }
        Ok(tx_hash)
    }
}

/// Bound an error message for display without losing the leading context.
pub fn truncate_error(message: &str, limit: usize) -> String {
    if message.chars().count() <= limit {
        return message.to_string();
    }
    let truncated: String = message.chars().take(limit).collect();
    format!("{truncated}…")
}
