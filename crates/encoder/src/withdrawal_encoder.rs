use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolInterface;
use chrono::Utc;
use eyre::{eyre, Result};

use salvage_abi::IPositionManager;
use salvage_abi::IPositionManager::{CollectParams, DecreaseLiquidityParams, IPositionManagerCalls};

use crate::plan::WithdrawalPlan;

/// Deadline slack applied to decrease-liquidity operations.
const DEADLINE_SECS: i64 = 1800;

/// Builds ordered sub-operation lists for withdrawal flows against the
/// position manager. Pure transform, performs no remote calls and never
/// submits anything.
///
/// Op order for a removal is fixed: decrease, collect, then when unwrapping
/// is requested an unwrap of the wrapped native asset followed by a sweep of
/// the pair's other token. Collecting to the manager's own address is what
/// makes the unwrap possible, and the sweep releases the counterpart token
/// that parks there alongside it.
#[derive(Clone)]
pub struct WithdrawalEncoder {
    position_manager: Address,
    wrapped_native: Address,
}

impl WithdrawalEncoder {
    pub fn new(position_manager: Address, wrapped_native: Address) -> Self {
        Self { position_manager, wrapped_native }
    }

    pub fn is_wrapped_native(&self, address: Address) -> bool {
        address == self.wrapped_native
    }

    /// Remove a fraction of the position's liquidity and collect everything
    /// owed. The fraction floors: callers must reject zero-effect removals
    /// before building a plan.
    #[allow(clippy::too_many_arguments)]
    pub fn encode_removal(
        &self,
        token_id: U256,
        total_liquidity: u128,
        fraction_percent: u8,
        recipient: Address,
        unwrap_native: bool,
        token0: Address,
        token1: Address,
    ) -> Result<WithdrawalPlan> {
        let deadline = U256::from(Utc::now().timestamp() + DEADLINE_SECS);
        self.encode_removal_with_deadline(token_id, total_liquidity, fraction_percent, recipient, unwrap_native, token0, token1, deadline)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn encode_removal_with_deadline(
        &self,
        token_id: U256,
        total_liquidity: u128,
        fraction_percent: u8,
        recipient: Address,
        unwrap_native: bool,
        token0: Address,
        token1: Address,
        deadline: U256,
    ) -> Result<WithdrawalPlan> {
        if fraction_percent == 0 || fraction_percent > 100 {
            return Err(eyre!("FRACTION_OUT_OF_RANGE: {}", fraction_percent));
        }

        let liquidity_to_remove =
            (U256::from(total_liquidity) * U256::from(fraction_percent) / U256::from(100)).to::<u128>();

        let decrease = IPositionManagerCalls::decreaseLiquidity(IPositionManager::decreaseLiquidityCall {
            params: DecreaseLiquidityParams {
                tokenId: token_id,
                liquidity: liquidity_to_remove,
                amount0Min: U256::ZERO,
                amount1Min: U256::ZERO,
                deadline,
            },
        })
        .abi_encode()
        .into();

        let mut calls = vec![decrease];
        calls.extend(self.collect_tail(token_id, recipient, unwrap_native, token0, token1));

        Ok(WithdrawalPlan { token_id, recipient, fraction_percent: Some(fraction_percent), unwrap_native, calls })
    }

    /// Collect owed fees without touching liquidity.
    pub fn encode_collect_only(
        &self,
        token_id: U256,
        recipient: Address,
        unwrap_native: bool,
        token0: Address,
        token1: Address,
    ) -> Result<WithdrawalPlan> {
        let calls = self.collect_tail(token_id, recipient, unwrap_native, token0, token1);
        Ok(WithdrawalPlan { token_id, recipient, fraction_percent: None, unwrap_native, calls })
    }

    /// Standalone reward claim. Deliberately never bundled into a removal or
    /// collect batch: decreasing liquidity can forfeit an unclaimed reward,
    /// so callers claim before they remove.
    pub fn encode_claim_reward(&self, token_id: U256, to: Address) -> Bytes {
        IPositionManagerCalls::claimReward(IPositionManager::claimRewardCall { tokenId: token_id, to }).abi_encode().into()
    }

    fn collect_tail(&self, token_id: U256, recipient: Address, unwrap_native: bool, token0: Address, token1: Address) -> Vec<Bytes> {
        // collecting to the manager itself is required for the unwrap step;
        // it can only release balances it is holding
        let collect_recipient = if unwrap_native { self.position_manager } else { recipient };

        let collect = IPositionManagerCalls::collect(IPositionManager::collectCall {
            params: CollectParams { tokenId: token_id, recipient: collect_recipient, amount0Max: u128::MAX, amount1Max: u128::MAX },
        })
        .abi_encode()
        .into();

        let mut calls = vec![collect];

        if unwrap_native {
            calls.push(
                IPositionManagerCalls::unwrapWETH9(IPositionManager::unwrapWETH9Call { amountMinimum: U256::ZERO, recipient })
                    .abi_encode()
                    .into(),
            );

            let other_token = if self.is_wrapped_native(token0) { token1 } else { token0 };
            calls.push(
                IPositionManagerCalls::sweepToken(IPositionManager::sweepTokenCall {
                    token: other_token,
                    amountMinimum: U256::ZERO,
                    recipient,
                })
                .abi_encode()
                .into(),
            );
        }

        calls
    }
}
