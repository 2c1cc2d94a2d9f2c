use alloy_primitives::{Address, Bytes, U256};

/// Ordered list of encoded sub-operations for one atomic batched call.
/// Built on demand, submitted once, never persisted.
///
/// `fraction_percent` applies to the liquidity-removal step only and is
/// absent for collect-only plans; fee collection always takes everything
/// owed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawalPlan {
    pub token_id: U256,
    pub recipient: Address,
    pub fraction_percent: Option<u8>,
    pub unwrap_native: bool,
    pub calls: Vec<Bytes>,
}
