use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use eyre::Result;

/// One member of a batched read round: raw calldata against a target contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchCall {
    pub target: Address,
    pub call_data: Bytes,
}

impl BatchCall {
    pub fn new(target: Address, call_data: Bytes) -> BatchCall {
        BatchCall { target, call_data }
    }
}

/// Batched read seam. A round is dispatched as a set and settles as a set:
/// the outer `Result` is a transport-level failure of the whole round, inner
/// entries carry per-member success or failure and never abort the batch.
#[async_trait]
pub trait BatchReader: Send + Sync {
    async fn read_batch(&self, calls: Vec<BatchCall>) -> Result<Vec<Result<Bytes>>>;
}
