use std::marker::PhantomData;

use alloy_network::Network;
use alloy_primitives::{Address, Bytes};
use alloy_provider::Provider;
use alloy_transport::Transport;
use async_trait::async_trait;
use eyre::{eyre, Result};
use tracing::debug;

use salvage_abi::IMulticall3;

use crate::batch_reader::{BatchCall, BatchReader};

/// Live `BatchReader` over a Multicall3 aggregator. Every member is submitted
/// with `allowFailure = true`, so a reverting member surfaces as a failed
/// entry instead of reverting the aggregate call.
#[derive(Clone)]
pub struct MulticallBatchReader<P, T, N> {
    client: P,
    multicall: Address,
    _t: PhantomData<T>,
    _n: PhantomData<N>,
}

impl<P, T, N> MulticallBatchReader<P, T, N>
where
    T: Transport + Clone,
    N: Network,
    P: Provider<T, N> + Send + Sync + Clone + 'static,
{
    pub fn new(client: P, multicall: Address) -> Self {
        Self { client, multicall, _t: PhantomData, _n: PhantomData }
    }
}

#[async_trait]
impl<P, T, N> BatchReader for MulticallBatchReader<P, T, N>
where
    T: Transport + Clone,
    N: Network,
    P: Provider<T, N> + Send + Sync + Clone + 'static,
{
    async fn read_batch(&self, calls: Vec<BatchCall>) -> Result<Vec<Result<Bytes>>> {
        if calls.is_empty() {
            return Ok(vec![]);
        }

        let aggregate: Vec<IMulticall3::Call3> = calls
            .into_iter()
            .map(|call| IMulticall3::Call3 { target: call.target, allowFailure: true, callData: call.call_data })
            .collect();

        debug!(members = aggregate.len(), "dispatching read round");

        let multicall = IMulticall3::new(self.multicall, self.client.clone());
        let returned = multicall.aggregate3(aggregate).call().await?.returnData;

        Ok(returned
            .into_iter()
            .enumerate()
            .map(|(index, entry)| if entry.success { Ok(entry.returnData) } else { Err(eyre!("batch member {} reverted", index)) })
            .collect())
    }
}
