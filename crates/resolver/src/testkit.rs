use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy_primitives::aliases::{I24, U24, U96};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol_data, SolCall, SolType, SolValue};
use async_trait::async_trait;
use eyre::{eyre, Result};
use tokio::sync::Semaphore;

use salvage_abi::IERC20;

use crate::batch_reader::{BatchCall, BatchReader};

pub const TOKEN_A: Address = Address::repeat_byte(0xaa);
pub const TOKEN_B: Address = Address::repeat_byte(0xbb);

pub fn manager() -> Address {
    Address::repeat_byte(0x99)
}

/// Scripted batch source keyed by the selector of a round's first call.
/// `None` entries settle as per-member failures. Every dispatched round is
/// recorded as (selector, member count) for call-shape assertions.
pub struct ScriptedReader {
    responses: Mutex<HashMap<[u8; 4], Vec<Option<Bytes>>>>,
    log: Mutex<Vec<([u8; 4], usize)>>,
}

impl ScriptedReader {
    pub fn new() -> ScriptedReader {
        ScriptedReader { responses: Mutex::new(HashMap::new()), log: Mutex::new(Vec::new()) }
    }

    pub fn respond(self, selector: [u8; 4], entries: Vec<Option<Bytes>>) -> Self {
        self.responses.lock().unwrap().insert(selector, entries);
        self
    }

    /// Script a metadata round where every live read fails, for `tokens`
    /// distinct unknown assets.
    pub fn respond_metadata_unavailable(self, tokens: usize) -> Self {
        self.respond(IERC20::symbolCall::SELECTOR, vec![None; tokens * 3])
    }

    pub fn rounds(&self) -> Vec<([u8; 4], usize)> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchReader for ScriptedReader {
    async fn read_batch(&self, calls: Vec<BatchCall>) -> Result<Vec<Result<Bytes>>> {
        assert!(!calls.is_empty(), "empty rounds must not be dispatched");
        let selector: [u8; 4] = calls[0].call_data[..4].try_into().unwrap();
        self.log.lock().unwrap().push((selector, calls.len()));

        let entries = self
            .responses
            .lock()
            .unwrap()
            .get(&selector)
            .cloned()
            .unwrap_or_else(|| panic!("unscripted round with selector {selector:02x?}"));
        assert_eq!(entries.len(), calls.len(), "scripted round size mismatch for {selector:02x?}");

        Ok(entries.into_iter().map(|entry| entry.ok_or_else(|| eyre!("scripted member failure"))).collect())
    }
}

/// Wraps a reader so each round consumes one semaphore permit before it
/// settles, letting tests hold a resolution in flight.
pub struct GatedReader<R> {
    inner: R,
    gate: Arc<Semaphore>,
}

impl<R> GatedReader<R> {
    pub fn new(inner: R, gate: Arc<Semaphore>) -> Self {
        Self { inner, gate }
    }
}

#[async_trait]
impl<R: BatchReader> BatchReader for GatedReader<R> {
    async fn read_batch(&self, calls: Vec<BatchCall>) -> Result<Vec<Result<Bytes>>> {
        self.gate.acquire().await.expect("gate closed").forget();
        self.inner.read_batch(calls).await
    }
}

pub fn encode_u256(value: u64) -> Bytes {
    U256::from(value).abi_encode().into()
}

pub fn encode_u8(value: u8) -> Bytes {
    sol_data::Uint::<8>::abi_encode(&value).into()
}

pub fn encode_string(value: &str) -> Bytes {
    value.to_string().abi_encode().into()
}

pub fn encode_position(token0: Address, token1: Address, liquidity: u128, owed0: u128, owed1: u128) -> Bytes {
    (
        U96::ZERO,
        Address::ZERO,
        token0,
        token1,
        U24::from(3000u32),
        I24::try_from(-887_220).unwrap(),
        I24::try_from(887_220).unwrap(),
        liquidity,
        U256::ZERO,
        U256::ZERO,
        owed0,
        owed1,
    )
        .abi_encode()
        .into()
}

pub fn encode_reward(owed: u64) -> Bytes {
    (U256::ZERO, 0u32, 0u32, U256::from(owed)).abi_encode().into()
}
