use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use eyre::{eyre, OptionExt, Result};
use tracing::debug;

use salvage_abi::{IPositionManager, IERC20};
use salvage_entities::{get_token_meta, Position, ResolvedPosition, TokenMeta};

use crate::batch_reader::{BatchCall, BatchReader};

/// Pipeline stage of the last `resolve` call. Rounds are strictly dependent:
/// a stage must fully settle before the next one is issued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResolveStage {
    #[default]
    Idle,
    CountPending,
    EnumeratePending,
    DetailPending,
    MetadataPending,
    Ready,
}

/// Terminal or intermediate snapshot of a resolution pass.
///
/// `position_count` is the registry's own count at the time of the count
/// round; `positions` may be shorter when individual reads were dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedPositions {
    pub owner: Option<Address>,
    pub positions: Vec<ResolvedPosition>,
    pub position_count: usize,
    pub is_loading: bool,
}

impl ResolvedPositions {
    pub fn idle() -> ResolvedPositions {
        ResolvedPositions::default()
    }

    pub fn loading(owner: Option<Address>) -> ResolvedPositions {
        ResolvedPositions { owner, is_loading: true, ..Default::default() }
    }

    pub fn ready(owner: Address, position_count: usize, positions: Vec<ResolvedPosition>) -> ResolvedPositions {
        ResolvedPositions { owner: Some(owner), positions, position_count, is_loading: false }
    }
}

/// Resolves every position an owner holds in the registry through four
/// dependent batched read rounds: count, enumerate, detail + reward,
/// token metadata.
pub struct PositionResolver<R> {
    reader: R,
    position_manager: Address,
    stage: ResolveStage,
}

impl<R: BatchReader> PositionResolver<R> {
    pub fn new(reader: R, position_manager: Address) -> Self {
        Self { reader, position_manager, stage: ResolveStage::Idle }
    }

    pub fn stage(&self) -> ResolveStage {
        self.stage
    }

    /// Run one full resolution pass. `None` means no owner is connected and
    /// yields an empty, non-loading snapshot without issuing any reads.
    pub async fn resolve(&mut self, owner: Option<Address>) -> Result<ResolvedPositions> {
        let Some(owner) = owner else {
            self.stage = ResolveStage::Idle;
            return Ok(ResolvedPositions::idle());
        };

        self.stage = ResolveStage::CountPending;
        let count = self.read_count(owner).await?;
        debug!(%owner, count, "position count resolved");
        if count == 0 {
            self.stage = ResolveStage::Ready;
            return Ok(ResolvedPositions::ready(owner, 0, vec![]));
        }

        self.stage = ResolveStage::EnumeratePending;
        let ids = self.enumerate(owner, count).await?;

        self.stage = ResolveStage::DetailPending;
        let positions = self.fetch_details(&ids).await?;

        self.stage = ResolveStage::MetadataPending;
        let resolved = self.attach_metadata(positions).await?;

        self.stage = ResolveStage::Ready;
        Ok(ResolvedPositions::ready(owner, count, resolved))
    }

    async fn read_count(&self, owner: Address) -> Result<usize> {
        let call = BatchCall::new(self.position_manager, IPositionManager::balanceOfCall { owner }.abi_encode().into());
        let entries = self.reader.read_batch(vec![call]).await?;
        let bytes = entries.into_iter().next().ok_or_eyre("empty count round")??;
        let count = IPositionManager::balanceOfCall::abi_decode_returns(&bytes, true)?._0;
        count.try_into().map_err(|_| eyre!("position count overflow"))
    }

    async fn enumerate(&self, owner: Address, count: usize) -> Result<Vec<U256>> {
        let calls = (0..count)
            .map(|index| {
                BatchCall::new(
                    self.position_manager,
                    IPositionManager::tokenOfOwnerByIndexCall { owner, index: U256::from(index) }.abi_encode().into(),
                )
            })
            .collect();
        let entries = self.reader.read_batch(calls).await?;
        Ok(merge_enumerated(entries))
    }

    async fn fetch_details(&self, ids: &[U256]) -> Result<Vec<Position>> {
        let detail_calls: Vec<BatchCall> = ids
            .iter()
            .map(|&token_id| BatchCall::new(self.position_manager, IPositionManager::positionsCall { tokenId: token_id }.abi_encode().into()))
            .collect();
        let reward_calls: Vec<BatchCall> = ids
            .iter()
            .map(|&token_id| {
                BatchCall::new(self.position_manager, IPositionManager::positionRewardCall { tokenId: token_id }.abi_encode().into())
            })
            .collect();

        let (details, rewards) = tokio::join!(self.reader.read_batch(detail_calls), self.reader.read_batch(reward_calls));

        Ok(merge_details(ids, details?, rewards?))
    }

    async fn attach_metadata(&self, positions: Vec<Position>) -> Result<Vec<ResolvedPosition>> {
        let mut unique: Vec<Address> = Vec::new();
        let mut seen: HashSet<Address> = HashSet::new();
        for position in &positions {
            for address in [position.token0, position.token1] {
                if seen.insert(address) {
                    unique.push(address);
                }
            }
        }

        // curated entries are authoritative and save a round-trip
        let mut meta: HashMap<Address, TokenMeta> = HashMap::new();
        let mut live: Vec<Address> = Vec::new();
        for address in unique {
            match get_token_meta(&address) {
                Some(curated) => {
                    meta.insert(address, curated);
                }
                None => live.push(address),
            }
        }

        if !live.is_empty() {
            let mut calls: Vec<BatchCall> = Vec::with_capacity(live.len() * 3);
            for &address in &live {
                calls.push(BatchCall::new(address, IERC20::symbolCall {}.abi_encode().into()));
                calls.push(BatchCall::new(address, IERC20::decimalsCall {}.abi_encode().into()));
                calls.push(BatchCall::new(address, IERC20::nameCall {}.abi_encode().into()));
            }
            let entries = self.reader.read_batch(calls).await?;
            meta.extend(merge_metadata(&live, entries));
        }

        Ok(positions
            .into_iter()
            .map(|position| {
                let token0_meta = meta.get(&position.token0).cloned().unwrap_or_else(TokenMeta::unknown);
                let token1_meta = meta.get(&position.token1).cloned().unwrap_or_else(TokenMeta::unknown);
                ResolvedPosition { position, token0_meta, token1_meta }
            })
            .collect())
    }
}

/// Enumeration merge: a failed index read is dropped, not retried. The
/// registry can reorder indices between the count round and this one.
pub(crate) fn merge_enumerated(entries: Vec<Result<Bytes>>) -> Vec<U256> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            match entry.ok().and_then(|bytes| IPositionManager::tokenOfOwnerByIndexCall::abi_decode_returns(&bytes, true).ok()) {
                Some(ret) => Some(ret._0),
                None => {
                    debug!(index, "enumeration entry unavailable, dropping");
                    None
                }
            }
        })
        .collect()
}

/// Detail merge: a failed detail read drops the id entirely, a failed reward
/// read only degrades that position's reward to zero.
pub(crate) fn merge_details(ids: &[U256], details: Vec<Result<Bytes>>, rewards: Vec<Result<Bytes>>) -> Vec<Position> {
    let mut positions = Vec::with_capacity(ids.len());

    for (index, (token_id, detail)) in ids.iter().zip(details).enumerate() {
        let record = match detail.ok().and_then(|bytes| IPositionManager::positionsCall::abi_decode_returns(&bytes, true).ok()) {
            Some(record) => record,
            None => {
                debug!(token_id = %token_id, "position detail unavailable, dropping");
                continue;
            }
        };

        let reward_owed = rewards
            .get(index)
            .and_then(|entry| entry.as_ref().ok())
            .and_then(|bytes| IPositionManager::positionRewardCall::abi_decode_returns(bytes, true).ok())
            .map(|ret| ret.rewardOwed)
            .unwrap_or_default();

        positions.push(Position {
            token_id: *token_id,
            token0: record.token0,
            token1: record.token1,
            fee: record.fee.to::<u32>(),
            tick_lower: record.tickLower.try_into().unwrap_or_default(),
            tick_upper: record.tickUpper.try_into().unwrap_or_default(),
            liquidity: record.liquidity,
            tokens_owed0: record.tokensOwed0,
            tokens_owed1: record.tokensOwed1,
            reward_owed,
        });
    }

    positions
}

/// Metadata merge: each field falls back independently, a fully unreadable
/// asset still gets the `???`/`Unknown`/18 placeholder.
pub(crate) fn merge_metadata(addresses: &[Address], entries: Vec<Result<Bytes>>) -> HashMap<Address, TokenMeta> {
    let mut meta = HashMap::with_capacity(addresses.len());

    for (index, address) in addresses.iter().enumerate() {
        let entry = |offset: usize| entries.get(index * 3 + offset).and_then(|entry| entry.as_ref().ok());

        let fallback = TokenMeta::unknown();
        let symbol = entry(0)
            .and_then(|bytes| IERC20::symbolCall::abi_decode_returns(bytes, true).ok())
            .map(|ret| ret._0)
            .unwrap_or(fallback.symbol);
        let decimals = entry(1)
            .and_then(|bytes| IERC20::decimalsCall::abi_decode_returns(bytes, true).ok())
            .map(|ret| ret._0)
            .unwrap_or(fallback.decimals);
        let name = entry(2)
            .and_then(|bytes| IERC20::nameCall::abi_decode_returns(bytes, true).ok())
            .map(|ret| ret._0)
            .unwrap_or(fallback.name);

        meta.insert(*address, TokenMeta { symbol, name, decimals, logo_uri: None });
    }

    meta
}

#[cfg(test)]
mod test {
    use alloy_sol_types::SolCall;

    use salvage_entities::TokenAddressAvalanche;

    use super::*;
    use crate::testkit::{
        encode_position, encode_reward, encode_string, encode_u256, encode_u8, manager, ScriptedReader, TOKEN_A, TOKEN_B,
    };

    #[tokio::test]
    async fn test_no_owner_is_idle_and_issues_no_reads() {
        let reader = ScriptedReader::new();
        let mut resolver = PositionResolver::new(reader, manager());

        let result = resolver.resolve(None).await.unwrap();

        assert_eq!(result, ResolvedPositions::idle());
        assert!(!result.is_loading);
        assert_eq!(resolver.stage(), ResolveStage::Idle);
        assert!(resolver.reader.rounds().is_empty());
    }

    #[tokio::test]
    async fn test_zero_count_stops_after_count_round() {
        let reader = ScriptedReader::new().respond(IPositionManager::balanceOfCall::SELECTOR, vec![Some(encode_u256(0))]);
        let mut resolver = PositionResolver::new(reader, manager());

        let result = resolver.resolve(Some(Address::repeat_byte(0x11))).await.unwrap();

        assert!(result.positions.is_empty());
        assert_eq!(result.position_count, 0);
        assert!(!result.is_loading);
        assert_eq!(resolver.stage(), ResolveStage::Ready);
        assert_eq!(resolver.reader.rounds(), vec![(IPositionManager::balanceOfCall::SELECTOR, 1)]);
    }

    #[tokio::test]
    async fn test_full_pass_with_curated_and_live_metadata() {
        let owner = Address::repeat_byte(0x11);
        let reader = ScriptedReader::new()
            .respond(IPositionManager::balanceOfCall::SELECTOR, vec![Some(encode_u256(2))])
            .respond(IPositionManager::tokenOfOwnerByIndexCall::SELECTOR, vec![Some(encode_u256(101)), Some(encode_u256(102))])
            .respond(
                IPositionManager::positionsCall::SELECTOR,
                vec![
                    Some(encode_position(TokenAddressAvalanche::WAVAX, TOKEN_A, 700, 10, 20)),
                    Some(encode_position(TokenAddressAvalanche::WAVAX, TOKEN_A, 900, 0, 0)),
                ],
            )
            .respond(IPositionManager::positionRewardCall::SELECTOR, vec![Some(encode_reward(5)), Some(encode_reward(0))])
            .respond(
                IERC20::symbolCall::SELECTOR,
                vec![Some(encode_string("TKA")), Some(encode_u8(6)), Some(encode_string("Token A"))],
            );
        let mut resolver = PositionResolver::new(reader, manager());

        let result = resolver.resolve(Some(owner)).await.unwrap();

        assert_eq!(result.position_count, 2);
        assert_eq!(result.positions.len(), 2);

        let first = &result.positions[0];
        assert_eq!(first.position.token_id, U256::from(101));
        assert_eq!(first.position.liquidity, 700);
        assert_eq!(first.position.reward_owed, U256::from(5));
        assert!(first.position.has_reward());
        assert_eq!(first.token0_meta.symbol, "WAVAX");
        assert_eq!(first.token1_meta.symbol, "TKA");
        assert_eq!(first.token1_meta.decimals, 6);
        assert_eq!(first.token1_meta.name, "Token A");

        assert!(!result.positions[1].position.has_reward());

        // curated WAVAX never appears in the metadata round
        let metadata_round = resolver.reader.rounds().into_iter().find(|(selector, _)| *selector == IERC20::symbolCall::SELECTOR);
        assert_eq!(metadata_round, Some((IERC20::symbolCall::SELECTOR, 3)));
    }

    #[tokio::test]
    async fn test_enumeration_failures_are_dropped() {
        let owner = Address::repeat_byte(0x11);
        let reader = ScriptedReader::new()
            .respond(IPositionManager::balanceOfCall::SELECTOR, vec![Some(encode_u256(3))])
            .respond(IPositionManager::tokenOfOwnerByIndexCall::SELECTOR, vec![Some(encode_u256(101)), None, Some(encode_u256(103))])
            .respond(
                IPositionManager::positionsCall::SELECTOR,
                vec![Some(encode_position(TOKEN_A, TOKEN_B, 1, 0, 0)), Some(encode_position(TOKEN_A, TOKEN_B, 2, 0, 0))],
            )
            .respond(IPositionManager::positionRewardCall::SELECTOR, vec![Some(encode_reward(0)), Some(encode_reward(0))])
            .respond_metadata_unavailable(2);
        let mut resolver = PositionResolver::new(reader, manager());

        let result = resolver.resolve(Some(owner)).await.unwrap();

        assert_eq!(result.position_count, 3);
        assert_eq!(result.positions.len(), 2);
        assert_eq!(result.positions[0].position.token_id, U256::from(101));
        assert_eq!(result.positions[1].position.token_id, U256::from(103));
    }

    #[tokio::test]
    async fn test_detail_failure_drops_and_reward_failure_degrades() {
        let owner = Address::repeat_byte(0x11);
        let reader = ScriptedReader::new()
            .respond(IPositionManager::balanceOfCall::SELECTOR, vec![Some(encode_u256(2))])
            .respond(IPositionManager::tokenOfOwnerByIndexCall::SELECTOR, vec![Some(encode_u256(101)), Some(encode_u256(102))])
            .respond(IPositionManager::positionsCall::SELECTOR, vec![Some(encode_position(TOKEN_A, TOKEN_B, 10, 1, 2)), None])
            .respond(IPositionManager::positionRewardCall::SELECTOR, vec![None, Some(encode_reward(7))])
            .respond_metadata_unavailable(2);
        let mut resolver = PositionResolver::new(reader, manager());

        let result = resolver.resolve(Some(owner)).await.unwrap();

        // output length follows detail survivors, reward outcomes do not drop
        assert_eq!(result.positions.len(), 1);
        let survivor = &result.positions[0].position;
        assert_eq!(survivor.token_id, U256::from(101));
        assert_eq!(survivor.reward_owed, U256::ZERO);
    }

    #[tokio::test]
    async fn test_metadata_triple_miss_falls_back_to_unknown() {
        let owner = Address::repeat_byte(0x11);
        let reader = ScriptedReader::new()
            .respond(IPositionManager::balanceOfCall::SELECTOR, vec![Some(encode_u256(1))])
            .respond(IPositionManager::tokenOfOwnerByIndexCall::SELECTOR, vec![Some(encode_u256(101))])
            .respond(IPositionManager::positionsCall::SELECTOR, vec![Some(encode_position(TOKEN_A, TOKEN_B, 10, 1, 2))])
            .respond(IPositionManager::positionRewardCall::SELECTOR, vec![Some(encode_reward(0))])
            .respond_metadata_unavailable(2);
        let mut resolver = PositionResolver::new(reader, manager());

        let result = resolver.resolve(Some(owner)).await.unwrap();

        let meta = &result.positions[0].token0_meta;
        assert_eq!(meta.symbol, "???");
        assert_eq!(meta.name, "Unknown");
        assert_eq!(meta.decimals, 18);
    }

    #[test]
    fn test_merge_metadata_partial_fields() {
        let address = Address::repeat_byte(0x42);
        let entries: Vec<Result<Bytes>> = vec![
            Ok(encode_string("TK")),
            Err(eyre!("decimals read reverted")),
            Err(eyre!("name read reverted")),
        ];

        let merged = merge_metadata(&[address], entries);
        let meta = merged.get(&address).unwrap();
        assert_eq!(meta.symbol, "TK");
        assert_eq!(meta.decimals, 18);
        assert_eq!(meta.name, "Unknown");
    }
}
