use alloy_primitives::{Address, U256};

use crate::token::TokenMeta;

/// On-chain record of a single concentrated-liquidity position.
///
/// `token0`/`token1` ordering follows the registry convention, it carries no
/// semantic meaning. `fee` is denominated in hundredths of a basis point.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Position {
    pub token_id: U256,
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub tokens_owed0: u128,
    pub tokens_owed1: u128,
    pub reward_owed: U256,
}

impl Position {
    pub fn has_reward(&self) -> bool {
        !self.reward_owed.is_zero()
    }

    pub fn fee_as_percent(&self) -> f64 {
        self.fee as f64 / 10_000.0
    }
}

/// A position enriched with display metadata for both sides of its pair.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedPosition {
    pub position: Position,
    pub token0_meta: TokenMeta,
    pub token1_meta: TokenMeta,
}

impl ResolvedPosition {
    pub fn pair_label(&self) -> String {
        format!("{}/{}", self.token0_meta.symbol, self.token1_meta.symbol)
    }
}
