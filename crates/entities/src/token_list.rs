use std::collections::HashMap;

use alloy_primitives::{address, Address};
use lazy_static::lazy_static;

use crate::token::TokenMeta;

const LOGO_BASE: &str = "https://raw.githubusercontent.com/pangolindex/tokenlists/main/logos/43114";

fn with_logo(symbol: &str, name: &str, decimals: u8, address: &Address) -> TokenMeta {
    TokenMeta {
        symbol: symbol.to_string(),
        name: name.to_string(),
        decimals,
        logo_uri: Some(format!("{LOGO_BASE}/{address:?}/logo_24.png")),
    }
}

lazy_static! {
    static ref KNOWN_TOKENS: HashMap<Address, TokenMeta> = {
        let entries: Vec<(Address, &str, &str, u8)> = vec![
            (address!("b31f66aa3c1e785363f0875a1b74e27b85fd66c7"), "WAVAX", "Wrapped AVAX", 18),
            (address!("60781c2586d68229fde47564546784ab3faca982"), "PNG", "Pangolin", 18),
            (address!("b97ef9ef8734c71904d8002f8b6bc66dd9c48a6e"), "USDC", "USD Coin", 6),
            (address!("9702230a8ea53601f5cd2dc00fdbc13d4df4a8c7"), "USDT", "TetherToken", 6),
            (address!("c7198437980c041c805a1edcba50c1ce5db95118"), "USDT.e", "Tether USD (Bridged)", 6),
            (address!("a7d7079b0fead91f3e65f86e8915cb59c1a4c664"), "USDC.e", "USD Coin (Bridged)", 6),
            (address!("49d5c2bdffac6ce2bfdb6640f4f80f226bc10bab"), "WETH.e", "Wrapped Ether (Bridged)", 18),
            (address!("50b7545627a5162f82a992c33b87adc75187b218"), "WBTC.e", "Wrapped BTC (Bridged)", 8),
            (address!("d586e7f844cea2f87f50152665bcbc2c279d8d70"), "DAI.e", "Dai Stablecoin (Bridged)", 18),
            (address!("6e84a6216ea6dacc71ee8e6b0a5b7322eebc0fdd"), "JOE", "JoeToken", 18),
            (address!("2b2c81e08f1af8835a78bb2a90ae924ace0ea4be"), "sAVAX", "Staked AVAX", 18),
        ];

        let mut map: HashMap<Address, TokenMeta> =
            entries.into_iter().map(|(address, symbol, name, decimals)| (address, with_logo(symbol, name, decimals, &address))).collect();

        // no curated logo for BTC.b
        map.insert(address!("152b9d0fdc40c096de20232db4820c92ee4756c9"), TokenMeta::new("BTC.b", "Bitcoin", 8));
        map
    };
}

/// Curated metadata lookup. Keys are 20-byte addresses, so the lookup is
/// case-insensitive with respect to the source hex string.
pub fn get_token_meta(address: &Address) -> Option<TokenMeta> {
    KNOWN_TOKENS.get(address).cloned()
}
