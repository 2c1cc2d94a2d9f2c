/// Display metadata for an ERC-20 asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenMeta {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub logo_uri: Option<String>,
}

impl TokenMeta {
    pub fn new<S: Into<String>>(symbol: S, name: S, decimals: u8) -> TokenMeta {
        TokenMeta { symbol: symbol.into(), name: name.into(), decimals, logo_uri: None }
    }

    /// Fallback metadata for assets missing from both the curated table and
    /// the live lookup. Owed balances are still reported under it.
    pub fn unknown() -> TokenMeta {
        TokenMeta { symbol: "???".to_string(), name: "Unknown".to_string(), decimals: 18, logo_uri: None }
    }
}

impl Default for TokenMeta {
    fn default() -> Self {
        TokenMeta::unknown()
    }
}
