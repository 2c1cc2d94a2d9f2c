use alloy_primitives::{address, Address};

#[non_exhaustive]
pub struct PeripheryAddress;

impl PeripheryAddress {
    pub const POSITION_MANAGER: Address = address!("f40937279f38d0c1f97afa5919f1cb3cb7f06a7f");
    pub const MULTICALL3: Address = address!("ca11bde05977b3631167028862be2a173976ca11");
}

#[non_exhaustive]
pub struct TokenAddressAvalanche;

impl TokenAddressAvalanche {
    pub const WAVAX: Address = address!("b31f66aa3c1e785363f0875a1b74e27b85fd66c7");
    pub const PNG: Address = address!("60781c2586d68229fde47564546784ab3faca982");
    pub const USDC: Address = address!("b97ef9ef8734c71904d8002f8b6bc66dd9c48a6e");
    pub const USDT: Address = address!("9702230a8ea53601f5cd2dc00fdbc13d4df4a8c7");

    pub fn is_wavax(&address: &Address) -> bool {
        address.eq(&Self::WAVAX)
    }
}
