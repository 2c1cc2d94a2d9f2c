pub use erc20::IERC20;
pub use multicall3::IMulticall3;
pub use position_manager::IPositionManager;

mod erc20;
mod multicall3;
mod position_manager;
